//! Leaguepedia Cargo API client.
//!
//! Queries structured match data from lol.fandom.com through the MediaWiki
//! Cargo extension. All wiki specifics (login flow, pagination, tournament
//! page-name patterns) are isolated in this module so endpoint changes are
//! easy to fix.

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use super::ImportError;
use crate::config::LeaguepediaConfig;

/// One player-game row from the scoreboard tables.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub game_id: String,
    pub player: String,
    pub role: String,
    pub team: String,
    pub champion: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub gold: u32,
    pub cs: u32,
    pub damage: u32,
    pub won: bool,
    pub minutes: f64,
}

/// Profile details from the wiki's Players table.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PlayerProfile {
    pub player: String,
    pub real_name: String,
    pub team: String,
    pub role: String,
    pub country: String,
    pub overview_page: String,
}

/// Parameters for one Cargo query.
#[derive(Debug, Clone, Default)]
struct CargoQuery {
    tables: String,
    fields: String,
    where_clause: String,
    join_on: String,
    order_by: String,
}

/// Client for the Leaguepedia Cargo API.
///
/// Enforces a fixed delay between requests and logs in with bot
/// credentials when configured; Fandom rate-limits anonymous cargo
/// queries aggressively.
pub struct LeaguepediaClient {
    client: reqwest::Client,
    base_url: Url,
    config: LeaguepediaConfig,
    last_request: Mutex<Option<Instant>>,
    logged_in: Mutex<bool>,
}

impl LeaguepediaClient {
    pub fn new(config: LeaguepediaConfig) -> Result<Self, ImportError> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
            last_request: Mutex::new(None),
            logged_in: Mutex::new(false),
        })
    }

    /// Sleep long enough to keep the configured gap between requests.
    async fn rate_limit(&self) {
        let delay = Duration::from_millis(self.config.request_delay_ms);
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < delay {
                sleep(delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Log in with bot credentials. Returns false (without failing) when
    /// no credentials are configured or the wiki rejects them; queries
    /// then run anonymously at the lower rate limit.
    pub async fn login(&self) -> Result<bool, ImportError> {
        if *self.logged_in.lock().await {
            return Ok(true);
        }

        let (Some(username), Some(password)) =
            (&self.config.bot_username, &self.config.bot_password)
        else {
            debug!("No bot credentials configured, querying anonymously");
            return Ok(false);
        };

        // Step 1: fetch a login token
        self.rate_limit().await;
        let data: Value = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("action", "query"),
                ("meta", "tokens"),
                ("type", "login"),
                ("format", "json"),
            ])
            .send()
            .await?
            .json()
            .await?;

        let Some(token) = data
            .pointer("/query/tokens/logintoken")
            .and_then(Value::as_str)
        else {
            warn!("Leaguepedia login: no token in response");
            return Ok(false);
        };

        // Step 2: post the credentials
        self.rate_limit().await;
        let result: Value = self
            .client
            .post(self.base_url.clone())
            .form(&[
                ("action", "login"),
                ("lgname", username.as_str()),
                ("lgpassword", password.as_str()),
                ("lgtoken", token),
                ("format", "json"),
            ])
            .send()
            .await?
            .json()
            .await?;

        let outcome = result
            .pointer("/login/result")
            .and_then(Value::as_str)
            .unwrap_or("");

        if outcome == "Success" {
            info!("Leaguepedia login successful");
            *self.logged_in.lock().await = true;
            Ok(true)
        } else {
            warn!(outcome, "Leaguepedia login failed");
            Ok(false)
        }
    }

    /// Execute one Cargo query page, retrying on rate limits and
    /// transport errors with linear backoff.
    async fn cargo_query(
        &self,
        query: &CargoQuery,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>, ImportError> {
        if let Err(e) = self.login().await {
            warn!(error = %e, "Leaguepedia login failed, continuing anonymously");
        }

        let limit = limit.min(self.config.max_limit);
        let mut params: Vec<(&str, String)> = vec![
            ("action", "cargoquery".to_string()),
            ("format", "json".to_string()),
            ("tables", query.tables.clone()),
            ("fields", query.fields.clone()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        if !query.where_clause.is_empty() {
            params.push(("where", query.where_clause.clone()));
        }
        if !query.join_on.is_empty() {
            params.push(("join_on", query.join_on.clone()));
        }
        if !query.order_by.is_empty() {
            params.push(("order_by", query.order_by.clone()));
        }

        for attempt in 0..self.config.max_retries {
            self.rate_limit().await;

            let sent = self
                .client
                .get(self.base_url.clone())
                .query(&params)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            let response = match sent {
                Ok(r) => r,
                Err(e) if attempt + 1 < self.config.max_retries => {
                    let wait = Duration::from_secs(3 * (attempt as u64 + 1));
                    warn!(error = %e, "Request failed, retrying in {:?}", wait);
                    sleep(wait).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let data: Value = match response.json().await {
                Ok(d) => d,
                Err(e) if attempt + 1 < self.config.max_retries => {
                    let wait = Duration::from_secs(3 * (attempt as u64 + 1));
                    warn!(error = %e, "Bad response body, retrying in {:?}", wait);
                    sleep(wait).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(error) = data.get("error") {
                let code = error
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                if code == "ratelimited" {
                    let wait = Duration::from_secs(5 * (attempt as u64 + 1));
                    warn!("Rate limited, waiting {:?}", wait);
                    sleep(wait).await;
                    continue;
                }
                let message = error
                    .get("info")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                return Err(ImportError::Api { code, message });
            }

            let rows = data
                .get("cargoquery")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            return Ok(rows
                .into_iter()
                .filter_map(|item| item.get("title").cloned())
                .collect());
        }

        Err(ImportError::RateLimited(self.config.max_retries))
    }

    /// Run a Cargo query with pagination until a short page or the
    /// configured result cap.
    async fn cargo_query_all(&self, query: &CargoQuery) -> Result<Vec<Value>, ImportError> {
        let mut all = Vec::new();
        let mut offset = 0u32;

        loop {
            let page = self
                .cargo_query(query, self.config.max_limit, offset)
                .await?;
            let page_len = page.len() as u32;
            all.extend(page);
            debug!(fetched = all.len(), "Cargo pagination progress");

            if page_len < self.config.max_limit || all.len() as u32 >= self.config.max_results {
                break;
            }
            offset += self.config.max_limit;
        }

        all.truncate(self.config.max_results as usize);
        Ok(all)
    }

    /// Probe the API with a trivial metadata query.
    pub async fn test_connection(&self) -> bool {
        self.rate_limit().await;
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("action", "query"),
                ("meta", "siteinfo"),
                ("format", "json"),
            ])
            .send()
            .await;

        match response {
            Ok(r) => r.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Connection test failed");
                false
            }
        }
    }

    /// Tournament overview pages for a year.
    pub async fn get_tournaments(&self, year: &str) -> Result<Vec<String>, ImportError> {
        let query = CargoQuery {
            tables: "Tournaments".to_string(),
            fields: "OverviewPage,Name,Region".to_string(),
            where_clause: format!("Year='{}'", sql_escape(year)),
            order_by: "Name".to_string(),
            ..CargoQuery::default()
        };

        let rows = self.cargo_query(&query, 100, 0).await?;
        Ok(rows
            .iter()
            .map(|r| field_str(r, "OverviewPage"))
            .filter(|page| !page.is_empty())
            .collect())
    }

    /// Per-game player rows for a tournament/year, joined with game
    /// length, newest first.
    pub async fn fetch_player_game_stats(
        &self,
        tournament: &str,
        year: &str,
    ) -> Result<Vec<GameRecord>, ImportError> {
        let query = CargoQuery {
            tables: "ScoreboardPlayers=SP,ScoreboardGames=SG".to_string(),
            fields: "SP.Link,SP.Role,SP.Team,SP.Champion,SP.Kills,SP.Deaths,SP.Assists,\
                     SP.Gold,SP.CS,SP.DamageToChampions,SP.PlayerWin,SP.GameId,\
                     SG.Gamelength_Number"
                .to_string(),
            where_clause: tournament_where_clause(tournament, year),
            join_on: "SP.GameId=SG.GameId".to_string(),
            order_by: "SP.DateTime_UTC DESC".to_string(),
        };

        let rows = self.cargo_query_all(&query).await?;
        info!(rows = rows.len(), tournament, year, "Fetched game records");
        Ok(rows.iter().filter_map(parse_game_record).collect())
    }

    /// Profile details for one player, if the wiki knows them.
    pub async fn get_player_info(&self, ign: &str) -> Result<Option<PlayerProfile>, ImportError> {
        let query = CargoQuery {
            tables: "Players".to_string(),
            fields: "Player,Name,Team,Role,Country,OverviewPage".to_string(),
            where_clause: format!("Player='{}'", sql_escape(ign)),
            ..CargoQuery::default()
        };

        let rows = self.cargo_query(&query, 1, 0).await?;
        Ok(rows.first().map(|row| PlayerProfile {
            player: field_str(row, "Player"),
            real_name: field_str(row, "Name"),
            team: field_str(row, "Team"),
            role: field_str(row, "Role"),
            country: field_str(row, "Country"),
            overview_page: field_str(row, "OverviewPage"),
        }))
    }
}

// ── WHERE-clause construction ───────────────────────────────────────────────

/// Lower-tier leagues excluded when importing a regional league; page
/// names for academy/challenger events share the main league's prefix.
const TIER_TWO_LEAGUES: &[&str] = &[
    "Academy",
    "Challengers",
    "Amateur",
    "CL",
    "LDL",
    "LTAN",
    "LTAS",
    "NLC",
    "Prime%League",
    "Ultraliga",
    "SuperLiga",
    "LFL",
    "LVP",
    "PCS",
    "VCS",
    "LJL",
    "LLA",
    "CBLOL",
    "LCO",
    "TCL",
];

fn sql_escape(value: &str) -> String {
    value.replace('\'', "''")
}

/// Build the OverviewPage filter for a tournament/year pair.
///
/// The big leagues get precise page-name patterns (plus the LCS→LTA
/// rebrand from 2025); international events skip the tier-two exclusions
/// since their page names never collide with them.
pub(crate) fn tournament_where_clause(tournament: &str, year: &str) -> String {
    let tournament = tournament.trim();
    let year = sql_escape(year.trim());

    if tournament.is_empty() {
        return format!("SP.OverviewPage LIKE '%{year}%'");
    }

    let upper = tournament.to_uppercase();
    let year_num: i32 = year.parse().unwrap_or(0);

    let pattern = match upper.as_str() {
        "LCS" if year_num >= 2025 => format!(
            "(SP.OverviewPage LIKE '%LTA%{year}%' OR SP.OverviewPage LIKE '%LCS%{year}%' \
             OR SP.OverviewPage LIKE '%Americas%{year}%')"
        ),
        "LCK" => format!(
            "(SP.OverviewPage LIKE 'LCK/{year}%' OR SP.OverviewPage LIKE 'LCK {year}%' \
             OR SP.OverviewPage LIKE '%LCK%Cup%{year}%')"
        ),
        "LPL" => format!(
            "(SP.OverviewPage LIKE 'LPL/{year}%' OR SP.OverviewPage LIKE 'LPL {year}%')"
        ),
        "LEC" => format!(
            "(SP.OverviewPage LIKE 'LEC/{year}%' OR SP.OverviewPage LIKE 'LEC {year}%')"
        ),
        "WORLDS" => format!(
            "(SP.OverviewPage LIKE '%{year}%Season%World%Championship%' \
             OR SP.OverviewPage LIKE '%World%Championship%{year}%' \
             OR SP.OverviewPage LIKE '%Worlds%{year}%' \
             OR SP.OverviewPage LIKE '%{year}%Worlds%')"
        ),
        "MSI" => format!(
            "(SP.OverviewPage LIKE '%{year}%Mid%Season%Invitational%' \
             OR SP.OverviewPage LIKE '%MSI%{year}%' \
             OR SP.OverviewPage LIKE '%{year}%MSI%')"
        ),
        _ => {
            let escaped = sql_escape(tournament);
            format!(
                "(SP.OverviewPage LIKE '%{escaped}%{year}%' \
                 OR SP.OverviewPage LIKE '%{escaped}/{year}%')"
            )
        }
    };

    let mut parts = vec![pattern];
    if !matches!(upper.as_str(), "WORLDS" | "MSI") {
        for league in TIER_TWO_LEAGUES {
            parts.push(format!("SP.OverviewPage NOT LIKE '%{league}%'"));
        }
    }
    parts.join(" AND ")
}

// ── Row parsing ─────────────────────────────────────────────────────────────

fn field_str(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn field_u32(row: &Value, key: &str) -> u32 {
    match row.get(key) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
        _ => 0,
    }
}

/// Parse one scoreboard row, skipping rows without a player name.
///
/// Missing or unparseable game length falls back to 30 minutes, the
/// typical length of a pro game.
fn parse_game_record(row: &Value) -> Option<GameRecord> {
    let player = field_str(row, "Link");
    if player.is_empty() {
        return None;
    }

    let won = matches!(
        field_str(row, "PlayerWin").to_lowercase().as_str(),
        "yes" | "1" | "true"
    );

    let minutes = match row.get("Gamelength Number") {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(30.0),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(30.0),
        _ => 30.0,
    };

    Some(GameRecord {
        game_id: field_str(row, "GameId"),
        player,
        role: field_str(row, "Role"),
        team: field_str(row, "Team"),
        champion: field_str(row, "Champion"),
        kills: field_u32(row, "Kills"),
        deaths: field_u32(row, "Deaths"),
        assists: field_u32(row, "Assists"),
        gold: field_u32(row, "Gold"),
        cs: field_u32(row, "CS"),
        damage: field_u32(row, "DamageToChampions"),
        won,
        minutes,
    })
}
