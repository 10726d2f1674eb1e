use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_tracker::api::state::AppState;
use roster_tracker::calculate::{self, RosterRow, SummaryView};
use roster_tracker::config::AppConfig;
use roster_tracker::storage::{PlayerRepository, SqlitePlayerRepository};
use roster_tracker::sync::{ImportOptions, ImportService, LeaguepediaClient};
use roster_tracker::view::{initials, DestructiveAction, PendingAction, SortField, ViewState};

#[derive(Parser)]
#[command(name = "roster-tracker")]
#[command(about = "League of Legends pro player stats tracker")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Database file path (overrides the config file)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Import player stats from Leaguepedia
    Import {
        /// Tournament filter (e.g. "LCK", "LPL", "Worlds")
        #[arg(long)]
        tournament: Option<String>,

        /// Year to import (e.g. "2025")
        #[arg(long)]
        year: Option<String>,

        /// Fetch and aggregate but don't store
        #[arg(long)]
        dry_run: bool,
    },

    /// Print roster summary statistics
    Stats,

    /// Print the roster
    List {
        /// Filter by IGN, team, or role substring
        #[arg(long)]
        search: Option<String>,

        /// Sort field (ign, team, games, win_rate, kda, gpm, cspm, dpm)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Delete one player by id
    Delete {
        #[arg(long)]
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Remove every player from the roster
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::load(Path::new(&cli.config))?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.database.path.clone());

    let repo: Arc<dyn PlayerRepository> = Arc::new(SqlitePlayerRepository::open(&db_path).await?);
    let leaguepedia = Arc::new(LeaguepediaClient::new(config.leaguepedia.clone())?);

    match cli.command {
        Commands::Serve { host, port } => {
            let state = AppState {
                repo,
                leaguepedia,
                import_defaults: config.import.clone(),
            };
            let app = roster_tracker::api::build_router(state);

            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }

        Commands::Import {
            tournament,
            year,
            dry_run,
        } => {
            let options = ImportOptions {
                tournament: tournament.unwrap_or(config.import.tournament),
                year: year.unwrap_or(config.import.year),
                dry_run,
            };

            let service = ImportService::new(leaguepedia, repo);
            let report = service.import(&options).await?;

            let suffix = if dry_run { " (dry run)" } else { "" };
            println!(
                "Imported {} players from {} game records for {} {}{}",
                report.players_imported,
                report.games_processed,
                options.tournament,
                options.year,
                suffix
            );
        }

        Commands::Stats => {
            let roster = repo.list().await?;
            let view = SummaryView::from_summary(&calculate::summarize(&roster));

            println!("Players:          {}", view.total_players);
            println!("Total games:      {}", view.total_games);
            println!("Average win rate: {}%", view.avg_win_rate_display);
            println!("Average KDA:      {}", view.avg_kda_display);
        }

        Commands::List { search, sort, desc } => {
            let roster = repo.list().await?;

            let mut view = ViewState::default();
            if let Some(search) = &search {
                view.set_filter(search.trim());
            }
            if let Some(sort) = &sort {
                let field = SortField::parse(sort)
                    .ok_or_else(|| anyhow!("unknown sort field '{}'", sort))?;
                view.sort_field = Some(field);
                view.ascending = !desc;
            }

            let players = view.apply(&roster);
            println!(
                "{:<4} {:<16} {:<14} {:<16} {:>6} {:>7} {:>6} {:>6} {:>6} {:>6}",
                "", "IGN", "Role", "Team", "Games", "Win%", "KDA", "G/min", "CS/m", "D/min"
            );
            for player in &players {
                let row = RosterRow::from_player(player);
                println!(
                    "{:<4} {:<16} {:<14} {:<16} {:>6} {:>7} {:>6} {:>6} {:>6} {:>6}",
                    initials(&row.ign),
                    row.ign,
                    row.role_label,
                    row.team,
                    row.games_played,
                    row.win_rate_display,
                    row.kda_display,
                    row.gold_per_min,
                    row.cs_per_min_display,
                    row.dmg_per_min
                );
            }
            println!("{} players", players.len());
        }

        Commands::Delete { id, yes } => {
            let player = repo
                .get(id)
                .await?
                .ok_or_else(|| anyhow!("player {} not found", id))?;

            let pending = PendingAction::delete_player(id, &player.ign);
            if !yes {
                println!("About to {}.", pending.describe());
                println!("Re-run with --yes to confirm.");
                return Ok(());
            }

            if let DestructiveAction::DeletePlayer { id, ign } = pending.confirm() {
                repo.delete(id).await?;
                println!("Deleted player '{}'", ign);
            }
        }

        Commands::Clear { yes } => {
            let pending = PendingAction::clear_roster();
            if !yes {
                println!("About to {}.", pending.describe());
                println!("Re-run with --yes to confirm.");
                return Ok(());
            }

            pending.confirm();
            let removed = repo.clear_all().await?;
            println!("Cleared {} players", removed);
        }
    }

    Ok(())
}
