use std::sync::Arc;

use crate::config::ImportDefaults;
use crate::storage::PlayerRepository;
use crate::sync::LeaguepediaClient;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn PlayerRepository>,
    pub leaguepedia: Arc<LeaguepediaClient>,
    pub import_defaults: ImportDefaults,
}
