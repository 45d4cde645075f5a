use std::sync::Arc;

use crate::config::Config;
use crate::services::Recommender;

/// Shared, read-only application state.
///
/// The recommender (and the catalog it owns) is built once at startup and
/// shared by reference across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(recommender: Recommender, config: Config) -> Self {
        Self {
            recommender: Arc::new(recommender),
            config: Arc::new(config),
        }
    }
}
