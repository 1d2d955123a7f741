//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::gate::SessionManager;
use crate::store::TokenStore;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn TokenStore>,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            store,
            sessions: SessionManager::new(),
        }
    }
}
