// Application state module
// Shared, read-only state handed to every request handler

use std::sync::Arc;

use super::types::Config;
use crate::storage::{Clock, SystemClock, VideoStore};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Verified storage directory, opened before the listener is bound
    pub store: VideoStore,
    /// Source of upload timestamps
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: Config, store: VideoStore) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, store: VideoStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }
}
