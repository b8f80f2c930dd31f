//! Application state.

use genzfact_core::{Analyzer, GenzConfig};
use std::sync::Arc;

/// Application state shared across handlers. Read-only after start-up.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }

    pub fn config(&self) -> &GenzConfig {
        self.analyzer.config()
    }
}
