/// Shared application state
use crate::services::BuiltTree;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub tree: Arc<BuiltTree>,
}

impl AppState {
    pub fn new(tree: Arc<BuiltTree>) -> Self {
        Self { tree }
    }
}
