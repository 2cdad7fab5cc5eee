//! Catalog Server Library
//!
//! Serves a built catalog tree over HTTP and drives builds from the command line.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod resolver;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{Result, ServerError};
pub use resolver::Resolution;
pub use services::BuiltTree;
pub use state::AppState;
