/// API route modules
pub mod stream;
pub mod tree;

use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Router serving the built tree
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(tree::get_root))
        .route("/*path", get(tree::get_path))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
