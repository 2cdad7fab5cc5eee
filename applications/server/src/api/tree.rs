/// Built tree API
use crate::{
    api::stream,
    error::{Result, ServerError},
    resolver::{self, Resolution},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};

/// GET /*path
/// Serve an artifact, an index document, or a track record
pub async fn get_path(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    match resolver::resolve(&app_state.tree, &path).await? {
        Resolution::NotFound => Err(ServerError::NotFound),
        Resolution::Artifact(file) => stream::stream_artifact(&file, &headers).await,
        Resolution::Document(file) => {
            let contents = tokio::fs::read(&file).await?;
            Ok(([(header::CONTENT_TYPE, "application/json")], contents).into_response())
        }
        Resolution::Track(track) => Ok(Json(track).into_response()),
    }
}

/// GET /
/// The library index is not exposed at the root
pub async fn get_root() -> ServerError {
    ServerError::NotFound
}
