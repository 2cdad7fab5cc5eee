/// Artifact streaming with range request support
use crate::error::{Result, ServerError};
use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Stream a binary artifact, honouring a `Range: bytes=` header
pub async fn stream_artifact(file_path: &Path, headers: &HeaderMap) -> Result<Response> {
    let metadata = tokio::fs::metadata(file_path).await?;
    let file_size = metadata.len();

    let mime_type = mime_guess::from_path(file_path)
        .first_or_octet_stream()
        .to_string();

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| parse_range(value, file_size));

    if let Some((start, end)) = range {
        let mut file = File::open(file_path).await?;
        file.seek(SeekFrom::Start(start)).await?;

        let content_length = end - start + 1;
        let reader = ReaderStream::new(file.take(content_length));

        return Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, mime_type)
            .header(header::CONTENT_LENGTH, content_length)
            .header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, end, file_size),
            )
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::from_stream(reader))
            .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)));
    }

    // No usable range - stream entire file
    let file = File::open(file_path).await?;
    let reader = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(header::ACCEPT_RANGES, "bytes")
        .body(Body::from_stream(reader))
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}

/// Parse HTTP Range header
/// Format: "bytes=start-end", "bytes=start-" or "bytes=-suffix"
fn parse_range(range: &str, file_size: u64) -> Option<(u64, u64)> {
    let range = range.strip_prefix("bytes=")?;
    let (start_str, end_str) = range.split_once('-')?;
    let last = file_size.checked_sub(1)?;

    if start_str.is_empty() {
        let suffix: u64 = end_str.parse().ok()?;
        if suffix == 0 {
            return None;
        }
        return Some((file_size.saturating_sub(suffix), last));
    }

    let start: u64 = start_str.parse().ok()?;
    let end: u64 = if end_str.is_empty() {
        last
    } else {
        end_str.parse::<u64>().ok()?.min(last)
    };

    (start <= end).then_some((start, end))
}
