//! Content handlers: byte-range streaming of downloaded files
//!
//! The account segment of the path is accepted but not used for lookup;
//! records are found by URI or by outpoint alone.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::AppState;
use crate::content::{ContentError, ContentRecord, PreparedContent, ServePlan};
use crate::http::types::ErrorResponse;

/// Content looked up by the URI it was fetched with
pub async fn content_by_uri(
    State(state): State<AppState>,
    Path((account_id, uri)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    debug!("Content request by uri={} (account {})", uri, account_id);
    let record = state.index.get_by_uri(&uri);
    serve(&state, record, &uri, &headers).await
}

/// Content looked up by outpoint; the file name segment only names the download
pub async fn content_by_outpoint(
    State(state): State<AppState>,
    Path((account_id, outpoint, file_name)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    debug!(
        "Content request by outpoint={} file_name={} (account {})",
        outpoint, file_name, account_id
    );
    let record = state.index.get_by_outpoint(&outpoint);
    serve(&state, record, &outpoint, &headers).await
}

async fn serve(
    state: &AppState,
    record: Option<ContentRecord>,
    key: &str,
    headers: &HeaderMap,
) -> Response {
    let Some(record) = record else {
        return error_response(&ContentError::NotFound(format!("no content for {}", key)));
    };
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    match state.content.prepare(&record, range).await {
        Ok(prepared) => content_response(prepared),
        Err(e) => error_response(&e),
    }
}

fn content_response(prepared: PreparedContent) -> Response {
    let plan = prepared.plan;
    let status = match plan {
        ServePlan::Full { .. } => StatusCode::OK,
        ServePlan::Partial { .. } => StatusCode::PARTIAL_CONTENT,
        ServePlan::NotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_TYPE, prepared.content_type)
        .header(header::CONTENT_LENGTH, plan.content_length());
    if let Some(content_range) = plan.content_range() {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }

    let body = match prepared.body {
        Some(stream) => Body::from_stream(stream),
        None => Body::empty(),
    };
    builder.body(body).unwrap_or_else(|e| {
        error!("Failed to build content response: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn error_response(error: &ContentError) -> Response {
    match error {
        ContentError::NotFound(message) => {
            (StatusCode::NOT_FOUND, Json(ErrorResponse::not_found(message.clone()))).into_response()
        }
        ContentError::Io(_) | ContentError::InvalidEvent(_) => {
            error!("Content serving failed: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error(error.to_string())),
            )
                .into_response()
        }
    }
}
