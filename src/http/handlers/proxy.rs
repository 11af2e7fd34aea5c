//! Proxy handler: web client JSON-RPC requests forwarded for the caller's
//! account

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

use super::{AppState, MAX_PROXY_BODY};
use crate::gateway::{Gateway, GatewayError};
use crate::http::identity::ClientAccount;
use crate::http::types::ErrorResponse;

/// Proxy endpoint
pub async fn proxy(
    State(state): State<AppState>,
    ClientAccount(account): ClientAccount,
    body: Bytes,
) -> Response {
    if body.len() > MAX_PROXY_BODY {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse::new(
                "REQUEST_TOO_LARGE",
                format!(
                    "Request body of {} bytes exceeds maximum of {} bytes",
                    body.len(),
                    MAX_PROXY_BODY
                ),
            )),
        )
            .into_response();
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("Rejecting proxy request with malformed body: {}", e);
            return error_response(&GatewayError::MalformedRequest(format!(
                "body is not JSON: {}",
                e
            )));
        }
    };

    let gateway = Gateway::new(state.core.clone(), account);
    match gateway.proxy(payload).await {
        Ok(reply) => (StatusCode::OK, Json(reply.augmented)).into_response(),
        Err(e) => {
            warn!(
                "Proxy request failed for account {:?}: {}",
                gateway.account().map(|a| a.as_str()),
                e
            );
            error_response(&e)
        }
    }
}

fn status_for(error: &GatewayError) -> StatusCode {
    match error {
        GatewayError::AccountRequired(_) => StatusCode::FORBIDDEN,
        GatewayError::AccountNotFound(_)
        | GatewayError::DaemonFailure(_)
        | GatewayError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
    }
}

fn error_response(error: &GatewayError) -> Response {
    (
        status_for(error),
        Json(ErrorResponse::new(error.code(), error.to_string())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_account_is_forbidden() {
        assert_eq!(
            status_for(&GatewayError::AccountRequired("account_balance".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn daemon_side_failures_are_bad_requests() {
        for error in [
            GatewayError::AccountNotFound("Couldn't find account abc".into()),
            GatewayError::DaemonFailure("connection refused".into()),
            GatewayError::MalformedRequest("missing method".into()),
        ] {
            assert_eq!(status_for(&error), StatusCode::BAD_REQUEST, "{}", error);
        }
    }
}
