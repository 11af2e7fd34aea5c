//! Gateway error taxonomy

use thiserror::Error;

use crate::types::RpcError;

/// Marker the daemon puts in its error message when an account id is unknown.
pub const ACCOUNT_NOT_FOUND_MARKER: &str = "Couldn't find account";

/// Errors surfaced by [`Gateway`](super::Gateway) calls.
///
/// `AccountRequired` and `MalformedRequest` are raised before any network
/// traffic; the other two only after the daemon has answered (or failed to).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An account-scoped method was invoked without an account identity
    #[error("account identity required for method '{0}'")]
    AccountRequired(String),

    /// The daemon does not know the supplied account
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Any other daemon-reported or transport failure
    #[error("daemon failure: {0}")]
    DaemonFailure(String),

    /// The client payload is not a valid JSON-RPC request
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl GatewayError {
    /// Classify an error reported by the daemon
    pub fn from_daemon(error: &RpcError) -> Self {
        if error.message.contains(ACCOUNT_NOT_FOUND_MARKER) {
            Self::AccountNotFound(error.message.clone())
        } else {
            Self::DaemonFailure(error.message.clone())
        }
    }

    /// Stable machine-readable code for API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountRequired(_) => "ACCOUNT_REQUIRED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DaemonFailure(_) => "DAEMON_FAILURE",
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daemon_error(message: &str) -> RpcError {
        RpcError {
            code: -32500,
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn missing_account_message_maps_to_account_not_found() {
        let err = GatewayError::from_daemon(&daemon_error(
            "Couldn't find account: 7bd1f8c2a6f1c5e9.",
        ));
        assert!(matches!(err, GatewayError::AccountNotFound(_)));
    }

    #[test]
    fn other_messages_pass_through_verbatim() {
        let err = GatewayError::from_daemon(&daemon_error("Parse Error. Data is not valid JSON."));
        match err {
            GatewayError::DaemonFailure(message) => {
                assert_eq!(message, "Parse Error. Data is not valid JSON.")
            }
            other => panic!("unexpected error kind: {:?}", other),
        }
    }

    #[test]
    fn marker_match_is_case_sensitive() {
        let err = GatewayError::from_daemon(&daemon_error("couldn't find ACCOUNT"));
        assert!(matches!(err, GatewayError::DaemonFailure(_)));
    }
}
