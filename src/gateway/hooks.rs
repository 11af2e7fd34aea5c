//! Method augmentation hooks
//!
//! Each [`MethodKind`] gets a request hook, a response hook and an optional
//! post-completion hook. Hooks never touch their inputs: every rewrite builds
//! a new value, so running a hook twice on the same input yields the same
//! output.

use serde_json::{Map, Value};
use tracing::warn;

use super::error::GatewayError;
use super::methods::{MethodKind, MethodScope};
use crate::events::FetchCompleted;
use crate::types::{AccountId, RpcRequest};

/// Parameter the account id is injected under
pub const ACCOUNT_PARAM: &str = "account_id";

/// Result field rewritten into a public URL
pub const DOWNLOAD_PATH_FIELD: &str = "download_path";

/// Everything a post-completion hook may look at
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub request: &'a RpcRequest,
    pub augmented_request: &'a RpcRequest,
    pub response: &'a Value,
    pub augmented_response: &'a Value,
}

/// Public URL of content fetched by URI: `<base>/<account>/<uri>`
pub fn content_url(base_url: &str, account: &AccountId, uri: &str) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), account, uri)
}

/// Public URL of a listed file: `<base>/<account>/outpoints/<outpoint>/<file_name>`
pub fn outpoint_url(base_url: &str, account: &AccountId, outpoint: &str, file_name: &str) -> String {
    format!(
        "{}/{}/outpoints/{}/{}",
        base_url.trim_end_matches('/'),
        account,
        outpoint,
        file_name
    )
}

fn require_account<'a>(
    method: &str,
    account: Option<&'a AccountId>,
) -> Result<&'a AccountId, GatewayError> {
    account.ok_or_else(|| GatewayError::AccountRequired(method.to_string()))
}

fn fetch_uri(request: &RpcRequest) -> Result<&str, GatewayError> {
    request.param_str("uri").ok_or_else(|| {
        GatewayError::MalformedRequest(format!(
            "'{}' requires a string 'uri' parameter",
            request.method
        ))
    })
}

/// Request-side hook. Runs before any network traffic.
pub fn augment_request(
    kind: MethodKind,
    request: &RpcRequest,
    account: Option<&AccountId>,
) -> Result<RpcRequest, GatewayError> {
    match kind {
        MethodKind::Fetch => {
            // Validation only; the daemon picks the download file name.
            require_account(&request.method, account)?;
            fetch_uri(request)?;
            Ok(request.clone())
        }
        MethodKind::Listing => {
            require_account(&request.method, account)?;
            Ok(request.clone())
        }
        MethodKind::Generic(MethodScope::Account) => {
            let account = require_account(&request.method, account)?;
            let mut params: Map<String, Value> = request.params.clone().unwrap_or_default();
            params.insert(
                ACCOUNT_PARAM.to_string(),
                Value::String(account.as_str().to_string()),
            );
            Ok(RpcRequest {
                method: request.method.clone(),
                params: Some(params),
                envelope: request.envelope.clone(),
            })
        }
        MethodKind::Generic(MethodScope::Public) => Ok(request.clone()),
    }
}

/// Response-side hook. `request` is the client's original request.
pub fn augment_response(
    kind: MethodKind,
    request: &RpcRequest,
    response: &Value,
    account: Option<&AccountId>,
    base_url: &str,
) -> Result<Value, GatewayError> {
    match kind {
        MethodKind::Fetch => {
            let account = require_account(&request.method, account)?;
            let uri = fetch_uri(request)?;
            let mut augmented = response.clone();
            let result = augmented
                .get_mut("result")
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    GatewayError::DaemonFailure(format!(
                        "'{}' reply has no result object",
                        request.method
                    ))
                })?;
            result.insert(
                DOWNLOAD_PATH_FIELD.to_string(),
                Value::String(content_url(base_url, account, uri)),
            );
            Ok(augmented)
        }
        MethodKind::Listing => {
            let account = require_account(&request.method, account)?;
            let mut augmented = response.clone();
            let entries = augmented
                .get_mut("result")
                .and_then(Value::as_array_mut)
                .ok_or_else(|| {
                    GatewayError::DaemonFailure(format!(
                        "'{}' reply has no result list",
                        request.method
                    ))
                })?;
            for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
                let url = match (
                    entry.get("outpoint").and_then(Value::as_str),
                    entry.get("file_name").and_then(Value::as_str),
                ) {
                    (Some(outpoint), Some(file_name)) => {
                        outpoint_url(base_url, account, outpoint, file_name)
                    }
                    _ => {
                        warn!("Listed file without outpoint or file_name, leaving download path as is");
                        continue;
                    }
                };
                entry.insert(DOWNLOAD_PATH_FIELD.to_string(), Value::String(url));
            }
            Ok(augmented)
        }
        MethodKind::Generic(_) => Ok(response.clone()),
    }
}

/// Post-completion hook. Returns the event to publish, if any.
pub fn post_completion(
    kind: MethodKind,
    exchange: &Exchange<'_>,
    account: Option<&AccountId>,
) -> Option<FetchCompleted> {
    match kind {
        MethodKind::Fetch => {
            let account = account?;
            let uri = exchange.request.param_str("uri")?;
            let result = exchange.response.get("result")?;
            let Some(file_name) = result.get("file_name").and_then(Value::as_str) else {
                warn!("Fetch of {} returned no file_name, no fetch event published", uri);
                return None;
            };
            Some(FetchCompleted {
                account_id: account.clone(),
                file_name: file_name.to_string(),
                uri: uri.to_string(),
                daemon_result: result.clone(),
            })
        }
        MethodKind::Listing | MethodKind::Generic(_) => None,
    }
}
