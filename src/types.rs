//! Core types shared by the gateway, the content index and the HTTP layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Daemon-side account identifier.
///
/// Opaque to this crate: it is supplied by the caller, injected into
/// account-scoped RPC calls and used as a path segment in content URLs.
/// It is never generated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A JSON-RPC request bound for the daemon.
///
/// `params` stays `None` when the client omitted it so that pass-through
/// requests are forwarded exactly as received. Envelope fields such as
/// `jsonrpc` and `id` are carried in `envelope` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub envelope: Map<String, Value>,
}

impl RpcRequest {
    /// Build a bare `{method, params}` request for an internal call
    pub fn new(method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
            envelope: Map::new(),
        }
    }

    /// Look up a string parameter
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.as_ref()?.get(key)?.as_str()
    }

    /// Serialize into the wire representation
    pub fn to_value(&self) -> Value {
        let mut object = self.envelope.clone();
        object.insert("method".to_string(), Value::String(self.method.clone()));
        if let Some(params) = &self.params {
            object.insert("params".to_string(), Value::Object(params.clone()));
        }
        Value::Object(object)
    }
}

/// Error object of a failed daemon reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A daemon reply, either carrying a `result` or an `error`.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    Result(Value),
    Error(RpcError),
}

impl RpcResponse {
    /// Classify a decoded reply body.
    ///
    /// A present, non-null `error` member wins over `result`. Error members
    /// that do not match the `{code, message}` shape keep their JSON text as
    /// the message so nothing the daemon said is lost.
    pub fn from_body(body: &Value) -> Self {
        match body.get("error") {
            Some(error) if !error.is_null() => {
                let parsed = serde_json::from_value::<RpcError>(error.clone()).unwrap_or_else(|_| {
                    RpcError {
                        code: 0,
                        message: error
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| error.to_string()),
                        data: None,
                    }
                });
                Self::Error(parsed)
            }
            _ => Self::Result(body.get("result").cloned().unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_without_params_round_trips_unchanged() {
        let wire = json!({"jsonrpc": "2.0", "method": "status", "id": 123});
        let request: RpcRequest = serde_json::from_value(wire.clone()).unwrap();
        assert!(request.params.is_none());
        assert_eq!(request.envelope.get("id"), Some(&json!(123)));
        assert_eq!(request.to_value(), wire);
    }

    #[test]
    fn request_with_array_params_is_rejected() {
        let wire = json!({"method": "status", "params": [1, 2]});
        assert!(serde_json::from_value::<RpcRequest>(wire).is_err());
    }

    #[test]
    fn param_str_reads_string_params_only() {
        let request: RpcRequest =
            serde_json::from_value(json!({"method": "get", "params": {"uri": "what", "n": 1}}))
                .unwrap();
        assert_eq!(request.param_str("uri"), Some("what"));
        assert_eq!(request.param_str("n"), None);
        assert_eq!(request.param_str("missing"), None);
    }

    #[test]
    fn response_error_takes_precedence() {
        let body = json!({
            "error": {"code": -32700, "data": [], "message": "Parse Error. Data is not valid JSON."},
            "id": null,
            "jsonrpc": "2.0"
        });
        match RpcResponse::from_body(&body) {
            RpcResponse::Error(err) => {
                assert_eq!(err.code, -32700);
                assert_eq!(err.message, "Parse Error. Data is not valid JSON.");
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn response_with_string_error_keeps_text() {
        let body = json!({"error": "boom"});
        match RpcResponse::from_body(&body) {
            RpcResponse::Error(err) => assert_eq!(err.message, "boom"),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn response_null_error_is_success() {
        let body = json!({"error": null, "result": 0.0});
        assert_eq!(RpcResponse::from_body(&body), RpcResponse::Result(json!(0.0)));
    }
}
