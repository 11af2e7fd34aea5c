//! JSON-RPC gateway to the content daemon
//!
//! Two modes of operation:
//!
//! 1. [`Gateway::call`] performs an internal request to the daemon and returns
//!    its `result`.
//! 2. [`Gateway::proxy`] takes a web client request, augments it for the
//!    bound account, forwards it, augments the reply and returns both the
//!    augmented and the raw reply.
//!
//! ```text
//! client ─▶ request hook ─▶ daemon ─▶ response hook ─▶ post hook ─▶ client
//!                                                          │
//!                                                          └─▶ FetchCompleted
//! ```

pub mod error;
pub mod hooks;
pub mod methods;
pub mod transport;

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::events::EventEmitter;
use crate::timing::TimingRecorder;
use crate::types::{AccountId, RpcRequest, RpcResponse};
use crate::util;

pub use error::GatewayError;
pub use hooks::Exchange;
pub use methods::{classify, MethodKind, MethodScope};
pub use transport::{DaemonTransport, HttpTransport};

/// Characters of a daemon reply shown in debug logs
const LOG_PREVIEW_CHARS: usize = 500;

/// State shared by every gateway instance: the daemon link, the timing
/// recorder and the event channel.
#[derive(Debug)]
pub struct GatewayCore {
    transport: Arc<dyn DaemonTransport>,
    recorder: Arc<TimingRecorder>,
    content_base_url: String,
    events: Option<EventEmitter>,
}

impl GatewayCore {
    pub fn new(
        transport: Arc<dyn DaemonTransport>,
        recorder: Arc<TimingRecorder>,
        content_base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            recorder,
            content_base_url: content_base_url.into(),
            events: None,
        }
    }

    /// Publish fetch events on this emitter
    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = Some(events);
        self
    }

    pub fn recorder(&self) -> &Arc<TimingRecorder> {
        &self.recorder
    }

    pub fn daemon_endpoint(&self) -> &str {
        self.transport.endpoint()
    }
}

/// Augmented reply for the client plus the daemon's reply as received
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub augmented: Value,
    pub raw: Value,
}

/// Gateway bound to an optional account.
///
/// Cheap to construct; build one per client request.
#[derive(Debug, Clone)]
pub struct Gateway {
    core: Arc<GatewayCore>,
    account: Option<AccountId>,
}

impl Gateway {
    /// Supply an account if requests will be proxied; internal calls work
    /// without one.
    pub fn new(core: Arc<GatewayCore>, account: Option<AccountId>) -> Self {
        Self { core, account }
    }

    pub fn account(&self) -> Option<&AccountId> {
        self.account.as_ref()
    }

    /// Internal call: send `{method, params}` and return the `result` member
    pub async fn call(
        &self,
        method: &str,
        params: Map<String, Value>,
    ) -> Result<Value, GatewayError> {
        debug!("Sending request to daemon: {}({:?})", method, params);
        let request = RpcRequest::new(method, params);
        let body = self.round_trip(&request).await?;
        let result = body.get("result").cloned().ok_or_else(|| {
            GatewayError::DaemonFailure(format!("reply to '{}' has no result", method))
        })?;
        debug!(
            "Got response from daemon: {}",
            util::preview(&result.to_string(), LOG_PREVIEW_CHARS)
        );
        Ok(result)
    }

    /// Proxy a client request through the augmentation pipeline
    pub async fn proxy(&self, payload: Value) -> Result<ProxyReply, GatewayError> {
        let request: RpcRequest = serde_json::from_value(payload)
            .map_err(|e| GatewayError::MalformedRequest(e.to_string()))?;
        let kind = MethodKind::of(&request.method);
        debug!(
            "Proxying request to daemon: {}({:?})",
            request.method, request.params
        );

        let augmented_request = hooks::augment_request(kind, &request, self.account.as_ref())?;
        let raw = self.round_trip(&augmented_request).await?;
        debug!(
            "Got response from daemon for proxied request: {}",
            util::preview(&raw.to_string(), LOG_PREVIEW_CHARS)
        );

        let augmented = hooks::augment_response(
            kind,
            &request,
            &raw,
            self.account.as_ref(),
            &self.core.content_base_url,
        )?;

        let exchange = Exchange {
            request: &request,
            augmented_request: &augmented_request,
            response: &raw,
            augmented_response: &augmented,
        };
        if let Some(event) = hooks::post_completion(kind, &exchange, self.account.as_ref()) {
            if let Some(events) = &self.core.events {
                events.emit(event);
            }
        }

        Ok(ProxyReply { augmented, raw })
    }

    /// Timed network round trip with daemon error classification
    async fn round_trip(&self, request: &RpcRequest) -> Result<Value, GatewayError> {
        let token = self.core.recorder.start(&request.method);
        let outcome = match self.core.transport.post(&request.to_value()).await {
            Ok(body) => match RpcResponse::from_body(&body) {
                RpcResponse::Error(error) => Err(GatewayError::from_daemon(&error)),
                RpcResponse::Result(_) => Ok(body),
            },
            Err(err) => Err(err),
        };
        match &outcome {
            Ok(_) => self.core.recorder.end(&token),
            Err(_) => self.core.recorder.error(&token),
        };
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Replays a canned reply and records every payload it was given
    #[derive(Debug)]
    struct RecordingTransport {
        reply: Value,
        sent: Mutex<Vec<Value>>,
    }

    impl RecordingTransport {
        fn new(reply: Value) -> Arc<Self> {
            Arc::new(Self {
                reply,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<Value> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl DaemonTransport for RecordingTransport {
        async fn post(&self, payload: &Value) -> Result<Value, GatewayError> {
            self.sent.lock().push(payload.clone());
            Ok(self.reply.clone())
        }

        fn endpoint(&self) -> &str {
            "recording"
        }
    }

    fn core(transport: Arc<RecordingTransport>) -> GatewayCore {
        GatewayCore::new(
            transport,
            Arc::new(TimingRecorder::default()),
            "http://localhost:8000/content/",
        )
    }

    fn get_reply() -> Value {
        json!({
            "id": null,
            "jsonrpc": "2.0",
            "result": {
                "claim_name": "what",
                "download_path": "/lbry/download/test",
                "file_name": "test",
                "outpoint": "6c71c02c4990ce0590f6888a77ad11f1ae45486f6a4c56d5013954ee8f6356bc:0",
                "suggested_file_name": "LBRY100.mp4",
                "total_bytes": 158433904
            }
        })
    }

    #[tokio::test]
    async fn call_returns_result_member() {
        let transport = RecordingTransport::new(json!({"result": {"status": "created", "id": "abc"}}));
        let gateway = Gateway::new(Arc::new(core(transport.clone())), None);

        let mut params = Map::new();
        params.insert("account_name".to_string(), json!("test"));
        let result = gateway.call("account_create", params).await.unwrap();

        assert_eq!(result["id"], json!("abc"));
        assert_eq!(
            transport.sent(),
            vec![json!({"method": "account_create", "params": {"account_name": "test"}})]
        );
    }

    #[tokio::test]
    async fn call_surfaces_daemon_error_verbatim() {
        let transport = RecordingTransport::new(json!({
            "error": {"code": -32700, "data": [], "message": "Parse Error. Data is not valid JSON."},
            "id": null,
            "jsonrpc": "2.0"
        }));
        let core = Arc::new(core(transport));
        let gateway = Gateway::new(core.clone(), None);

        let err = gateway.call("account_create", Map::new()).await.unwrap_err();
        match err {
            GatewayError::DaemonFailure(message) => {
                assert_eq!(message, "Parse Error. Data is not valid JSON.")
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let recent = core.recorder().recent();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].errored);
    }

    #[tokio::test]
    async fn unknown_account_maps_to_account_not_found() {
        let transport = RecordingTransport::new(json!({
            "error": {"code": -32500, "message": "Couldn't find account: abc."}
        }));
        let gateway = Gateway::new(Arc::new(core(transport)), Some(AccountId::new("abc")));
        let err = gateway
            .proxy(json!({"method": "account_balance"}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn fetch_without_account_never_reaches_daemon() {
        let transport = RecordingTransport::new(get_reply());
        let gateway = Gateway::new(Arc::new(core(transport.clone())), None);

        let err = gateway
            .proxy(json!({"method": "get", "params": {"uri": "what"}}))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::AccountRequired(_)));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_never_reaches_daemon() {
        let transport = RecordingTransport::new(get_reply());
        let gateway = Gateway::new(Arc::new(core(transport.clone())), Some(AccountId::new("abc")));

        for payload in [json!([1, 2, 3]), json!({"params": {}}), json!({"method": 5})] {
            let err = gateway.proxy(payload).await.unwrap_err();
            assert!(matches!(err, GatewayError::MalformedRequest(_)));
        }
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn account_scoped_methods_carry_account_id() {
        for method in ["wallet_balance", "account_list", "address_unused", "transaction_list"] {
            let transport = RecordingTransport::new(json!({"result": 0.0}));
            let gateway =
                Gateway::new(Arc::new(core(transport.clone())), Some(AccountId::new("abc")));
            gateway
                .proxy(json!({"method": method, "params": {}}))
                .await
                .unwrap();
            let sent = transport.sent();
            assert_eq!(sent[0]["params"]["account_id"], json!("abc"), "{}", method);
        }
    }

    #[tokio::test]
    async fn public_methods_are_forwarded_verbatim() {
        for payload in [
            json!({"jsonrpc": "2.0", "method": "status", "params": {}, "id": 123}),
            json!({"method": "resolve", "params": {"urls": ["what"]}}),
        ] {
            let transport = RecordingTransport::new(json!({"result": {}}));
            let gateway =
                Gateway::new(Arc::new(core(transport.clone())), Some(AccountId::new("abc")));
            let reply = gateway.proxy(payload.clone()).await.unwrap();
            assert_eq!(transport.sent(), vec![payload]);
            assert_eq!(reply.augmented, reply.raw);
        }
    }

    #[tokio::test]
    async fn proxied_fetch_rewrites_path_and_emits_raw_event() {
        let transport = RecordingTransport::new(get_reply());
        let (emitter, mut rx) = EventEmitter::channel();
        let core = Arc::new(core(transport.clone()).with_events(emitter));
        let gateway = Gateway::new(core, Some(AccountId::new("abc")));

        let payload = json!({"method": "get", "params": {"uri": "what"}});
        let reply = gateway.proxy(payload.clone()).await.unwrap();

        assert_eq!(transport.sent(), vec![payload]);
        assert_eq!(
            reply.augmented["result"]["download_path"],
            json!("http://localhost:8000/content/abc/what")
        );
        assert_eq!(reply.raw, get_reply());

        let event = rx.try_recv().unwrap();
        assert_eq!(event.account_id, AccountId::new("abc"));
        assert_eq!(event.uri, "what");
        assert_eq!(event.file_name, reply.raw["result"]["file_name"].as_str().unwrap());
        assert_eq!(event.daemon_result, reply.raw["result"]);
    }

    #[tokio::test]
    async fn every_round_trip_is_timed() {
        let transport = RecordingTransport::new(json!({"result": {}}));
        let core = Arc::new(core(transport));
        let gateway = Gateway::new(core.clone(), None);

        gateway.call("status", Map::new()).await.unwrap();
        gateway.proxy(json!({"method": "resolve"})).await.unwrap();

        let names: Vec<String> = core.recorder().recent().into_iter().map(|op| op.name).collect();
        assert_eq!(names, vec!["status".to_string(), "resolve".to_string()]);
        assert_eq!(core.recorder().open_count(), 0);
    }
}
