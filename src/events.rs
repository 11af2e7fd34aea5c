//! Domain events published by the gateway
//!
//! A successful proxied fetch is handed to whoever holds the receiving end of
//! the channel (normally the content indexer). The gateway never depends on
//! the consumer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::types::AccountId;

/// Published after the daemon accepted a fetch request.
///
/// `file_name` and `daemon_result` come from the raw daemon reply: the file
/// may already have existed under another owner, and the raw reply is what
/// the daemon actually did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchCompleted {
    pub account_id: AccountId,
    pub file_name: String,
    pub uri: String,
    pub daemon_result: Value,
}

/// Receiving end handed to the consumer
pub type FetchEventReceiver = mpsc::UnboundedReceiver<FetchCompleted>;

/// Sending end held by the gateway
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: mpsc::UnboundedSender<FetchCompleted>,
}

impl EventEmitter {
    /// Create an emitter and the receiver its events arrive on
    pub fn channel() -> (Self, FetchEventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publish an event. A closed channel is logged, never fatal to the call.
    pub fn emit(&self, event: FetchCompleted) {
        debug!(
            "Emitting fetch event: account={}, uri={}, file_name={}",
            event.account_id, event.uri, event.file_name
        );
        if let Err(err) = self.tx.send(event) {
            warn!(
                "Fetch event for uri={} dropped: consumer is gone",
                err.0.uri
            );
        }
    }
}
