//! Content index
//!
//! Records of fetched content keyed by outpoint, with a secondary URI lookup.
//! Fed by fetch events; upserts are idempotent on the outpoint.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::ContentError;
use crate::events::{FetchCompleted, FetchEventReceiver};
use crate::types::AccountId;

/// A fetched content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Account whose fetch created the record
    pub account_owner: AccountId,
    /// File name inside the download directory
    pub file_name: String,
    /// URI the content was fetched by
    pub uri: String,
    pub claim_name: String,
    /// Unique content identifier
    pub outpoint: String,
    /// Size reported by the daemon, which may differ from the file on disk
    pub claimed_size_bytes: u64,
    /// File name the content type is sniffed from
    pub mime_hint_source: String,
    /// Daemon's fetch result as last reported
    pub daemon_result: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Build a record from a fetch event
    pub fn from_event(event: &FetchCompleted) -> Result<Self, ContentError> {
        let result = &event.daemon_result;
        let outpoint = result
            .get("outpoint")
            .and_then(Value::as_str)
            .ok_or_else(|| ContentError::InvalidEvent(format!("fetch of {} has no outpoint", event.uri)))?;
        let claim_name = result
            .get("claim_name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let mime_hint_source = result
            .get("suggested_file_name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(event.file_name.as_str());

        let now = Utc::now();
        Ok(Self {
            account_owner: event.account_id.clone(),
            file_name: event.file_name.clone(),
            uri: event.uri.clone(),
            claim_name: claim_name.to_string(),
            outpoint: outpoint.to_string(),
            claimed_size_bytes: claimed_size(result),
            mime_hint_source: mime_hint_source.to_string(),
            daemon_result: result.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Location of the file on local storage
    pub fn physical_path(&self, download_dir: &Path) -> PathBuf {
        download_dir.join(&self.file_name)
    }

    fn refresh(&mut self, daemon_result: &Value) {
        self.claimed_size_bytes = claimed_size(daemon_result);
        self.daemon_result = daemon_result.clone();
        self.updated_at = Utc::now();
    }
}

fn claimed_size(daemon_result: &Value) -> u64 {
    daemon_result
        .get("total_bytes")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// On-disk format
#[derive(Debug, Serialize, Deserialize)]
struct SavedIndex {
    records: Vec<ContentRecord>,
    /// Every URI known to resolve to an outpoint
    #[serde(default)]
    aliases: HashMap<String, String>,
    version: u32,
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[derive(Debug, Default)]
struct IndexInner {
    by_outpoint: HashMap<String, ContentRecord>,
    /// URI to outpoint of the most recent fetch
    by_uri: HashMap<String, String>,
}

impl IndexInner {
    fn insert(&mut self, record: ContentRecord) {
        self.by_uri.insert(record.uri.clone(), record.outpoint.clone());
        self.by_outpoint.insert(record.outpoint.clone(), record);
    }
}

/// Content index with optional JSON persistence
#[derive(Debug, Default)]
pub struct ContentIndex {
    inner: RwLock<IndexInner>,
    path: Option<PathBuf>,
}

impl ContentIndex {
    /// Create an empty in-memory index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from `path`, starting empty if the file does not exist.
    /// Later [`save`](Self::save) calls write back to the same file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut inner = IndexInner::default();

        if path.exists() {
            let data = std::fs::read_to_string(&path).context("Failed to read content index")?;
            let saved: SavedIndex =
                serde_json::from_str(&data).context("Failed to parse content index")?;
            info!("Loaded content index with {} records", saved.records.len());
            for record in saved.records {
                inner.insert(record);
            }
            for (uri, outpoint) in saved.aliases {
                if inner.by_outpoint.contains_key(&outpoint) {
                    inner.by_uri.insert(uri, outpoint);
                }
            }
        }

        Ok(Self {
            inner: RwLock::new(inner),
            path: Some(path),
        })
    }

    /// Persist the index. No-op for in-memory indexes.
    ///
    /// Blocking; the file is written beside the target and renamed over it so
    /// a crash never leaves a half-written index.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let saved = {
            let inner = self.inner.read();
            SavedIndex {
                records: inner.by_outpoint.values().cloned().collect(),
                aliases: inner.by_uri.clone(),
                version: 1,
            }
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&saved)?;
        let tmp_path = temp_path(path);
        std::fs::write(&tmp_path, data).context("Failed to write content index")?;
        std::fs::rename(&tmp_path, path).context("Failed to replace content index")?;
        debug!("Saved content index with {} records", saved.records.len());
        Ok(())
    }

    /// Create or refresh the record for the event's outpoint.
    ///
    /// An existing record keeps its owner, URI and file name; only the daemon
    /// payload (and the size derived from it) is refreshed. The event's URI is
    /// always mapped to the outpoint, so every URI a client was handed a
    /// content URL for resolves.
    pub fn upsert_from_event(&self, event: &FetchCompleted) -> Result<UpsertOutcome, ContentError> {
        let record = ContentRecord::from_event(event)?;
        let mut inner = self.inner.write();

        if let Some(existing) = inner.by_outpoint.get_mut(&record.outpoint) {
            existing.refresh(&event.daemon_result);
            debug!(
                "Updated content record outpoint={} (owner {}) via uri={}",
                record.outpoint, existing.account_owner, record.uri
            );
            inner.by_uri.insert(record.uri, record.outpoint);
            return Ok(UpsertOutcome::Updated);
        }

        debug!(
            "Creating content record for account={}, uri={}, claim_name={}",
            record.account_owner, record.uri, record.claim_name
        );
        inner.insert(record);
        Ok(UpsertOutcome::Created)
    }

    pub fn get_by_uri(&self, uri: &str) -> Option<ContentRecord> {
        let inner = self.inner.read();
        inner
            .by_uri
            .get(uri)
            .and_then(|outpoint| inner.by_outpoint.get(outpoint))
            .cloned()
    }

    pub fn get_by_outpoint(&self, outpoint: &str) -> Option<ContentRecord> {
        self.inner.read().by_outpoint.get(outpoint).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_outpoint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drain fetch events into the index until every sender is gone
pub fn spawn_indexer(index: Arc<ContentIndex>, mut events: FetchEventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match index.upsert_from_event(&event) {
                Ok(_) => {
                    let index = index.clone();
                    match tokio::task::spawn_blocking(move || index.save()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => error!("Failed to persist content index: {:#}", e),
                        Err(e) => error!("Content index save task failed: {}", e),
                    }
                }
                Err(e) => error!("Not indexing fetch of {}: {}", event.uri, e),
            }
        }
        debug!("Fetch event channel closed, indexer stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventEmitter;
    use serde_json::json;

    fn event(account: &str, outpoint: &str, total_bytes: u64) -> FetchCompleted {
        FetchCompleted {
            account_id: AccountId::new(account),
            file_name: "test".to_string(),
            uri: "what".to_string(),
            daemon_result: json!({
                "claim_name": "what",
                "file_name": "test",
                "outpoint": outpoint,
                "suggested_file_name": "LBRY100.mp4",
                "total_bytes": total_bytes
            }),
        }
    }

    #[test]
    fn record_derives_fields_from_daemon_result() {
        let record = ContentRecord::from_event(&event("abc", "6c71:0", 158433904)).unwrap();
        assert_eq!(record.outpoint, "6c71:0");
        assert_eq!(record.claim_name, "what");
        assert_eq!(record.claimed_size_bytes, 158433904);
        assert_eq!(record.mime_hint_source, "LBRY100.mp4");
        assert_eq!(
            record.physical_path(Path::new("/lbry/download")),
            PathBuf::from("/lbry/download/test")
        );
    }

    #[test]
    fn record_without_outpoint_is_rejected() {
        let mut event = event("abc", "x", 1);
        event.daemon_result = json!({"claim_name": "what"});
        assert!(matches!(
            ContentRecord::from_event(&event),
            Err(ContentError::InvalidEvent(_))
        ));
    }

    #[test]
    fn mime_hint_falls_back_to_file_name() {
        let mut event = event("abc", "x:0", 1);
        event.file_name = "clip.webm".to_string();
        event.daemon_result["suggested_file_name"] = Value::Null;
        let record = ContentRecord::from_event(&event).unwrap();
        assert_eq!(record.mime_hint_source, "clip.webm");
    }

    #[test]
    fn repeated_events_for_one_outpoint_make_one_record() {
        let index = ContentIndex::new();
        assert_eq!(
            index.upsert_from_event(&event("abc", "6c71:0", 10)).unwrap(),
            UpsertOutcome::Created
        );
        for _ in 0..3 {
            assert_eq!(
                index.upsert_from_event(&event("abc", "6c71:0", 10)).unwrap(),
                UpsertOutcome::Updated
            );
        }
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn update_keeps_owner_and_refreshes_size() {
        let index = ContentIndex::new();
        index.upsert_from_event(&event("owner", "6c71:0", 10)).unwrap();
        index.upsert_from_event(&event("other", "6c71:0", 20)).unwrap();

        let record = index.get_by_outpoint("6c71:0").unwrap();
        assert_eq!(record.account_owner, AccountId::new("owner"));
        assert_eq!(record.claimed_size_bytes, 20);
    }

    #[test]
    fn lookup_by_uri_and_outpoint() {
        let index = ContentIndex::new();
        index.upsert_from_event(&event("abc", "6c71:0", 10)).unwrap();
        assert_eq!(index.get_by_uri("what").unwrap().outpoint, "6c71:0");
        assert!(index.get_by_uri("missing").is_none());
        assert!(index.get_by_outpoint("missing").is_none());
    }

    #[test]
    fn second_uri_for_known_outpoint_resolves() {
        let index = ContentIndex::new();
        index.upsert_from_event(&event("abc", "6c71:0", 10)).unwrap();

        let mut aliased = event("abc", "6c71:0", 10);
        aliased.uri = "what#6c71".to_string();
        assert_eq!(
            index.upsert_from_event(&aliased).unwrap(),
            UpsertOutcome::Updated
        );

        assert_eq!(index.len(), 1);
        assert_eq!(index.get_by_uri("what").unwrap().outpoint, "6c71:0");
        assert_eq!(index.get_by_uri("what#6c71").unwrap().outpoint, "6c71:0");
        // The record itself keeps the URI it was first fetched by
        assert_eq!(index.get_by_uri("what#6c71").unwrap().uri, "what");
    }

    #[test]
    fn save_replaces_file_without_leaving_temp_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(&path, "stale").unwrap();

        let index = ContentIndex {
            inner: RwLock::new(IndexInner::default()),
            path: Some(path.clone()),
        };
        index.upsert_from_event(&event("abc", "6c71:0", 10)).unwrap();
        index.save().unwrap();

        assert!(!temp_path(&path).exists());
        assert_eq!(ContentIndex::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn aliases_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");

        let index = ContentIndex::load(&path).unwrap();
        index.upsert_from_event(&event("abc", "6c71:0", 10)).unwrap();
        let mut aliased = event("abc", "6c71:0", 10);
        aliased.uri = "what#6c71".to_string();
        index.upsert_from_event(&aliased).unwrap();
        index.save().unwrap();

        let reloaded = ContentIndex::load(&path).unwrap();
        assert_eq!(reloaded.get_by_uri("what#6c71").unwrap().outpoint, "6c71:0");
    }

    #[test]
    fn save_and_load_preserve_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("content.json");

        let index = ContentIndex::load(&path).unwrap();
        assert!(index.is_empty());
        index.upsert_from_event(&event("abc", "6c71:0", 10)).unwrap();
        index.save().unwrap();

        let reloaded = ContentIndex::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get_by_uri("what"), index.get_by_uri("what"));
    }

    #[tokio::test]
    async fn indexer_consumes_events_until_channel_closes() {
        let index = Arc::new(ContentIndex::new());
        let (emitter, rx) = EventEmitter::channel();
        let handle = spawn_indexer(index.clone(), rx);

        emitter.emit(event("abc", "6c71:0", 10));
        emitter.emit(event("abc", "6c71:0", 10));
        emitter.emit(event("abc", "09fb:0", 10));
        drop(emitter);

        handle.await.unwrap();
        assert_eq!(index.len(), 2);
    }
}
