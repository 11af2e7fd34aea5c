//! Operation timing
//!
//! Records start, end, duration and error flag for named operations (one per
//! daemon RPC call). Open timers are keyed per call by default; the
//! [`TimerKeying::ByName`] mode keeps the historic name-keyed table, where two
//! concurrent calls of the same method overwrite each other's timer and one of
//! the two durations is lost.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

/// A timed operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub errored: bool,
}

impl Operation {
    fn begin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            duration_seconds: None,
            errored: false,
        }
    }

    fn close(mut self, errored: bool) -> Self {
        let now = Utc::now();
        let elapsed = (now - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        self.ended_at = Some(now);
        self.duration_seconds = Some(elapsed);
        self.errored = errored;
        self
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration_seconds {
            Some(duration) => write!(f, "[{}] {:.4} secs", self.name, duration),
            None => write!(f, "[{}] {} - ...", self.name, self.started_at),
        }
    }
}

/// How open timers are keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKeying {
    /// Unique key per call; concurrent same-name calls are timed independently
    #[default]
    PerCall,
    /// Keyed by operation name; a second concurrent start replaces the first
    ByName,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TimerKey {
    Call(Uuid),
    Name(String),
}

/// Handle returned by [`TimingRecorder::start`], used to close the operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallToken {
    name: String,
    key: TimerKey,
}

/// Shared recorder of operation timings.
///
/// Closed operations go into a bounded history, oldest evicted first.
#[derive(Debug)]
pub struct TimingRecorder {
    keying: TimerKeying,
    capacity: usize,
    open: DashMap<TimerKey, Operation>,
    history: RwLock<VecDeque<Operation>>,
}

impl TimingRecorder {
    /// Create a recorder keeping at most `capacity` closed operations
    pub fn new(keying: TimerKeying, capacity: usize) -> Self {
        Self {
            keying,
            capacity: capacity.max(1),
            open: DashMap::new(),
            history: RwLock::new(VecDeque::with_capacity(capacity.clamp(1, 4096))),
        }
    }

    /// Start timing an operation
    pub fn start(&self, name: &str) -> CallToken {
        let key = match self.keying {
            TimerKeying::PerCall => TimerKey::Call(Uuid::new_v4()),
            TimerKeying::ByName => TimerKey::Name(name.to_string()),
        };
        self.open.insert(key.clone(), Operation::begin(name));
        CallToken {
            name: name.to_string(),
            key,
        }
    }

    /// Close an operation as successful. Returns its duration in seconds.
    pub fn end(&self, token: &CallToken) -> Option<f64> {
        match self.close(token, false) {
            Some(duration) => {
                info!("Operation {} done in {:.2} secs", token.name, duration);
                Some(duration)
            }
            None => {
                error!(
                    "Operation {} was done but never was reported as started",
                    token.name
                );
                None
            }
        }
    }

    /// Close an operation as failed. Returns its duration in seconds.
    pub fn error(&self, token: &CallToken) -> Option<f64> {
        match self.close(token, true) {
            Some(duration) => {
                info!("Operation {} errored in {:.2} secs", token.name, duration);
                Some(duration)
            }
            None => {
                error!(
                    "Operation {} has errored but never reported as started",
                    token.name
                );
                None
            }
        }
    }

    fn close(&self, token: &CallToken, errored: bool) -> Option<f64> {
        let (_, operation) = self.open.remove(&token.key)?;
        let operation = operation.close(errored);
        let duration = operation.duration_seconds;

        let mut history = self.history.write();
        if history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(operation);
        duration
    }

    /// Closed operations, oldest first
    pub fn recent(&self) -> Vec<Operation> {
        self.history.read().iter().cloned().collect()
    }

    /// Number of operations started but not yet closed
    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

impl Default for TimingRecorder {
    fn default() -> Self {
        Self::new(TimerKeying::PerCall, 1024)
    }
}
