//! Operation timing configuration

use serde::{Deserialize, Serialize};

use crate::timing::TimerKeying;

/// Timing recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How open timers are keyed (`per_call` or the legacy `by_name`)
    #[serde(default)]
    pub keying: TimerKeying,
    /// Closed operations kept in memory
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_history_capacity() -> usize {
    1024
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            keying: TimerKeying::PerCall,
            history_capacity: default_history_capacity(),
        }
    }
}
