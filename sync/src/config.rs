//! Sync coordinator configuration.

use std::time::Duration;

/// Configuration for the sync coordinator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long connectivity must stay up before a drain starts. Suppresses
    /// thrashing on flaky links; a flip back offline cancels the pending
    /// drain. There is no retry ceiling, flapping simply restarts the
    /// window.
    pub debounce_window: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_secs(2),
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(ms) = std::env::var("PESAFLOW_DEBOUNCE_MS") {
            if let Ok(ms) = ms.parse() {
                config.debounce_window = Duration::from_millis(ms);
            }
        }

        config
    }
}
