//! Connectivity state and change notifications.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Current reachability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityState {
    /// Whether the network is currently reachable.
    pub online: bool,
    /// When the state last flipped.
    pub last_changed_at: DateTime<Utc>,
}

/// Advisory connection-quality hint. Display-only; correctness never
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionQuality {
    /// No hint available from the runtime.
    Unknown,
    /// Degraded link (e.g. 2G, save-data mode).
    Poor,
    /// Healthy link.
    Good,
}

/// Observes the runtime's reachability signal and publishes transitions.
///
/// Delivery to subscribers is at-least-once: a subscriber may observe
/// duplicate notifications of the same state and must treat them
/// idempotently.
pub struct ConnectivityMonitor {
    state: RwLock<ConnectivityState>,
    quality: RwLock<ConnectionQuality>,
    events: broadcast::Sender<ConnectivityState>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the state sampled synchronously from the
    /// runtime signal at construction time. The initial state is never
    /// assumed.
    pub fn new(initially_online: bool) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: RwLock::new(ConnectivityState {
                online: initially_online,
                last_changed_at: Utc::now(),
            }),
            quality: RwLock::new(ConnectionQuality::Unknown),
            events,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> ConnectivityState {
        *self.state.read()
    }

    /// Whether the network is currently reachable.
    pub fn is_online(&self) -> bool {
        self.state.read().online
    }

    /// Current advisory quality hint.
    pub fn quality(&self) -> ConnectionQuality {
        *self.quality.read()
    }

    /// Subscribe to state notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityState> {
        self.events.subscribe()
    }

    /// Forward a reachability event from the runtime signal.
    ///
    /// On a transition the state is re-timestamped; a report of the current
    /// state leaves the timestamp untouched. Either way the state is
    /// published, so subscribers see at-least-once delivery.
    pub fn report(&self, online: bool) {
        let state = {
            let mut state = self.state.write();
            if state.online != online {
                state.online = online;
                state.last_changed_at = Utc::now();
                info!(online, "Connectivity changed");
            } else {
                debug!(online, "Duplicate connectivity report");
            }
            *state
        };

        // No subscribers is fine; the send error only means nobody listens.
        let _ = self.events.send(state);
    }

    /// Forward an advisory quality hint from the runtime signal.
    pub fn report_quality(&self, quality: ConnectionQuality) {
        *self.quality.write() = quality;
        debug!(?quality, "Connection quality hint updated");
    }
}
