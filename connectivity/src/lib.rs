//! Pesaflow Connectivity Monitor
//!
//! Tracks the runtime's network-reachability signal and publishes discrete
//! state-change events. The monitor never polls or guesses: the embedder
//! samples the runtime signal at construction and forwards every subsequent
//! online/offline event through [`ConnectivityMonitor::report`].

pub mod monitor;

pub use monitor::{ConnectionQuality, ConnectivityMonitor, ConnectivityState};
