//! Pesaflow Sync Coordinator
//!
//! Watches the connectivity monitor and, after a debounce window, drains the
//! pending transaction queue strictly in insertion order. Settlement itself
//! is a caller-supplied collaborator; outcomes are reported through the
//! notification emitter.

pub mod config;
pub mod coordinator;
pub mod notify;
pub mod settler;

pub use config::SyncConfig;
pub use coordinator::{DrainReport, SyncCoordinator, SyncHandle, SyncState};
pub use notify::{LogEmitter, NotificationEmitter};
pub use settler::{SettlementError, Settler};
