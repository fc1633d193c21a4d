//! Pesaflow Persistent Store
//!
//! Synchronous key/value persistence used for the pending transaction queue
//! and user preferences. Callers never see storage faults: a missing or
//! corrupt value reads back as absent, and the caller falls back to its
//! defaults.

pub mod error;
pub mod file;
pub mod memory;
pub mod prefs;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known storage keys used by the core.
pub mod keys {
    /// JSON array of queued transactions.
    pub const PENDING_TRANSACTION_QUEUE: &str = "pending_transaction_queue";
    /// Currency code string; written by the UI, read by features.
    pub const SELECTED_CURRENCY: &str = "selected_currency";
}

/// Durable key/value storage.
///
/// All operations are synchronous from the caller's point of view. `get`
/// returns `None` both for keys that were never written and for keys whose
/// backing medium is unavailable or corrupted; the distinction is logged,
/// never surfaced.
pub trait PersistentStore: Send + Sync {
    /// Read a value, or `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;
    /// Durably write a value.
    fn set(&self, key: &str, value: &str);
    /// Remove a value. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}
