//! Persisted pending-transaction queue.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use pesaflow_common::{Transaction, TransactionId, TransactionStatus};
use pesaflow_store::{keys, PersistentStore};

/// Ordered queue of `Queued` transactions, persisted on every mutation.
///
/// Insertion order equals creation order and is preserved across restarts.
/// The queue exclusively owns its transactions; entries leave the queue only
/// through [`PendingQueue::settle`] or [`PendingQueue::fail`], at which point
/// ownership passes to the caller.
pub struct PendingQueue {
    store: Arc<dyn PersistentStore>,
    entries: Mutex<Vec<Transaction>>,
}

impl PendingQueue {
    /// Hydrate the queue from the persistent store.
    ///
    /// A missing or unparseable snapshot yields an empty queue. Hydrated
    /// entries that are not in `Queued` status, or that repeat an id already
    /// seen, are treated as corrupt and dropped.
    pub fn hydrate(store: Arc<dyn PersistentStore>) -> Self {
        let entries = match store.get(keys::PENDING_TRANSACTION_QUEUE) {
            Some(raw) => match serde_json::from_str::<Vec<Transaction>>(&raw) {
                Ok(parsed) => Self::sanitize(parsed),
                Err(err) => {
                    warn!(error = %err, "Corrupt queue snapshot, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if !entries.is_empty() {
            info!(count = entries.len(), "Hydrated pending transaction queue");
        }

        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    fn sanitize(parsed: Vec<Transaction>) -> Vec<Transaction> {
        let mut entries: Vec<Transaction> = Vec::with_capacity(parsed.len());
        for tx in parsed {
            if tx.status != TransactionStatus::Queued {
                warn!(id = %tx.id, status = ?tx.status, "Dropping non-queued entry from snapshot");
                continue;
            }
            if tx.amount <= Decimal::ZERO {
                warn!(id = %tx.id, amount = %tx.amount, "Dropping non-positive amount from snapshot");
                continue;
            }
            if entries.iter().any(|existing| existing.id == tx.id) {
                warn!(id = %tx.id, "Dropping duplicate id from snapshot");
                continue;
            }
            entries.push(tx);
        }
        entries
    }

    /// Append a transaction and persist the snapshot.
    ///
    /// Idempotent on id: re-enqueueing an id already present is a no-op,
    /// which absorbs duplicate submissions from UI double-clicks.
    pub fn enqueue(&self, tx: Transaction) {
        if tx.status != TransactionStatus::Queued {
            warn!(id = %tx.id, status = ?tx.status, "Refusing to enqueue non-queued transaction");
            return;
        }
        if tx.amount <= Decimal::ZERO {
            warn!(id = %tx.id, amount = %tx.amount, "Refusing to enqueue non-positive amount");
            return;
        }

        let mut entries = self.entries.lock();
        if entries.iter().any(|existing| existing.id == tx.id) {
            debug!(id = %tx.id, "Duplicate enqueue ignored");
            return;
        }

        info!(id = %tx.id, kind = ?tx.kind, "Queued transaction for later settlement");
        entries.push(tx);
        self.persist(&entries);
    }

    /// All currently queued transactions, in insertion order.
    ///
    /// Entries are not removed by draining; removal happens via
    /// [`PendingQueue::settle`] or [`PendingQueue::fail`] once the caller has
    /// actually processed an item.
    pub fn drain(&self) -> Vec<Transaction> {
        self.entries.lock().clone()
    }

    /// Remove a settled transaction and persist. Unknown ids are a no-op.
    pub fn settle(&self, id: &TransactionId) {
        self.evict(id, "settled");
    }

    /// Remove a failed transaction and persist. Unknown ids are a no-op.
    pub fn fail(&self, id: &TransactionId) {
        self.evict(id, "failed");
    }

    /// Number of queued transactions.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn evict(&self, id: &TransactionId, outcome: &str) {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|tx| &tx.id != id);

        if entries.len() == before {
            // Unknown id: safe re-delivery, nothing to do.
            debug!(id = %id, outcome, "Evict for unknown id ignored");
            return;
        }

        info!(id = %id, outcome, remaining = entries.len(), "Removed transaction from queue");
        self.persist(&entries);
    }

    fn persist(&self, entries: &[Transaction]) {
        match serde_json::to_string(entries) {
            Ok(raw) => self.store.set(keys::PENDING_TRANSACTION_QUEUE, &raw),
            Err(err) => warn!(error = %err, "Failed to serialize queue snapshot"),
        }
    }
}
