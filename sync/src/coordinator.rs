//! Sync coordinator state machine.

use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};
use tracing::{debug, info, instrument, warn};

use pesaflow_common::TransactionStatus;
use pesaflow_connectivity::{ConnectivityMonitor, ConnectivityState};
use pesaflow_queue::PendingQueue;

use crate::config::SyncConfig;
use crate::notify::NotificationEmitter;
use crate::settler::Settler;

/// Coordinator operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Listening for connectivity changes.
    Idle,
    /// Connectivity returned; waiting out the debounce window.
    Debouncing,
    /// Settling queued transactions in order.
    Draining,
}

/// Outcome counts for a single drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Transactions settled successfully.
    pub settled: usize,
    /// Transactions that failed settlement.
    pub failed: usize,
}

/// Drains the pending queue when connectivity returns.
///
/// Runs the `Idle → Debouncing → Draining → Idle` state machine on a
/// dedicated task. A connectivity flip back offline during the debounce
/// window cancels the pending drain. Draining processes the queue strictly
/// in insertion order, one settlement at a time; a failed entry is recorded
/// and processing continues with the next.
pub struct SyncCoordinator {
    queue: Arc<PendingQueue>,
    settler: Arc<dyn Settler>,
    emitter: Arc<dyn NotificationEmitter>,
    config: SyncConfig,
    state: Arc<RwLock<SyncState>>,
    last_drain: Arc<RwLock<Option<DrainReport>>>,
}

/// Handle to a running coordinator task.
pub struct SyncHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    state: Arc<RwLock<SyncState>>,
    last_drain: Arc<RwLock<Option<DrainReport>>>,
}

impl SyncHandle {
    /// Current coordinator state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Outcome counts of the most recent completed drain pass, if any.
    pub fn last_drain(&self) -> Option<DrainReport> {
        *self.last_drain.read()
    }

    /// Tear the coordinator down.
    ///
    /// Cancels any in-flight debounce timer and stops draining between
    /// entries. Persisted queue state is left untouched; the next process
    /// start resumes draining from the same queue.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl SyncCoordinator {
    /// Create a coordinator over the given queue and collaborators.
    pub fn new(
        queue: Arc<PendingQueue>,
        settler: Arc<dyn Settler>,
        emitter: Arc<dyn NotificationEmitter>,
        config: SyncConfig,
    ) -> Self {
        Self {
            queue,
            settler,
            emitter,
            config,
            state: Arc::new(RwLock::new(SyncState::Idle)),
            last_drain: Arc::new(RwLock::new(None)),
        }
    }

    /// Subscribe to the monitor and start the coordinator task.
    ///
    /// If the process starts online with a non-empty hydrated queue, a
    /// debounce is armed immediately so an interrupted drain resumes
    /// without waiting for another connectivity transition.
    pub fn spawn(self, monitor: Arc<ConnectivityMonitor>) -> SyncHandle {
        let events = monitor.subscribe();
        let online = monitor.is_online();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = self.state.clone();
        let last_drain = self.last_drain.clone();

        let task = tokio::spawn(self.run(monitor, events, online, shutdown_rx));

        SyncHandle {
            shutdown: shutdown_tx,
            task,
            state,
            last_drain,
        }
    }

    async fn run(
        self,
        monitor: Arc<ConnectivityMonitor>,
        mut events: broadcast::Receiver<ConnectivityState>,
        mut online: bool,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut debounce: Option<Pin<Box<Sleep>>> = None;

        if online && !self.queue.is_empty() {
            info!(queued = self.queue.len(), "Resuming interrupted drain");
            self.set_state(SyncState::Debouncing);
            debounce = Some(Box::pin(sleep(self.config.debounce_window)));
        }

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("Coordinator shutting down");
                    break;
                }
                event = events.recv() => match event {
                    Ok(state) => {
                        self.on_connectivity(state.online, &mut online, &mut debounce);
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // The offline→online edge may be among the lost
                        // notifications, so edge bookkeeping cannot be
                        // trusted here; resample the monitor directly.
                        warn!(missed, "Missed connectivity notifications, resampling monitor");
                        online = monitor.is_online();
                        if online && debounce.is_none() && !self.queue.is_empty() {
                            self.set_state(SyncState::Debouncing);
                            debounce = Some(Box::pin(sleep(self.config.debounce_window)));
                        } else if !online && debounce.is_some() {
                            debounce = None;
                            self.set_state(SyncState::Idle);
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Connectivity monitor gone, coordinator stopping");
                        break;
                    }
                },
                _ = async {
                    match debounce.as_mut() {
                        Some(timer) => timer.as_mut().await,
                        None => std::future::pending().await,
                    }
                } => {
                    debounce = None;
                    self.set_state(SyncState::Draining);
                    let report = self.drain_queue(&shutdown).await;
                    *self.last_drain.write() = Some(report);
                    self.set_state(SyncState::Idle);
                }
            }
        }
    }

    fn on_connectivity(
        &self,
        now_online: bool,
        online: &mut bool,
        debounce: &mut Option<Pin<Box<Sleep>>>,
    ) {
        let was_online = std::mem::replace(online, now_online);

        if now_online && !was_online {
            info!(window = ?self.config.debounce_window, "Back online, debouncing before drain");
            self.set_state(SyncState::Debouncing);
            *debounce = Some(Box::pin(sleep(self.config.debounce_window)));
        } else if !now_online && debounce.is_some() {
            info!("Went offline during debounce, drain cancelled");
            *debounce = None;
            self.set_state(SyncState::Idle);
        }
        // Duplicate notifications of the same state change nothing.
    }

    /// Settle every queued transaction once, in insertion order.
    #[instrument(skip_all, fields(queued = self.queue.len()))]
    async fn drain_queue(&self, shutdown: &watch::Receiver<bool>) -> DrainReport {
        let pending = self.queue.drain();
        let mut report = DrainReport::default();

        for mut tx in pending {
            if *shutdown.borrow() {
                info!("Shutdown mid-drain, remaining entries stay queued");
                break;
            }

            if let Err(err) = tx.transition_to(TransactionStatus::Syncing) {
                warn!(id = %tx.id, error = %err, "Skipping entry with unexpected status");
                continue;
            }

            match self.settler.settle(&tx).await {
                Ok(()) => {
                    // Queued → Syncing → Settled always holds here.
                    let _ = tx.transition_to(TransactionStatus::Settled);
                    self.queue.settle(&tx.id);
                    self.emitter.on_transaction_settled(&tx);
                    report.settled += 1;
                }
                Err(err) => {
                    let _ = tx.transition_to(TransactionStatus::Failed);
                    self.queue.fail(&tx.id);
                    self.emitter.on_transaction_failed(&tx, &err.to_string());
                    report.failed += 1;
                }
            }
        }

        info!(
            settled = report.settled,
            failed = report.failed,
            "Drain complete"
        );
        report
    }

    fn set_state(&self, next: SyncState) {
        *self.state.write() = next;
        debug!(state = ?next, "Coordinator state changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::time::Duration;

    use pesaflow_common::{CurrencyCode, Transaction, TransactionId, TransactionKind};
    use pesaflow_store::MemoryStore;

    use crate::settler::SettlementError;

    #[derive(Default)]
    struct RecordingSettler {
        attempts: Mutex<Vec<TransactionId>>,
        failing: Mutex<HashSet<TransactionId>>,
    }

    impl RecordingSettler {
        fn fail_for(&self, id: TransactionId) {
            self.failing.lock().insert(id);
        }

        fn attempts(&self) -> Vec<TransactionId> {
            self.attempts.lock().clone()
        }
    }

    #[async_trait]
    impl Settler for RecordingSettler {
        async fn settle(&self, tx: &Transaction) -> Result<(), SettlementError> {
            self.attempts.lock().push(tx.id);
            if self.failing.lock().contains(&tx.id) {
                Err(SettlementError::Rejected("insufficient balance".into()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Outcome {
        Settled,
        Failed,
    }

    #[derive(Default)]
    struct RecordingEmitter {
        outcomes: Mutex<Vec<(TransactionId, Outcome)>>,
    }

    impl RecordingEmitter {
        fn outcomes(&self) -> Vec<(TransactionId, Outcome)> {
            self.outcomes.lock().clone()
        }
    }

    impl NotificationEmitter for RecordingEmitter {
        fn on_transaction_settled(&self, tx: &Transaction) {
            self.outcomes.lock().push((tx.id, Outcome::Settled));
        }

        fn on_transaction_failed(&self, tx: &Transaction, _reason: &str) {
            self.outcomes.lock().push((tx.id, Outcome::Failed));
        }
    }

    struct Fixture {
        queue: Arc<PendingQueue>,
        settler: Arc<RecordingSettler>,
        emitter: Arc<RecordingEmitter>,
        monitor: Arc<ConnectivityMonitor>,
    }

    fn setup(initially_online: bool) -> Fixture {
        Fixture {
            queue: Arc::new(PendingQueue::hydrate(Arc::new(MemoryStore::new()))),
            settler: Arc::new(RecordingSettler::default()),
            emitter: Arc::new(RecordingEmitter::default()),
            monitor: Arc::new(ConnectivityMonitor::new(initially_online)),
        }
    }

    fn spawn_coordinator(fixture: &Fixture) -> SyncHandle {
        SyncCoordinator::new(
            fixture.queue.clone(),
            fixture.settler.clone(),
            fixture.emitter.clone(),
            SyncConfig::default(),
        )
        .spawn(fixture.monitor.clone())
    }

    fn make_tx() -> Transaction {
        Transaction::new(
            TransactionKind::Remittance,
            dec!(50),
            CurrencyCode::usd(),
            CurrencyCode::kes(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_drains_in_order_after_debounce() {
        let fixture = setup(false);
        let txs: Vec<Transaction> = (0..3).map(|_| make_tx()).collect();
        for tx in &txs {
            fixture.queue.enqueue(tx.clone());
        }
        let handle = spawn_coordinator(&fixture);

        fixture.monitor.report(true);
        tokio::time::sleep(Duration::from_secs(3)).await;

        let expected: Vec<_> = txs.iter().map(|tx| tx.id).collect();
        assert_eq!(fixture.settler.attempts(), expected);
        assert!(fixture.queue.is_empty());
        assert_eq!(handle.state(), SyncState::Idle);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_flip_cancels_debounce() {
        let fixture = setup(false);
        fixture.queue.enqueue(make_tx());
        let handle = spawn_coordinator(&fixture);

        fixture.monitor.report(true);
        tokio::time::sleep(Duration::from_secs(1)).await;
        fixture.monitor.report(false);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(fixture.settler.attempts().is_empty());
        assert_eq!(fixture.queue.len(), 1);
        assert_eq!(handle.state(), SyncState::Idle);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_does_not_block_queue() {
        let fixture = setup(false);
        let t1 = make_tx();
        let t2 = make_tx();
        let t3 = make_tx();
        for tx in [&t1, &t2, &t3] {
            fixture.queue.enqueue((*tx).clone());
        }
        fixture.settler.fail_for(t2.id);
        let handle = spawn_coordinator(&fixture);

        fixture.monitor.report(true);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(
            fixture.emitter.outcomes(),
            vec![
                (t1.id, Outcome::Settled),
                (t2.id, Outcome::Failed),
                (t3.id, Outcome::Settled),
            ]
        );
        // Failed entries are evicted too, not retained as queued.
        assert!(fixture.queue.is_empty());
        assert_eq!(
            handle.last_drain(),
            Some(DrainReport {
                settled: 2,
                failed: 1
            })
        );

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumes_drain_when_starting_online() {
        let fixture = setup(true);
        let tx = make_tx();
        fixture.queue.enqueue(tx.clone());
        let handle = spawn_coordinator(&fixture);

        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(fixture.settler.attempts(), vec![tx.id]);
        assert!(fixture.queue.is_empty());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagged_notifications_resample_monitor() {
        let fixture = setup(true);
        let handle = spawn_coordinator(&fixture);
        // Let the task reach its event loop with an empty queue.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let tx = make_tx();
        fixture.queue.enqueue(tx.clone());
        // Overflow the notification buffer without yielding, so the
        // offline report and the online edge after it are lost and only
        // duplicate online notifications survive.
        fixture.monitor.report(false);
        for _ in 0..17 {
            fixture.monitor.report(true);
        }
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(fixture.settler.attempts(), vec![tx.id]);
        assert!(fixture.queue.is_empty());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_online_reports_do_not_restart_window() {
        let fixture = setup(false);
        fixture.queue.enqueue(make_tx());
        let handle = spawn_coordinator(&fixture);

        fixture.monitor.report(true);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        // A duplicate Online must not push the drain further out.
        fixture.monitor.report(true);
        tokio::time::sleep(Duration::from_millis(700)).await;

        assert_eq!(fixture.settler.attempts().len(), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_debounce_leaves_queue_intact() {
        let fixture = setup(false);
        fixture.queue.enqueue(make_tx());
        let handle = spawn_coordinator(&fixture);

        fixture.monitor.report(true);
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.shutdown().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(fixture.settler.attempts().is_empty());
        assert_eq!(fixture.queue.len(), 1);
    }
}
