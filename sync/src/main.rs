//! Pesaflow Demo Binary
//!
//! Wires the whole offline pipeline together: transactions queued while
//! offline are drained once connectivity returns, with amounts computed
//! through the currency registry.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pesaflow_common::{CurrencyCode, Transaction, TransactionKind};
use pesaflow_connectivity::ConnectivityMonitor;
use pesaflow_currency::CurrencyRegistry;
use pesaflow_queue::PendingQueue;
use pesaflow_store::FileStore;
use pesaflow_sync::{
    LogEmitter, SettlementError, Settler, SyncConfig, SyncCoordinator,
};

/// Demo settler that accepts everything.
struct AcceptAllSettler;

#[async_trait]
impl Settler for AcceptAllSettler {
    async fn settle(&self, tx: &Transaction) -> Result<(), SettlementError> {
        info!(id = %tx.id, "Settling against demo backend");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pesaflow demo");

    let store_path = std::env::temp_dir().join("pesaflow-demo.json");
    let store = Arc::new(FileStore::open(&store_path));
    let queue = Arc::new(PendingQueue::hydrate(store));
    let registry = CurrencyRegistry::with_defaults();

    // The device starts offline; operations land in the queue.
    let monitor = Arc::new(ConnectivityMonitor::new(false));

    let usd = CurrencyCode::usd();
    let kes = CurrencyCode::kes();
    let amount = Decimal::from(100);
    let converted = registry.convert(amount, &usd, &kes);
    info!(
        input = %registry.format(amount, &usd),
        output = %registry.format(converted, &kes),
        "Exchange quote while offline"
    );

    queue.enqueue(Transaction::new(
        TransactionKind::Exchange,
        amount,
        usd.clone(),
        kes.clone(),
    ));
    queue.enqueue(Transaction::new(
        TransactionKind::Remittance,
        Decimal::from(250),
        usd,
        kes,
    ));
    info!(queued = queue.len(), "Transactions captured offline");

    let coordinator = SyncCoordinator::new(
        queue.clone(),
        Arc::new(AcceptAllSettler),
        Arc::new(LogEmitter),
        SyncConfig::from_env(),
    );
    let handle = coordinator.spawn(monitor.clone());

    // Connectivity returns; the coordinator debounces, then drains.
    monitor.report(true);
    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    info!(remaining = queue.len(), report = ?handle.last_drain(), "Demo complete");
    handle.shutdown().await;
    Ok(())
}
