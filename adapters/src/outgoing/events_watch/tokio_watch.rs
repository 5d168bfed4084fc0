use tokio::sync::watch::{self, Receiver, Sender};
use tracing::debug;

use domain::credits::BalanceSnapshot;
use poolify_application::{error::AppResult, ports::outgoing::balance_events::BalanceEventsPort};

/// Fans the cached balance out to every view that displays it.
///
/// Late subscribers see the latest snapshot immediately.
pub struct TokioWatchBalanceAdapter {
    tx: Sender<BalanceSnapshot>,
    log_snapshots: bool,
}

impl TokioWatchBalanceAdapter {
    pub fn new(log_snapshots: bool) -> Self {
        let (tx, _) = watch::channel(BalanceSnapshot::empty());
        Self { tx, log_snapshots }
    }

    pub fn subscribe(&self) -> Receiver<BalanceSnapshot> {
        self.tx.subscribe()
    }
}

impl BalanceEventsPort for TokioWatchBalanceAdapter {
    fn publish_balance(&self, snapshot: &BalanceSnapshot) -> AppResult<()> {
        if self.log_snapshots {
            debug!(
                credits = ?snapshot.credits,
                loading = snapshot.loading,
                error = ?snapshot.error,
                "Balance snapshot"
            );
        }
        self.tx.send_replace(snapshot.clone());
        Ok(())
    }
}
