use std::sync::Arc;

use crate::error::AppResult;
use domain::credits::BalanceSnapshot;

pub trait BalanceEventsPort: Send + Sync {
    fn publish_balance(&self, snapshot: &BalanceSnapshot) -> AppResult<()>;
}

pub type DynBalanceEventsPort = Arc<dyn BalanceEventsPort>;
