use std::sync::Arc;

use crate::error::AppResult;
use domain::auth::Identity;
use domain::credits::Credits;

#[async_trait::async_trait]
pub trait BalancePort: Send + Sync {
    async fn fetch_credits(&self, identity: &Identity) -> AppResult<Credits>;
}

pub type DynBalancePort = Arc<dyn BalancePort>;
