use std::sync::Arc;

use crate::error::AppResult;
use domain::auth::Identity;
use domain::profile::AccountOverview;

#[async_trait::async_trait]
pub trait ProfilePort: Send + Sync {
    async fn fetch_overview(&self, identity: &Identity) -> AppResult<AccountOverview>;
}

pub type DynProfilePort = Arc<dyn ProfilePort>;
