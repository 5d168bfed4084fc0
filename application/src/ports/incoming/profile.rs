use crate::error::AppResult;
use domain::auth::Identity;
use domain::profile::AccountOverview;

#[async_trait::async_trait]
pub trait ProfileQueryUseCase: Send + Sync {
    async fn overview(&self, identity: Option<&Identity>) -> AppResult<AccountOverview>;

    /// Loads the overview after returning from checkout and re-reads the balance.
    async fn confirm_top_up(&self, identity: Option<&Identity>) -> AppResult<AccountOverview>;
}
