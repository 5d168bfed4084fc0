use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::balance::reader::BalanceReader;
use crate::error::{AppError, AppResult};
use crate::ports::incoming::profile::ProfileQueryUseCase;
use crate::ports::outgoing::profile::DynProfilePort;
use domain::auth::Identity;
use domain::profile::AccountOverview;

pub struct ProfileService {
    port: DynProfilePort,
    balance: Arc<BalanceReader>,
}

impl ProfileService {
    pub fn new(port: DynProfilePort, balance: Arc<BalanceReader>) -> Self {
        Self { port, balance }
    }

    fn require(identity: Option<&Identity>) -> AppResult<&Identity> {
        identity.ok_or_else(|| AppError::Unauthorized {
            message: "Sign in to see your account.".to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ProfileQueryUseCase for ProfileService {
    #[instrument(skip(self, identity))]
    async fn overview(&self, identity: Option<&Identity>) -> AppResult<AccountOverview> {
        let identity = Self::require(identity)?;
        let overview = self.port.fetch_overview(identity).await?;
        debug!(
            user_id = %identity.user_id,
            credits = overview.credits(),
            purchases = overview.recent_purchases.len(),
            "Loaded account overview"
        );
        Ok(overview)
    }

    #[instrument(skip(self, identity))]
    async fn confirm_top_up(&self, identity: Option<&Identity>) -> AppResult<AccountOverview> {
        let identity = Self::require(identity)?;
        let overview = self.port.fetch_overview(identity).await?;
        info!(
            user_id = %identity.user_id,
            credits = overview.credits(),
            "Checkout confirmed"
        );

        // The shared balance is still the pre-checkout value until re-read.
        if self.balance.is_current(identity) {
            self.balance.revalidate().await;
        }
        Ok(overview)
    }
}
