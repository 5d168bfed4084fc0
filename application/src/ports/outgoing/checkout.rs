use std::sync::Arc;

use crate::error::AppResult;
use domain::auth::Identity;
use domain::checkout::CreditPack;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutSessionResponse {
    pub url: Option<String>,
}

#[async_trait::async_trait]
pub trait CheckoutPort: Send + Sync {
    async fn create_checkout_session(
        &self,
        identity: &Identity,
        pack: &CreditPack,
    ) -> AppResult<CheckoutSessionResponse>;
}

pub type DynCheckoutPort = Arc<dyn CheckoutPort>;
