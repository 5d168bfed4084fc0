use crate::error::AppResult;
use domain::auth::Identity;
use domain::checkout::{CheckoutSession, CreditPack};

#[async_trait::async_trait]
pub trait CheckoutUseCase: Send + Sync {
    fn packs(&self) -> &[CreditPack];
    async fn start_checkout(
        &self,
        identity: Option<&Identity>,
        price_id: &str,
    ) -> AppResult<CheckoutSession>;
}
