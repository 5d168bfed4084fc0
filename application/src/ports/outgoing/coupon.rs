use std::sync::Arc;

use secrecy::SecretString;

use crate::error::AppResult;
use domain::credits::Credits;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedeemResponse {
    pub success: bool,
    pub credits: Option<Credits>,
    pub error: Option<String>,
}

#[async_trait::async_trait]
pub trait CouponPort: Send + Sync {
    async fn redeem_coupon(
        &self,
        access_token: &SecretString,
        coupon: &str,
    ) -> AppResult<RedeemResponse>;
}

pub type DynCouponPort = Arc<dyn CouponPort>;
