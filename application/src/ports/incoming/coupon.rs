use secrecy::SecretString;

use crate::coupon::service::CouponRedemption;
use crate::error::AppResult;
use domain::auth::Identity;

#[async_trait::async_trait]
pub trait CouponUseCase: Send + Sync {
    async fn redeem(
        &self,
        identity: Option<&Identity>,
        access_token: &SecretString,
        code: &str,
    ) -> AppResult<CouponRedemption>;
}
