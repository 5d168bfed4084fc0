use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use crate::balance::reader::BalanceReader;
use crate::error::{AppError, AppResult};
use crate::ports::incoming::coupon::CouponUseCase;
use crate::ports::outgoing::coupon::DynCouponPort;
use domain::auth::Identity;
use domain::credits::Credits;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRedemption {
    /// Balance reported by the backend in its redemption response.
    pub reported_credits: Option<Credits>,
}

pub struct CouponService {
    port: DynCouponPort,
    balance: Arc<BalanceReader>,
}

impl CouponService {
    pub fn new(port: DynCouponPort, balance: Arc<BalanceReader>) -> Self {
        Self { port, balance }
    }
}

#[async_trait::async_trait]
impl CouponUseCase for CouponService {
    #[instrument(skip(self, identity, access_token))]
    async fn redeem(
        &self,
        identity: Option<&Identity>,
        access_token: &SecretString,
        code: &str,
    ) -> AppResult<CouponRedemption> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::ValidationError {
                message: "Enter a coupon code.".to_string(),
            });
        }

        let identity = identity.ok_or_else(|| AppError::Unauthorized {
            message: "You need to be logged in to redeem a coupon.".to_string(),
        })?;
        if access_token.expose_secret().trim().is_empty() {
            return Err(AppError::Unauthorized {
                message: "Could not find a valid access token.".to_string(),
            });
        }

        let response = self.port.redeem_coupon(access_token, code).await?;
        if !response.success {
            return Err(AppError::ValidationError {
                message: response
                    .error
                    .unwrap_or_else(|| "Could not redeem coupon. Please try again.".to_string()),
            });
        }

        info!(user_id = %identity.user_id, "Coupon redeemed");
        self.balance.revalidate().await;

        Ok(CouponRedemption {
            reported_credits: response.credits,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::ports::outgoing::balance_endpoint::DynBalancePort;
    use crate::ports::outgoing::balance_events::DynBalanceEventsPort;
    use crate::ports::outgoing::coupon::RedeemResponse;
    use crate::test_support::{FakeBalancePort, FakeCouponPort, RecordingEvents, identity};
    use domain::auth::IdentityState;

    async fn setup(response: RedeemResponse) -> (CouponService, Arc<FakeCouponPort>, Arc<FakeBalancePort>) {
        let balance_port = Arc::new(FakeBalancePort::with_credits(3));
        let balance = Arc::new(BalanceReader::new(
            Arc::clone(&balance_port) as DynBalancePort,
            Arc::new(RecordingEvents::default()) as DynBalanceEventsPort,
        ));
        balance
            .set_identity(IdentityState::SignedIn(identity("a@example.com")))
            .await;
        let coupon_port = Arc::new(FakeCouponPort {
            response,
            seen: Mutex::new(Vec::new()),
        });
        let service = CouponService::new(Arc::clone(&coupon_port) as DynCouponPort, balance);
        (service, coupon_port, balance_port)
    }

    #[tokio::test]
    async fn successful_redemption_rereads_balance() {
        let (service, coupon_port, balance_port) = setup(RedeemResponse {
            success: true,
            credits: Some(13),
            error: None,
        })
        .await;
        balance_port.set_credits(13);

        let redemption = service
            .redeem(
                Some(&identity("a@example.com")),
                &SecretString::from("token-abc"),
                "  PHLAUNCH ",
            )
            .await
            .unwrap();

        assert_eq!(redemption.reported_credits, Some(13));
        assert_eq!(balance_port.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            coupon_port.seen.lock().unwrap().first(),
            Some(&("token-abc".to_string(), "PHLAUNCH".to_string()))
        );
    }

    #[tokio::test]
    async fn backend_refusal_is_surfaced() {
        let (service, _, balance_port) = setup(RedeemResponse {
            success: false,
            credits: None,
            error: Some("Coupon already used".to_string()),
        })
        .await;

        let result = service
            .redeem(
                Some(&identity("a@example.com")),
                &SecretString::from("token-abc"),
                "PHLAUNCH",
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::ValidationError { message }) if message == "Coupon already used"
        ));
        assert_eq!(balance_port.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_code_and_missing_token_are_refused() {
        let (service, coupon_port, _) = setup(RedeemResponse::default()).await;
        let who = identity("a@example.com");

        let empty = service
            .redeem(Some(&who), &SecretString::from("token"), "   ")
            .await;
        assert!(matches!(empty, Err(AppError::ValidationError { .. })));

        let no_token = service
            .redeem(Some(&who), &SecretString::from(""), "PHLAUNCH")
            .await;
        assert!(matches!(no_token, Err(AppError::Unauthorized { .. })));
        assert!(coupon_port.seen.lock().unwrap().is_empty());
    }
}
