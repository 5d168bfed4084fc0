use tracing::{info, instrument};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::ports::incoming::checkout::CheckoutUseCase;
use crate::ports::outgoing::checkout::DynCheckoutPort;
use domain::auth::Identity;
use domain::checkout::{CheckoutSession, CreditPack, find_pack};

pub struct CheckoutService {
    port: DynCheckoutPort,
    packs: Vec<CreditPack>,
}

impl CheckoutService {
    pub fn new(port: DynCheckoutPort, packs: Vec<CreditPack>) -> Self {
        Self { port, packs }
    }
}

#[async_trait::async_trait]
impl CheckoutUseCase for CheckoutService {
    fn packs(&self) -> &[CreditPack] {
        &self.packs
    }

    #[instrument(skip(self, identity))]
    async fn start_checkout(
        &self,
        identity: Option<&Identity>,
        price_id: &str,
    ) -> AppResult<CheckoutSession> {
        let identity = identity.ok_or_else(|| AppError::Unauthorized {
            message: "Please sign in to your account to purchase credits.".to_string(),
        })?;
        let pack = find_pack(&self.packs, price_id)?;

        let response = self.port.create_checkout_session(identity, pack).await?;
        let url = response
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::ExternalServiceError {
                message: "Checkout URL not returned from server.".to_string(),
            })?;

        Url::parse(&url).map_err(|e| AppError::ExternalServiceError {
            message: format!("Checkout URL is not valid: {e}"),
        })?;

        info!(
            user_id = %identity.user_id,
            price_id = %pack.price_id,
            credits = pack.credits,
            "Checkout session created"
        );

        Ok(CheckoutSession { url })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::test_support::{FakeCheckoutPort, identity};
    use domain::error::DomainError;

    fn service(url: Option<&str>) -> (CheckoutService, Arc<FakeCheckoutPort>) {
        let port = Arc::new(FakeCheckoutPort {
            calls: AtomicUsize::new(0),
            url: url.map(str::to_string),
        });
        let service = CheckoutService::new(
            Arc::clone(&port) as DynCheckoutPort,
            vec![CreditPack::new("price_10", "10 credits", 10)],
        );
        (service, port)
    }

    #[tokio::test]
    async fn returns_processor_redirect() {
        let (service, _) = service(Some("https://checkout.stripe.com/c/pay/cs_test_1"));
        let session = service
            .start_checkout(Some(&identity("a@example.com")), "price_10")
            .await
            .unwrap();
        assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_test_1");
    }

    #[tokio::test]
    async fn anonymous_and_unknown_packs_never_reach_backend() {
        let (service, port) = service(Some("https://checkout.stripe.com/x"));

        let anonymous = service.start_checkout(None, "price_10").await;
        assert!(matches!(anonymous, Err(AppError::Unauthorized { .. })));

        let unknown = service
            .start_checkout(Some(&identity("a@example.com")), "price_99")
            .await;
        assert!(matches!(
            unknown,
            Err(AppError::Domain(DomainError::UnknownCreditPack(_)))
        ));
        assert_eq!(port.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_url_is_an_error() {
        let (service, _) = service(None);
        let result = service
            .start_checkout(Some(&identity("a@example.com")), "price_10")
            .await;
        assert!(matches!(
            result,
            Err(AppError::ExternalServiceError { message }) if message == "Checkout URL not returned from server."
        ));
    }
}
