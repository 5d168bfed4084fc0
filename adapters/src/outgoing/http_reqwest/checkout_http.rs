use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::{BackendHttpClient, read_json, transport_error};
use domain::auth::Identity;
use domain::checkout::CreditPack;
use poolify_application::{
    error::AppResult,
    ports::outgoing::checkout::{CheckoutPort, CheckoutSessionResponse},
};

#[derive(Debug, Serialize)]
struct CheckoutSessionRequest<'a> {
    user_id: String,
    price_id: &'a str,
}

pub struct HttpCheckoutAdapter {
    client: BackendHttpClient,
}

impl HttpCheckoutAdapter {
    pub fn new(client: BackendHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl CheckoutPort for HttpCheckoutAdapter {
    #[instrument(skip(self, identity, pack), fields(price_id = %pack.price_id))]
    async fn create_checkout_session(
        &self,
        identity: &Identity,
        pack: &CreditPack,
    ) -> AppResult<CheckoutSessionResponse> {
        let url = self
            .client
            .endpoint(&["credits", "create-checkout-session"])?;

        let response = self
            .client
            .http()
            .post(url)
            .json(&CheckoutSessionRequest {
                user_id: identity.user_id.to_string(),
                price_id: &pack.price_id,
            })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let body = read_json(response).await?;

        Ok(CheckoutSessionResponse {
            url: body.get("url").and_then(Value::as_str).map(str::to_string),
        })
    }
}
