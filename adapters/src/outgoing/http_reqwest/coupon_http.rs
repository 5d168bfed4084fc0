use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{BackendHttpClient, status_message, transport_error};
use domain::credits::Credits;
use poolify_application::{
    error::AppResult,
    ports::outgoing::coupon::{CouponPort, RedeemResponse},
};

#[derive(Debug, Serialize)]
struct RedeemRequest<'a> {
    coupon: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct RedeemBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    credits: Option<Credits>,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpCouponAdapter {
    client: BackendHttpClient,
}

impl HttpCouponAdapter {
    pub fn new(client: BackendHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl CouponPort for HttpCouponAdapter {
    #[instrument(skip(self, access_token))]
    async fn redeem_coupon(
        &self,
        access_token: &SecretString,
        coupon: &str,
    ) -> AppResult<RedeemResponse> {
        let url = self.client.endpoint(&["api", "redeem-coupon"])?;
        let response = self
            .client
            .http()
            .post(url)
            .bearer_auth(access_token.expose_secret())
            .json(&RedeemRequest { coupon })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(&e))?;
        let body: RedeemBody = serde_json::from_str(&text).unwrap_or_default();

        if !status.is_success() {
            return Ok(RedeemResponse {
                success: false,
                credits: None,
                error: body.error.or_else(|| Some(status_message(status))),
            });
        }

        Ok(RedeemResponse {
            success: body.success,
            credits: body.credits,
            error: body.error,
        })
    }
}
