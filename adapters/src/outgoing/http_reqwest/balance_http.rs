use serde_json::Value;
use tracing::{debug, instrument};

use super::{BackendHttpClient, read_json, transport_error};
use domain::auth::Identity;
use domain::credits::Credits;
use poolify_application::{error::AppResult, ports::outgoing::balance_endpoint::BalancePort};

pub struct HttpBalanceAdapter {
    client: BackendHttpClient,
}

impl HttpBalanceAdapter {
    pub fn new(client: BackendHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl BalancePort for HttpBalanceAdapter {
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    async fn fetch_credits(&self, identity: &Identity) -> AppResult<Credits> {
        let url = self.client.endpoint(&["me", "credits"])?;
        let user_id = identity.user_id.to_string();

        let mut query = vec![("user_id", user_id.as_str())];
        if !identity.email.is_empty() {
            query.push(("email", identity.email.as_str()));
        }

        let response = self
            .client
            .http()
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let body = read_json(response).await?;

        // A missing or non-numeric field reads as an empty balance.
        let credits = body
            .get("credits")
            .and_then(Value::as_u64)
            .and_then(|credits| Credits::try_from(credits).ok())
            .unwrap_or(0);

        debug!(credits, "Fetched credit balance");
        Ok(credits)
    }
}
