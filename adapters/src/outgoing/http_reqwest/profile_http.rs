use tracing::{debug, instrument};

use super::{BackendHttpClient, read_json, transport_error};
use domain::auth::Identity;
use domain::profile::AccountOverview;
use poolify_application::{error::AppResult, ports::outgoing::profile::ProfilePort};

pub struct HttpProfileAdapter {
    client: BackendHttpClient,
}

impl HttpProfileAdapter {
    pub fn new(client: BackendHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ProfilePort for HttpProfileAdapter {
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    async fn fetch_overview(&self, identity: &Identity) -> AppResult<AccountOverview> {
        let url = self.client.endpoint(&["me", "profile"])?;
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
        let overview: AccountOverview = serde_json::from_value(body)?;
        debug!(
            credits = overview.credits(),
            purchases = overview.recent_purchases.len(),
            jobs = overview.recent_jobs.len(),
            "Fetched account overview"
        );
        Ok(overview)
    }
}
