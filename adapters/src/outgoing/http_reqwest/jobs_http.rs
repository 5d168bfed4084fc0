use serde::Deserialize;
use tracing::instrument;

use super::{BackendHttpClient, read_json, transport_error};
use domain::auth::Identity;
use domain::gallery::{Gallery, JobSummary};
use poolify_application::{
    error::{AppError, AppResult},
    ports::outgoing::jobs::JobsPort,
};

#[derive(Debug, Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs: Vec<JobSummary>,
}

pub struct HttpJobsAdapter {
    client: BackendHttpClient,
}

impl HttpJobsAdapter {
    pub fn new(client: BackendHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl JobsPort for HttpJobsAdapter {
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    async fn list_jobs(&self, identity: &Identity) -> AppResult<Vec<JobSummary>> {
        let url = self.client.endpoint(&["me", "jobs"])?;
        let response = self
            .client
            .http()
            .get(url)
            .query(&[("user_id", identity.user_id.to_string())])
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let body = read_json(response).await?;
        let parsed: JobsResponse = serde_json::from_value(body)?;
        Ok(parsed.jobs)
    }

    #[instrument(skip(self))]
    async fn fetch_gallery(&self, token: &str) -> AppResult<Gallery> {
        let url = self.client.endpoint(&["api", "gallery", token])?;
        let response = self
            .client
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError {
                message: format!(
                    "HTTP {} {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default(),
                    text.trim()
                ),
            });
        }

        let body = read_json(response).await?;
        Ok(serde_json::from_value(body)?)
    }
}
