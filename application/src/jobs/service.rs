use tracing::{debug, instrument};

use crate::error::{AppError, AppResult};
use crate::ports::incoming::jobs::JobsQueryUseCase;
use crate::ports::outgoing::jobs::DynJobsPort;
use domain::auth::Identity;
use domain::gallery::{Gallery, JobSummary};

pub struct JobsService {
    port: DynJobsPort,
}

impl JobsService {
    pub fn new(port: DynJobsPort) -> Self {
        Self { port }
    }
}

#[async_trait::async_trait]
impl JobsQueryUseCase for JobsService {
    #[instrument(skip(self, identity))]
    async fn list_jobs(&self, identity: Option<&Identity>) -> AppResult<Vec<JobSummary>> {
        let identity = identity.ok_or_else(|| AppError::Unauthorized {
            message: "Sign in to see your designs.".to_string(),
        })?;

        let jobs = self.port.list_jobs(identity).await?;
        debug!(user_id = %identity.user_id, count = jobs.len(), "Loaded jobs");
        Ok(jobs)
    }

    #[instrument(skip(self))]
    async fn gallery(&self, token: &str) -> AppResult<Gallery> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::ValidationError {
                message: "Missing token".to_string(),
            });
        }
        self.port.fetch_gallery(token).await
    }
}
