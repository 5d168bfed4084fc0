use crate::error::AppResult;
use domain::auth::Identity;
use domain::gallery::{Gallery, JobSummary};

#[async_trait::async_trait]
pub trait JobsQueryUseCase: Send + Sync {
    async fn list_jobs(&self, identity: Option<&Identity>) -> AppResult<Vec<JobSummary>>;
    async fn gallery(&self, token: &str) -> AppResult<Gallery>;
}
