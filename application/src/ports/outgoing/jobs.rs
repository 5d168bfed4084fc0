use std::sync::Arc;

use crate::error::AppResult;
use domain::auth::Identity;
use domain::gallery::{Gallery, JobSummary};

#[async_trait::async_trait]
pub trait JobsPort: Send + Sync {
    async fn list_jobs(&self, identity: &Identity) -> AppResult<Vec<JobSummary>>;
    async fn fetch_gallery(&self, token: &str) -> AppResult<Gallery>;
}

pub type DynJobsPort = Arc<dyn JobsPort>;
