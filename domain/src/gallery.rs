use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::action::{ImageId, JobId};
use crate::auth::Identity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub input_image_url: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub num_variants: Option<u32>,
    #[serde(default)]
    pub gallery_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

impl JobSummary {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
            || self
                .status
                .as_deref()
                .is_some_and(|status| status.eq_ignore_ascii_case("completed"))
    }

    /// Heading shown on a gallery: personalised once both name and zip are known.
    pub fn title(&self) -> String {
        match (self.customer_name.as_deref().map(str::trim), &self.zip) {
            (Some(name), Some(zip)) if !name.is_empty() => {
                format!("{name}'s Pool Ideas ({zip})")
            }
            _ => "Your Poolify Designs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobImage {
    pub id: ImageId,
    pub job_id: JobId,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub job: Option<JobSummary>,
    #[serde(default)]
    pub images: Vec<JobImage>,
}

impl Gallery {
    /// Variants may only be requested by the account that owns the job.
    pub fn can_request_variants(&self, identity: Option<&Identity>) -> bool {
        let Some(identity) = identity else {
            return false;
        };
        if identity.email.trim().is_empty() {
            return false;
        }
        match self.job.as_ref().and_then(|job| job.email.as_deref()) {
            Some(owner) if !owner.is_empty() => identity.email_matches(owner),
            _ => true,
        }
    }
}
