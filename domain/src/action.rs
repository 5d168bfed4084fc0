use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::credits::{CostSchedule, Credits};
use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ImageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedActionKind {
    GenerateVariants,
    DownloadImage,
    CreateJob,
}

impl GatedActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateVariants => "generate_variants",
            Self::DownloadImage => "download_image",
            Self::CreateJob => "create_job",
        }
    }
}

impl Display for GatedActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPhoto {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Form fields of a new design job, mirrored one-to-one onto the backend form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    pub email: String,
    pub name: Option<String>,
    pub zip: Option<String>,
    pub style: Option<String>,
    pub style_other: Option<String>,
    pub intensity: Option<String>,
    pub budget: Option<String>,
    pub num_designs: u32,
    pub photo: UploadedPhoto,
}

impl JobSubmission {
    /// Preset styles are sent as-is; "Other" carries the free text in `style_other`.
    pub fn with_style(mut self, choice: &str, other_text: &str) -> Self {
        let other_text = other_text.trim();
        if choice == "Other" {
            self.style = Some("Other".to_string());
            self.style_other = (!other_text.is_empty()).then(|| other_text.to_string());
        } else if !choice.is_empty() {
            self.style = Some(choice.to_string());
            self.style_other = Some(choice.to_string());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatedActionRequest {
    GenerateVariants {
        job_id: JobId,
        base_image_url: String,
        num_variants: u32,
    },
    DownloadImage {
        job_id: JobId,
        image_id: ImageId,
    },
    CreateJob(JobSubmission),
}

impl GatedActionRequest {
    pub fn kind(&self) -> GatedActionKind {
        match self {
            Self::GenerateVariants { .. } => GatedActionKind::GenerateVariants,
            Self::DownloadImage { .. } => GatedActionKind::DownloadImage,
            Self::CreateJob(_) => GatedActionKind::CreateJob,
        }
    }

    pub fn declared_cost(&self, schedule: &CostSchedule) -> Credits {
        match self {
            Self::GenerateVariants { num_variants, .. } => {
                num_variants.saturating_mul(schedule.variant_credits_per_image)
            }
            Self::DownloadImage { .. } => schedule.download_credits,
            Self::CreateJob(submission) => submission
                .num_designs
                .saturating_mul(schedule.job_credits_per_design),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        match self {
            Self::GenerateVariants {
                job_id,
                base_image_url,
                num_variants,
            } => {
                if job_id.as_str().trim().is_empty() {
                    return Err(DomainError::InvalidRequest("Missing job id".to_string()));
                }
                if base_image_url.trim().is_empty() {
                    return Err(DomainError::InvalidRequest(
                        "Select an image first".to_string(),
                    ));
                }
                if *num_variants == 0 {
                    return Err(DomainError::InvalidRequest(
                        "Choose how many designs you want".to_string(),
                    ));
                }
            }
            Self::DownloadImage { job_id, image_id } => {
                if job_id.as_str().trim().is_empty() || image_id.as_str().trim().is_empty() {
                    return Err(DomainError::InvalidRequest(
                        "Missing job or image id".to_string(),
                    ));
                }
            }
            Self::CreateJob(submission) => {
                if submission.email.trim().is_empty() {
                    return Err(DomainError::InvalidRequest("Email is required".to_string()));
                }
                if submission.photo.bytes.is_empty() {
                    return Err(DomainError::InvalidRequest(
                        "Please upload a photo of your backyard".to_string(),
                    ));
                }
                if submission.num_designs == 0 {
                    return Err(DomainError::InvalidRequest(
                        "Choose how many designs you want".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
