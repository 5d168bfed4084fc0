use std::sync::Arc;

use thiserror::Error;

use domain::action::GatedActionRequest;
use domain::auth::Identity;

/// Response of a paid-action endpoint before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait PaidActionPort: Send + Sync {
    async fn send(
        &self,
        identity: &Identity,
        request: &GatedActionRequest,
    ) -> Result<RawResponse, TransportFailure>;
}

pub type DynPaidActionPort = Arc<dyn PaidActionPort>;
