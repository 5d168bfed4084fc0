use serde_json::Value;
use thiserror::Error;

use crate::credits::{Credits, InsufficientCredits};

pub const INSUFFICIENT_CREDITS_MARKER: &str = "insufficient_credits";

/// Success payload of a paid action, kept exactly as the backend sent it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Confirmation {
    pub body: Value,
}

impl Confirmation {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    fn string_field(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    pub fn gallery_url(&self) -> Option<&str> {
        self.string_field("gallery_url")
    }

    pub fn job_id(&self) -> Option<&str> {
        self.string_field("job_id")
            .or_else(|| self.string_field("id"))
    }

    /// One-time location of a full-resolution image.
    pub fn download_url(&self) -> Option<&str> {
        self.string_field("download_url")
            .or_else(|| self.string_field("url"))
    }

    pub fn message(&self) -> Option<&str> {
        self.string_field("message")
    }
}

/// Every paid-action response reduces to exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum GatedActionOutcome {
    Accepted(Confirmation),
    InsufficientCredits { needed: Credits, remaining: Credits },
    Rejected(String),
    TransportError(String),
}

impl GatedActionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accepted",
            Self::InsufficientCredits { .. } => "insufficient_credits",
            Self::Rejected(_) => "rejected",
            Self::TransportError(_) => "transport_error",
        }
    }

    pub fn into_result(self) -> Result<Confirmation, GateError> {
        match self {
            Self::Accepted(confirmation) => Ok(confirmation),
            Self::InsufficientCredits { needed, remaining } => {
                Err(GateError::InsufficientBalance(InsufficientCredits::new(
                    needed, remaining,
                )))
            }
            Self::Rejected(message) => Err(GateError::BackendRejected(message)),
            Self::TransportError(message) => Err(GateError::Transport(message)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Sign in to continue")]
    IdentityAbsent,

    #[error(transparent)]
    InsufficientBalance(InsufficientCredits),

    #[error("{0}")]
    BackendRejected(String),

    #[error("{0}")]
    Transport(String),
}

impl GateError {
    /// Guidance states are rendered as prompts (sign in, top up), not as errors.
    pub fn is_guidance(&self) -> bool {
        matches!(self, Self::IdentityAbsent | Self::InsufficientBalance(_))
    }
}
