use tracing::{debug, info, instrument, warn};

use super::classify::classify;
use crate::ports::outgoing::paid_action::DynPaidActionPort;
use domain::action::GatedActionRequest;
use domain::auth::Identity;
use domain::outcome::GatedActionOutcome;

/// Issues one paid-action request and classifies whatever comes back.
pub struct ActionExecutor {
    port: DynPaidActionPort,
}

impl ActionExecutor {
    pub fn new(port: DynPaidActionPort) -> Self {
        Self { port }
    }

    #[instrument(skip(self, identity, request), fields(kind = %request.kind(), user_id = %identity.user_id))]
    pub async fn execute(
        &self,
        identity: &Identity,
        request: &GatedActionRequest,
    ) -> GatedActionOutcome {
        let raw = self.port.send(identity, request).await;
        if let Ok(response) = &raw {
            debug!(status = response.status, "Paid action responded");
        }

        let outcome = classify(raw);
        match &outcome {
            GatedActionOutcome::Accepted(_) => info!("Paid action accepted"),
            GatedActionOutcome::InsufficientCredits { needed, remaining } => {
                info!(needed, remaining, "Paid action refused for insufficient credits");
            }
            GatedActionOutcome::Rejected(message) => {
                warn!(reason = %message, "Paid action rejected");
            }
            GatedActionOutcome::TransportError(message) => {
                warn!(error = %message, "Paid action transport failure");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::test_support::{FakePaidActionPort, identity};
    use domain::action::{ImageId, JobId};

    #[tokio::test]
    async fn executes_exactly_one_call() {
        let port = Arc::new(FakePaidActionPort::new());
        port.respond(200, r#"{"download_url":"https://cdn.example.com/full.jpg"}"#);
        let executor = ActionExecutor::new(Arc::clone(&port) as DynPaidActionPort);

        let request = GatedActionRequest::DownloadImage {
            job_id: JobId::new("job-1"),
            image_id: ImageId::new("img-1"),
        };
        let outcome = executor.execute(&identity("a@example.com"), &request).await;

        assert_eq!(port.calls.load(Ordering::SeqCst), 1);
        let GatedActionOutcome::Accepted(confirmation) = outcome else {
            unreachable!("expected accepted outcome");
        };
        assert_eq!(
            confirmation.download_url(),
            Some("https://cdn.example.com/full.jpg")
        );
    }
}
