use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use super::BackendHttpClient;
use domain::action::{GatedActionRequest, JobSubmission};
use domain::auth::Identity;
use poolify_application::ports::outgoing::paid_action::{
    PaidActionPort, RawResponse, TransportFailure,
};

#[derive(Debug, Serialize)]
struct VariantsBody<'a> {
    user_id: String,
    base_image_url: &'a str,
    num_variants: u32,
}

#[derive(Debug, Serialize)]
struct DownloadBody<'a> {
    user_id: String,
    email: &'a str,
}

/// One endpoint per action kind; responses are handed back unclassified.
pub struct HttpPaidActionAdapter {
    client: BackendHttpClient,
}

impl HttpPaidActionAdapter {
    pub fn new(client: BackendHttpClient) -> Self {
        Self { client }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportFailure> {
        self.client
            .endpoint(segments)
            .map_err(|e| TransportFailure::new(e.to_string()))
    }

    fn build(
        &self,
        identity: &Identity,
        request: &GatedActionRequest,
    ) -> Result<RequestBuilder, TransportFailure> {
        let http = self.client.http();
        let builder = match request {
            GatedActionRequest::GenerateVariants {
                job_id,
                base_image_url,
                num_variants,
            } => http
                .post(self.endpoint(&["jobs", job_id.as_str(), "variants"])?)
                .json(&VariantsBody {
                    user_id: identity.user_id.to_string(),
                    base_image_url,
                    num_variants: *num_variants,
                }),
            GatedActionRequest::DownloadImage { job_id, image_id } => http
                .post(self.endpoint(&[
                    "jobs",
                    job_id.as_str(),
                    "images",
                    image_id.as_str(),
                    "download",
                ])?)
                .json(&DownloadBody {
                    user_id: identity.user_id.to_string(),
                    email: &identity.email,
                }),
            GatedActionRequest::CreateJob(submission) => http
                .post(self.endpoint(&["jobs", "from-app"])?)
                .multipart(job_form(identity, submission)?),
        };
        Ok(builder)
    }
}

fn job_form(identity: &Identity, submission: &JobSubmission) -> Result<Form, TransportFailure> {
    let mut form = Form::new()
        .text("user_id", identity.user_id.to_string())
        .text("email", submission.email.trim().to_string());

    let optional = [
        ("name", &submission.name),
        ("zip", &submission.zip),
        ("style", &submission.style),
        ("style_other", &submission.style_other),
        ("intensity", &submission.intensity),
        ("budget", &submission.budget),
    ];
    for (field, value) in optional {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            form = form.text(field, value.to_string());
        }
    }

    let photo = Part::bytes(submission.photo.bytes.clone())
        .file_name(submission.photo.file_name.clone())
        .mime_str(&submission.photo.content_type)
        .map_err(|e| TransportFailure::new(format!("Invalid photo content type: {e}")))?;

    Ok(form
        .text("num_variants", submission.num_designs.to_string())
        .part("file", photo))
}

async fn into_raw(response: Response) -> Result<RawResponse, TransportFailure> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportFailure::new(format!("Failed to read response body: {e}")))?;

    Ok(RawResponse::new(
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        body,
    ))
}

#[async_trait::async_trait]
impl PaidActionPort for HttpPaidActionAdapter {
    #[instrument(skip(self, identity, request), fields(kind = %request.kind()))]
    async fn send(
        &self,
        identity: &Identity,
        request: &GatedActionRequest,
    ) -> Result<RawResponse, TransportFailure> {
        let response = self.build(identity, request)?.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::new("Backend request timed out")
            } else {
                TransportFailure::new(e.to_string())
            }
        })?;

        let raw = into_raw(response).await?;
        debug!(status = raw.status, "Paid action endpoint answered");
        Ok(raw)
    }
}
