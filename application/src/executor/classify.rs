use serde_json::Value;

use crate::ports::outgoing::paid_action::{RawResponse, TransportFailure};
use domain::credits::Credits;
use domain::outcome::{Confirmation, GatedActionOutcome, INSUFFICIENT_CREDITS_MARKER};

const PAYMENT_REQUIRED: u16 = 402;

/// Reduces a paid-action response to exactly one outcome.
pub fn classify(raw: Result<RawResponse, TransportFailure>) -> GatedActionOutcome {
    let response = match raw {
        Ok(response) => response,
        Err(failure) => return GatedActionOutcome::TransportError(failure.message),
    };

    let body = match parse_body(&response.body) {
        Ok(body) => body,
        Err(e) => {
            return GatedActionOutcome::TransportError(format!(
                "Invalid JSON response (HTTP {}): {e}",
                response.status
            ));
        }
    };

    if response.is_success() {
        return GatedActionOutcome::Accepted(Confirmation::new(body));
    }

    let payment_required = response.status == PAYMENT_REQUIRED;
    if let Some((needed, remaining)) = insufficient_credits(&body).filter(|_| payment_required) {
        return GatedActionOutcome::InsufficientCredits { needed, remaining };
    }

    GatedActionOutcome::Rejected(rejection_message(&body, &response))
}

// An absent body is not malformed JSON; 204s carry nothing to confirm.
fn parse_body(body: &str) -> Result<Value, serde_json::Error> {
    if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(body)
    }
}

fn count(body: &Value, key: &str) -> Option<Credits> {
    body.get(key)
        .and_then(Value::as_u64)
        .and_then(|value| Credits::try_from(value).ok())
}

fn insufficient_credits(body: &Value) -> Option<(Credits, Credits)> {
    let marker = body.get("error").and_then(Value::as_str)?;
    if marker != INSUFFICIENT_CREDITS_MARKER {
        return None;
    }
    Some((count(body, "needed")?, count(body, "remaining")?))
}

fn rejection_message(body: &Value, response: &RawResponse) -> String {
    let from_body = ["error", "message", "detail"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty());

    match from_body {
        Some(message) => message.to_string(),
        None if !response.status_text.trim().is_empty() => response.status_text.clone(),
        None => format!("HTTP {}", response.status),
    }
}
