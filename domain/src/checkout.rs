use serde::{Deserialize, Serialize};

use crate::credits::Credits;
use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPack {
    pub price_id: String,
    pub label: String,
    pub credits: Credits,
}

impl CreditPack {
    pub fn new(price_id: impl Into<String>, label: impl Into<String>, credits: Credits) -> Self {
        Self {
            price_id: price_id.into(),
            label: label.into(),
            credits,
        }
    }
}

/// Redirect target at the payment processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub url: String,
}

pub fn find_pack<'a>(packs: &'a [CreditPack], price_id: &str) -> DomainResult<&'a CreditPack> {
    packs
        .iter()
        .find(|pack| pack.price_id == price_id)
        .ok_or_else(|| DomainError::UnknownCreditPack(price_id.to_string()))
}
