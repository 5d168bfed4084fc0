use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::credits::Credits;
use crate::gallery::JobSummary;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub email: Option<String>,
}

/// One credit pack bought through checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    #[serde(default)]
    pub credits_purchased: Credits,
    #[serde(default)]
    pub status: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl Purchase {
    pub fn is_paid(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "paid" | "completed" | "succeeded"
        )
    }
}

/// What the account page and the post-checkout confirmation show.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountOverview {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub recent_purchases: Vec<Purchase>,
    #[serde(default)]
    pub recent_jobs: Vec<JobSummary>,
}

impl AccountOverview {
    pub fn credits(&self) -> Credits {
        self.profile.credits
    }

    /// Credits from paid purchases in the recent list.
    pub fn recently_purchased_credits(&self) -> Credits {
        self.recent_purchases
            .iter()
            .filter(|purchase| purchase.is_paid())
            .map(|purchase| purchase.credits_purchased)
            .fold(0, Credits::saturating_add)
    }
}
