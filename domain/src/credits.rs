use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

pub type Credits = u32;

/// Client-side cost estimates used for the fast-fail check only.
///
/// The backend decides the real price of every action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSchedule {
    pub variant_credits_per_image: Credits,
    pub job_credits_per_design: Credits,
    pub download_credits: Credits,
}

impl CostSchedule {
    pub fn new(
        variant_credits_per_image: Credits,
        job_credits_per_design: Credits,
        download_credits: Credits,
    ) -> Self {
        Self {
            variant_credits_per_image,
            job_credits_per_design,
            download_credits,
        }
    }
}

impl Default for CostSchedule {
    fn default() -> Self {
        Self::new(2, 1, 1)
    }
}

/// Last balance the backend reported, as displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BalanceSnapshot {
    pub credits: Option<Credits>,
    pub loading: bool,
    pub error: Option<String>,
}

impl BalanceSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn can_cover(&self, cost: Credits) -> Option<bool> {
        self.credits.map(|credits| credits >= cost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientCredits {
    pub needed: Credits,
    pub remaining: Credits,
}

impl InsufficientCredits {
    pub fn new(needed: Credits, remaining: Credits) -> Self {
        Self { needed, remaining }
    }

    pub fn shortfall(&self) -> Credits {
        self.needed.saturating_sub(self.remaining)
    }
}

impl Display for InsufficientCredits {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Insufficient credits: needed {}, remaining {}",
            self.needed, self.remaining
        )
    }
}

impl Error for InsufficientCredits {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_balance_cannot_decide_coverage() {
        let snapshot = BalanceSnapshot::empty();
        assert_eq!(snapshot.can_cover(1), None);

        let snapshot = BalanceSnapshot {
            credits: Some(3),
            ..BalanceSnapshot::default()
        };
        assert_eq!(snapshot.can_cover(3), Some(true));
        assert_eq!(snapshot.can_cover(4), Some(false));
    }

    #[test]
    fn shortfall_saturates() {
        assert_eq!(InsufficientCredits::new(6, 2).shortfall(), 4);
        assert_eq!(InsufficientCredits::new(1, 5).shortfall(), 0);
        assert_eq!(
            InsufficientCredits::new(6, 2).to_string(),
            "Insufficient credits: needed 6, remaining 2"
        );
    }
}
