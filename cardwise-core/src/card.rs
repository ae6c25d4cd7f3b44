//! Card reward programs and the recommendations ranked from them

use serde::{Deserialize, Serialize};

use crate::category::{CanonicalCategory, RewardType};

/// One earn rate on a card: `multiplier` x per dollar in `category`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewardRule {
    pub category: CanonicalCategory,
    /// Earn rate, >= 0. 3.0 means 3x points / 3% cash back.
    pub multiplier: f64,
    pub reward_type: RewardType,
    pub description: String,
}

impl RewardRule {
    pub fn new(
        category: CanonicalCategory,
        multiplier: f64,
        reward_type: RewardType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            multiplier,
            reward_type,
            description: description.into(),
        }
    }
}

/// A credit-card reward program. Immutable once loaded into an index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardProgram {
    /// Unique catalog key
    pub id: String,
    pub display_name: String,
    /// Yearly fee in dollars, >= 0
    pub annual_fee: f64,
    /// At most one rule per category once the catalog is validated
    pub rules: Vec<RewardRule>,
}

impl CardProgram {
    /// The card's rule for exactly `category` (no catch-all fallback).
    pub fn rule_for(&self, category: CanonicalCategory) -> Option<&RewardRule> {
        self.rules.iter().find(|r| r.category == category)
    }

    /// Highest earn rate anywhere on the card
    pub fn best_multiplier(&self) -> f64 {
        self.rules
            .iter()
            .map(|r| r.multiplier)
            .fold(0.0, f64::max)
    }
}

/// A ranked card for one category. Created per call, owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardRecommendation {
    pub card_id: String,
    pub display_name: String,
    /// Effective multiplier after catch-all fallback
    pub multiplier: f64,
    pub reward_type: RewardType,
    pub annual_fee: f64,
    /// spend x multiplier / 100 x conversion factor
    pub estimated_monthly_value: f64,
    /// Only ever true on element 0
    pub is_top_choice: bool,
    /// Requested category, or catch-all when the card fell back
    pub matched_category: CanonicalCategory,
    pub description: String,
}

impl CardRecommendation {
    /// True when the multiplier came from the card's catch-all rule
    pub fn is_fallback(&self) -> bool {
        self.matched_category.is_catch_all()
    }
}
