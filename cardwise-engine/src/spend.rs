//! Monthly spend estimates per category (injected, immutable)

use cardwise_core::CanonicalCategory;
use std::collections::HashMap;

/// Monthly dollars assumed for a category with no estimate
pub const DEFAULT_MONTHLY_SPEND: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SpendEstimates {
    default: f64,
    estimates: HashMap<CanonicalCategory, f64>,
}

impl Default for SpendEstimates {
    fn default() -> Self {
        Self {
            default: DEFAULT_MONTHLY_SPEND,
            estimates: HashMap::new(),
        }
    }
}

impl SpendEstimates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fallback. Ignored unless finite and >= 0.
    pub fn with_default(mut self, default: f64) -> Self {
        if default.is_finite() && default >= 0.0 {
            self.default = default;
        }
        self
    }

    /// Ignored unless finite and >= 0.
    pub fn with_estimate(mut self, category: CanonicalCategory, monthly: f64) -> Self {
        if monthly.is_finite() && monthly >= 0.0 {
            self.estimates.insert(category, monthly);
        }
        self
    }

    /// Estimate for `category`, or the default when there is none
    pub fn get(&self, category: CanonicalCategory) -> f64 {
        self.estimates.get(&category).copied().unwrap_or(self.default)
    }

    pub fn default_spend(&self) -> f64 {
        self.default
    }
}
