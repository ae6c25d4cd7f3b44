//! Debt accounts and the insights evaluated over them

use serde::{Deserialize, Serialize};

use crate::amount::{self, clamp_amount};

/// A debt account as handed over by upstream parsing.
///
/// Numeric fields are read leniently: numbers, numeric strings, or junk
/// (junk reads as 0). Call [`DebtAccount::normalized`] before doing math.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtAccount {
    pub name: String,
    /// Free text ("Credit Card", "mortgage", "Auto loan"), substring-matched
    #[serde(default, alias = "account_type", alias = "type")]
    pub account_type: String,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub balance: f64,
    /// Annual percentage rate, in percent (22.0 = 22%)
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub apr: f64,
    #[serde(default, alias = "minimum_payment", deserialize_with = "amount::deserialize")]
    pub minimum_payment: f64,
    #[serde(
        default,
        alias = "credit_limit",
        deserialize_with = "amount::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_limit: Option<f64>,
}

impl DebtAccount {
    pub fn new(name: impl Into<String>, account_type: impl Into<String>, balance: f64, apr: f64) -> Self {
        Self {
            name: name.into(),
            account_type: account_type.into(),
            balance,
            apr,
            minimum_payment: 0.0,
            credit_limit: None,
        }
    }

    pub fn with_minimum_payment(mut self, minimum_payment: f64) -> Self {
        self.minimum_payment = minimum_payment;
        self
    }

    pub fn with_credit_limit(mut self, credit_limit: f64) -> Self {
        self.credit_limit = Some(credit_limit);
        self
    }

    /// Copy with every non-finite or negative number clamped to 0.
    /// A clamped credit limit stays `Some(0.0)`, which rules treat as unknown.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.clone(),
            account_type: self.account_type.clone(),
            balance: clamp_amount(self.balance),
            apr: clamp_amount(self.apr),
            minimum_payment: clamp_amount(self.minimum_payment),
            credit_limit: self.credit_limit.map(clamp_amount),
        }
    }

    pub fn has_balance(&self) -> bool {
        self.balance > 0.0
    }

    /// Case-insensitive substring match on the account type
    pub fn type_contains(&self, needle: &str) -> bool {
        self.account_type.to_lowercase().contains(needle)
    }

    /// Known, positive credit limit
    pub fn known_limit(&self) -> Option<f64> {
        self.credit_limit.filter(|l| *l > 0.0)
    }

    /// balance / limit, when the limit is known
    pub fn utilization(&self) -> Option<f64> {
        self.known_limit().map(|l| self.balance / l)
    }
}

/// Insight priority. Output lists sort high first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

impl InsightPriority {
    /// high = 3, medium = 2, low = 1
    pub fn rank(&self) -> u8 {
        match self {
            InsightPriority::High => 3,
            InsightPriority::Medium => 2,
            InsightPriority::Low => 1,
        }
    }
}

/// One actionable finding about a debt portfolio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtInsight {
    /// Stable rule id ("no_debt", "balance_transfer", ...)
    pub id: String,
    /// Grouping tag for the UI ("optimization", "strategy", ...)
    pub category: String,
    pub title: String,
    pub description: String,
    pub priority: InsightPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,
    pub action_items: Vec<String>,
    pub icon: String,
}

/// Portfolio totals shown next to the insight list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    pub total_balance: f64,
    pub total_minimum_payment: f64,
    /// Balance-weighted APR over balance-bearing accounts; 0 with no debt
    pub weighted_apr: f64,
    /// Revolving balance / revolving limit over credit accounts with a known limit
    pub credit_utilization: Option<f64>,
    pub accounts_with_balance: usize,
}
