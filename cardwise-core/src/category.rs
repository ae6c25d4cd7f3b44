//! Canonical reward categories and reward currencies.
//!
//! The category set is closed. Its declaration order is the priority order
//! used to break ties anywhere more than one category could apply:
//! `Dining` is the highest priority, `CatchAllGeneralPurchases` the lowest.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RankError;

/// Closed set of reward categories matched deterministically
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalCategory {
    Dining,
    Grocery,
    GasStations,
    TravelGeneral,
    TravelFlights,
    TravelHotels,
    EntertainmentAndRecreation,
    StreamingServices,
    DrugstoresAndPharmacies,
    FitnessAndWellness,
    TransitAndRideshare,
    CatchAllGeneralPurchases,
}

/// Presentation metadata for a category (label + chart color)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDisplay {
    pub label: &'static str,
    pub color: &'static str,
}

impl CanonicalCategory {
    /// Every category, in priority order (highest first).
    pub const ALL: [CanonicalCategory; 12] = [
        CanonicalCategory::Dining,
        CanonicalCategory::Grocery,
        CanonicalCategory::GasStations,
        CanonicalCategory::TravelGeneral,
        CanonicalCategory::TravelFlights,
        CanonicalCategory::TravelHotels,
        CanonicalCategory::EntertainmentAndRecreation,
        CanonicalCategory::StreamingServices,
        CanonicalCategory::DrugstoresAndPharmacies,
        CanonicalCategory::FitnessAndWellness,
        CanonicalCategory::TransitAndRideshare,
        CanonicalCategory::CatchAllGeneralPurchases,
    ];

    /// Position in the priority order. Lower = wins ties.
    pub fn priority_rank(&self) -> usize {
        *self as usize
    }

    /// Wire name (snake_case), identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalCategory::Dining => "dining",
            CanonicalCategory::Grocery => "grocery",
            CanonicalCategory::GasStations => "gas_stations",
            CanonicalCategory::TravelGeneral => "travel_general",
            CanonicalCategory::TravelFlights => "travel_flights",
            CanonicalCategory::TravelHotels => "travel_hotels",
            CanonicalCategory::EntertainmentAndRecreation => "entertainment_and_recreation",
            CanonicalCategory::StreamingServices => "streaming_services",
            CanonicalCategory::DrugstoresAndPharmacies => "drugstores_and_pharmacies",
            CanonicalCategory::FitnessAndWellness => "fitness_and_wellness",
            CanonicalCategory::TransitAndRideshare => "transit_and_rideshare",
            CanonicalCategory::CatchAllGeneralPurchases => "catch_all_general_purchases",
        }
    }

    /// Label and chart color. Presentation only; ranking never reads this.
    pub fn display(&self) -> CategoryDisplay {
        let (label, color) = match self {
            CanonicalCategory::Dining => ("Dining", "#F97316"),
            CanonicalCategory::Grocery => ("Groceries", "#22C55E"),
            CanonicalCategory::GasStations => ("Gas Stations", "#EAB308"),
            CanonicalCategory::TravelGeneral => ("Travel", "#3B82F6"),
            CanonicalCategory::TravelFlights => ("Flights", "#0EA5E9"),
            CanonicalCategory::TravelHotels => ("Hotels", "#6366F1"),
            CanonicalCategory::EntertainmentAndRecreation => ("Entertainment", "#EC4899"),
            CanonicalCategory::StreamingServices => ("Streaming", "#A855F7"),
            CanonicalCategory::DrugstoresAndPharmacies => ("Drugstores", "#14B8A6"),
            CanonicalCategory::FitnessAndWellness => ("Fitness & Wellness", "#84CC16"),
            CanonicalCategory::TransitAndRideshare => ("Transit & Rideshare", "#64748B"),
            CanonicalCategory::CatchAllGeneralPurchases => ("Everything Else", "#9CA3AF"),
        };
        CategoryDisplay { label, color }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, CanonicalCategory::CatchAllGeneralPurchases)
    }
}

impl fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CanonicalCategory {
    type Err = RankError;

    /// Accepts the wire name, case-insensitively, with `-` or spaces in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        CanonicalCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| RankError::InvalidCategory(s.to_string()))
    }
}

/// Reward currency a card earns in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    #[default]
    Points,
    CashBack,
    Miles,
}

impl RewardType {
    /// Dollar value of one "percent" of this currency, relative to cash.
    ///
    /// cash_back = 1.0, points = 1.2, miles = 1.5
    pub fn conversion_factor(&self) -> f64 {
        match self {
            RewardType::CashBack => 1.0,
            RewardType::Points => 1.2,
            RewardType::Miles => 1.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::Points => "points",
            RewardType::CashBack => "cash_back",
            RewardType::Miles => "miles",
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_matches_declaration() {
        for (i, c) in CanonicalCategory::ALL.iter().enumerate() {
            assert_eq!(c.priority_rank(), i);
        }
        assert!(CanonicalCategory::Dining < CanonicalCategory::CatchAllGeneralPurchases);
    }

    #[test]
    fn test_as_str_matches_serde() {
        for c in CanonicalCategory::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }

    #[test]
    fn test_from_str_accepts_loose_spelling() {
        assert_eq!("dining".parse::<CanonicalCategory>().unwrap(), CanonicalCategory::Dining);
        assert_eq!(
            "Gas-Stations".parse::<CanonicalCategory>().unwrap(),
            CanonicalCategory::GasStations
        );
        assert_eq!(
            " travel hotels ".parse::<CanonicalCategory>().unwrap(),
            CanonicalCategory::TravelHotels
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "restaurants".parse::<CanonicalCategory>().unwrap_err();
        assert_eq!(err, RankError::InvalidCategory("restaurants".to_string()));
    }

    #[test]
    fn test_conversion_factors() {
        assert_eq!(RewardType::CashBack.conversion_factor(), 1.0);
        assert_eq!(RewardType::Points.conversion_factor(), 1.2);
        assert_eq!(RewardType::Miles.conversion_factor(), 1.5);
    }

    #[test]
    fn test_every_category_has_a_label() {
        for c in CanonicalCategory::ALL {
            let d = c.display();
            assert!(!d.label.is_empty());
            assert!(d.color.starts_with('#') && d.color.len() == 7);
        }
    }
}
