//! Reward ranker: which card to use for a canonical category.
//!
//! Pure function of (category, index, spend). Ordering is total:
//! effective multiplier desc, annual fee asc, card id asc.

use cardwise_core::{CanonicalCategory, CardRecommendation, RankError};
use log::debug;
use serde::Serialize;
use std::collections::HashSet;

use crate::classifier::{Classification, classify_explained};
use crate::reward_index::{CardRewardIndex, IndexedRule};
use crate::spend::{DEFAULT_MONTHLY_SPEND, SpendEstimates};

/// Rank every card in `index` for `category`.
///
/// A card earns its own rule for `category` when that rule is > 0, otherwise
/// its catch-all rule when > 0, otherwise it is left out. `spend_estimate` is
/// the monthly dollars assumed for the category (200 when `None`).
pub fn rank(
    category: CanonicalCategory,
    index: &CardRewardIndex,
    spend_estimate: Option<f64>,
) -> Vec<CardRecommendation> {
    let spend = spend_estimate
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(DEFAULT_MONTHLY_SPEND);

    let mut seen: HashSet<&str> = HashSet::new();
    let mut picked: Vec<(&IndexedRule, CanonicalCategory)> = Vec::new();

    for rule in index.lookup(category).iter().filter(|r| r.multiplier > 0.0) {
        seen.insert(rule.card_id.as_str());
        picked.push((rule, category));
    }

    if !category.is_catch_all() {
        let fallback = CanonicalCategory::CatchAllGeneralPurchases;
        for rule in index.lookup(fallback).iter().filter(|r| r.multiplier > 0.0) {
            if seen.insert(rule.card_id.as_str()) {
                picked.push((rule, fallback));
            }
        }
    }

    let mut recs: Vec<CardRecommendation> = picked
        .into_iter()
        .filter_map(|(rule, matched)| {
            let card = index.card(&rule.card_id)?;
            let description = card
                .rule_for(matched)
                .map(|r| r.description.clone())
                .unwrap_or_default();
            Some(CardRecommendation {
                card_id: card.id.clone(),
                display_name: card.display_name.clone(),
                multiplier: rule.multiplier,
                reward_type: rule.reward_type,
                annual_fee: card.annual_fee,
                estimated_monthly_value: spend * rule.multiplier / 100.0
                    * rule.reward_type.conversion_factor(),
                is_top_choice: false,
                matched_category: matched,
                description,
            })
        })
        .collect();

    recs.sort_by(|a, b| {
        b.multiplier
            .total_cmp(&a.multiplier)
            .then_with(|| a.annual_fee.total_cmp(&b.annual_fee))
            .then_with(|| a.card_id.cmp(&b.card_id))
    });

    if let Some(first) = recs.first_mut() {
        first.is_top_choice = true;
    }

    debug!(
        "ranked {} cards for {} (top: {})",
        recs.len(),
        category,
        recs.first().map(|r| r.card_id.as_str()).unwrap_or("none")
    );

    recs
}

/// [`rank`] for a category arriving as a string (API boundary).
///
/// Fails with [`RankError::InvalidCategory`] when the name is not in the
/// closed category set.
pub fn rank_named(
    category: &str,
    index: &CardRewardIndex,
    spend_estimate: Option<f64>,
) -> Result<Vec<CardRecommendation>, RankError> {
    let category: CanonicalCategory = category.parse()?;
    Ok(rank(category, index, spend_estimate))
}

/// Classification plus ranked cards for one business
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecommendation {
    pub classification: Classification,
    pub monthly_spend: f64,
    pub cards: Vec<CardRecommendation>,
}

/// classify -> spend lookup -> rank, for "which card should I use here?"
pub fn recommend<S: AsRef<str>>(
    name: &str,
    tags: &[S],
    index: &CardRewardIndex,
    estimates: &SpendEstimates,
) -> BusinessRecommendation {
    let classification = classify_explained(name, tags);
    let monthly_spend = estimates.get(classification.category);
    let cards = rank(classification.category, index, Some(monthly_spend));
    BusinessRecommendation {
        classification,
        monthly_spend,
        cards,
    }
}
