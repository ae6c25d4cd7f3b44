//! Card catalog snapshots: the external input a reward index is built from.
//!
//! On disk (and in the built-in snapshot) a catalog is a flat JSON object:
//!
//! ```json
//! { "amex_gold": { "displayName": "...", "annualFee": 325, "rewardType": "points",
//!                  "rules": [{ "category": "dining", "multiplier": 4, "description": "..." }] } }
//! ```
//!
//! A rule without `rewardType` inherits the card's.

use cardwise_core::{CanonicalCategory, CardProgram, RewardRule, RewardType};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::path::Path;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../data/cards.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("reading catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("card id must not be empty")]
    EmptyId,

    #[error("duplicate card id {0:?}")]
    DuplicateCard(String),

    #[error("card {card:?}: annual fee {fee} must be a finite number >= 0")]
    InvalidAnnualFee { card: String, fee: f64 },

    #[error("card {card:?}: multiplier {multiplier} for {category} must be a finite number >= 0")]
    InvalidMultiplier {
        card: String,
        category: CanonicalCategory,
        multiplier: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRule {
    pub category: CanonicalCategory,
    pub multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_type: Option<RewardType>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCard {
    /// Falls back to the card id
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub annual_fee: f64,
    #[serde(default)]
    pub reward_type: RewardType,
    #[serde(default)]
    pub rules: Vec<CatalogRule>,
}

/// card id -> card, ordered by id. A repeated id in the JSON is an error.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct CardCatalog {
    cards: BTreeMap<String, CatalogCard>,
}

impl<'de> Deserialize<'de> for CardCatalog {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_map(CatalogVisitor)
    }
}

struct CatalogVisitor;

impl<'de> Visitor<'de> for CatalogVisitor {
    type Value = CardCatalog;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of card id -> card")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<CardCatalog, A::Error> {
        let mut cards = BTreeMap::new();
        while let Some((id, card)) = map.next_entry::<String, CatalogCard>()? {
            match cards.entry(id) {
                Entry::Occupied(e) => {
                    return Err(de::Error::custom(format!("duplicate card id {:?}", e.key())));
                }
                Entry::Vacant(e) => {
                    e.insert(card);
                }
            }
        }
        Ok(CardCatalog { cards })
    }
}

impl CardCatalog {
    pub fn from_json(s: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&s)
    }

    /// Snapshot compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn insert(&mut self, id: impl Into<String>, card: CatalogCard) {
        self.cards.insert(id.into(), card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Flatten into card programs, resolving inherited reward types.
    /// Validation happens when the programs are indexed.
    pub fn into_programs(self) -> Vec<CardProgram> {
        self.cards
            .into_iter()
            .map(|(id, card)| {
                let card_type = card.reward_type;
                CardProgram {
                    display_name: card.display_name.unwrap_or_else(|| id.clone()),
                    id,
                    annual_fee: card.annual_fee,
                    rules: card
                        .rules
                        .into_iter()
                        .map(|r| RewardRule {
                            category: r.category,
                            multiplier: r.multiplier,
                            reward_type: r.reward_type.unwrap_or(card_type),
                            description: r.description,
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

/// Check one program and collapse duplicate category rules, keeping the
/// highest multiplier (first listed wins an exact tie).
pub(crate) fn validate_program(mut card: CardProgram) -> Result<CardProgram, CatalogError> {
    if card.id.trim().is_empty() {
        return Err(CatalogError::EmptyId);
    }
    if !card.annual_fee.is_finite() || card.annual_fee < 0.0 {
        return Err(CatalogError::InvalidAnnualFee {
            card: card.id,
            fee: card.annual_fee,
        });
    }

    let rules = std::mem::take(&mut card.rules);
    let mut kept: Vec<RewardRule> = Vec::with_capacity(rules.len());
    for rule in rules {
        if !rule.multiplier.is_finite() || rule.multiplier < 0.0 {
            return Err(CatalogError::InvalidMultiplier {
                card: card.id,
                category: rule.category,
                multiplier: rule.multiplier,
            });
        }
        match kept.iter_mut().find(|k| k.category == rule.category) {
            Some(existing) if rule.multiplier > existing.multiplier => *existing = rule,
            Some(_) => {}
            None => kept.push(rule),
        }
    }
    card.rules = kept;
    Ok(card)
}
