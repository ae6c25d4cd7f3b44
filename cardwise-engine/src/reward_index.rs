//! Inverted reward index: canonical category -> cards earning in it.
//!
//! Built once from a catalog snapshot and never mutated. A refreshed catalog
//! means a new index, published through [`CatalogHandle::replace`].

use cardwise_core::{CanonicalCategory, CardProgram, RewardType};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::catalog::{CardCatalog, CatalogError, validate_program};

/// One card's earn rate inside a category bucket
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRule {
    pub card_id: String,
    pub multiplier: f64,
    pub reward_type: RewardType,
}

#[derive(Debug, Clone, Default)]
pub struct CardRewardIndex {
    cards: BTreeMap<String, CardProgram>,
    /// Each bucket: multiplier desc, then annual fee asc, then card id asc
    by_category: HashMap<CanonicalCategory, Vec<IndexedRule>>,
}

impl CardRewardIndex {
    /// Validate every program and build the inverted index.
    pub fn build(programs: impl IntoIterator<Item = CardProgram>) -> Result<Self, CatalogError> {
        let mut cards: BTreeMap<String, CardProgram> = BTreeMap::new();
        for program in programs {
            let program = validate_program(program)?;
            if cards.contains_key(&program.id) {
                return Err(CatalogError::DuplicateCard(program.id));
            }
            if program.best_multiplier() <= 0.0 {
                warn!("card {} earns nothing in any category", program.id);
            }
            cards.insert(program.id.clone(), program);
        }

        let mut by_category: HashMap<CanonicalCategory, Vec<IndexedRule>> = HashMap::new();
        for card in cards.values() {
            for rule in &card.rules {
                by_category.entry(rule.category).or_default().push(IndexedRule {
                    card_id: card.id.clone(),
                    multiplier: rule.multiplier,
                    reward_type: rule.reward_type,
                });
            }
        }

        for bucket in by_category.values_mut() {
            bucket.sort_by(|a, b| {
                b.multiplier
                    .total_cmp(&a.multiplier)
                    .then_with(|| annual_fee(&cards, &a.card_id).total_cmp(&annual_fee(&cards, &b.card_id)))
                    .then_with(|| a.card_id.cmp(&b.card_id))
            });
        }

        debug!(
            "built reward index: {} cards, {} category buckets",
            cards.len(),
            by_category.len()
        );

        Ok(Self { cards, by_category })
    }

    pub fn from_catalog(catalog: CardCatalog) -> Result<Self, CatalogError> {
        Self::build(catalog.into_programs())
    }

    /// Index over the snapshot compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_catalog(CardCatalog::builtin()?)
    }

    /// Every rule for `category`, best multiplier first. Empty if no card lists it.
    pub fn lookup(&self, category: CanonicalCategory) -> &[IndexedRule] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn card(&self, id: &str) -> Option<&CardProgram> {
        self.cards.get(id)
    }

    /// Cards in id order
    pub fn cards(&self) -> impl Iterator<Item = &CardProgram> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn annual_fee(cards: &BTreeMap<String, CardProgram>, id: &str) -> f64 {
    cards.get(id).map(|c| c.annual_fee).unwrap_or(0.0)
}

/// Shared, swappable reference to the current index.
///
/// Readers take an `Arc` snapshot and keep using it for the whole call, so a
/// concurrent [`replace`](CatalogHandle::replace) can never show them a half
/// built index. The lock only guards the pointer.
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<CardRewardIndex>>,
}

impl CatalogHandle {
    pub fn new(index: CardRewardIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    pub fn current(&self) -> Arc<CardRewardIndex> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Publish a fully built index; returns the one it replaced.
    pub fn replace(&self, index: CardRewardIndex) -> Arc<CardRewardIndex> {
        let next = Arc::new(index);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!("swapping reward index: {} -> {} cards", guard.len(), next.len());
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardwise_core::RewardRule;
    use std::thread;

    fn card(id: &str, fee: f64, rules: &[(CanonicalCategory, f64)]) -> CardProgram {
        CardProgram {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            annual_fee: fee,
            rules: rules
                .iter()
                .map(|(c, m)| RewardRule::new(*c, *m, RewardType::Points, format!("{m}x on {c}")))
                .collect(),
        }
    }

    #[test]
    fn test_lookup_sorted_by_multiplier_then_fee_then_id() {
        let index = CardRewardIndex::build(vec![
            card("zeta", 0.0, &[(CanonicalCategory::Dining, 3.0)]),
            card("alpha", 95.0, &[(CanonicalCategory::Dining, 3.0)]),
            card("beta", 0.0, &[(CanonicalCategory::Dining, 3.0)]),
            card("gold", 250.0, &[(CanonicalCategory::Dining, 4.0)]),
        ])
        .unwrap();

        let ids: Vec<&str> = index
            .lookup(CanonicalCategory::Dining)
            .iter()
            .map(|r| r.card_id.as_str())
            .collect();
        assert_eq!(ids, vec!["gold", "beta", "zeta", "alpha"]);
    }

    #[test]
    fn test_lookup_missing_category_is_empty() {
        let index = CardRewardIndex::build(vec![card("a", 0.0, &[(CanonicalCategory::Dining, 2.0)])]).unwrap();
        assert!(index.lookup(CanonicalCategory::TravelHotels).is_empty());
        assert_eq!(index.len(), 1);
        assert!(index.card("a").is_some());
        assert!(index.card("b").is_none());
    }

    #[test]
    fn test_duplicate_card_ids_rejected() {
        let err = CardRewardIndex::build(vec![card("a", 0.0, &[]), card("a", 10.0, &[])]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCard(id) if id == "a"));
    }

    #[test]
    fn test_builtin_index_builds() {
        let index = CardRewardIndex::builtin().unwrap();
        assert!(!index.is_empty());
        assert!(!index.lookup(CanonicalCategory::CatchAllGeneralPurchases).is_empty());
    }

    #[test]
    fn test_handle_swap_is_atomic_for_readers() {
        let handle = Arc::new(CatalogHandle::new(
            CardRewardIndex::build(vec![card("old", 0.0, &[(CanonicalCategory::Dining, 1.0)])]).unwrap(),
        ));

        let snapshot = handle.current();

        let writer = {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                let fresh = CardRewardIndex::build(vec![
                    card("new1", 0.0, &[(CanonicalCategory::Dining, 2.0)]),
                    card("new2", 0.0, &[(CanonicalCategory::Dining, 3.0)]),
                ])
                .unwrap();
                handle.replace(fresh)
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let idx = handle.current();
                        // either the whole old index or the whole new one
                        assert!(idx.len() == 1 || idx.len() == 2);
                        assert_eq!(idx.lookup(CanonicalCategory::Dining).len(), idx.len());
                    }
                })
            })
            .collect();

        let previous = writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }

        assert_eq!(previous.len(), 1);
        // an Arc taken before the swap still sees the old catalog
        assert_eq!(snapshot.card("old").map(|c| c.annual_fee), Some(0.0));
        assert_eq!(handle.current().len(), 2);
    }
}
