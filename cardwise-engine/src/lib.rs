//! cardwise-engine: category classifier, card reward index + ranker, and the
//! debt insight rule engine

pub mod catalog;
pub mod classifier;
pub mod debt_insights;
pub mod ranker;
pub mod reward_index;
pub mod spend;

pub use catalog::{CardCatalog, CatalogError};
pub use classifier::{classify, classify_explained, Classification, MatchStep};
pub use debt_insights::DebtInsightEngine;
pub use ranker::{rank, rank_named, recommend, BusinessRecommendation};
pub use reward_index::{CardRewardIndex, CatalogHandle, IndexedRule};
pub use spend::{SpendEstimates, DEFAULT_MONTHLY_SPEND};
