//! cardwise-core: plain data types for the reward & debt recommendation engine

pub mod amount;
pub mod card;
pub mod category;
pub mod debt;
pub mod error;

pub use card::{CardProgram, CardRecommendation, RewardRule};
pub use category::{CanonicalCategory, CategoryDisplay, RewardType};
pub use debt::{DebtAccount, DebtInsight, DebtSummary, InsightPriority};
pub use error::RankError;
