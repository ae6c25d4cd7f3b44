//! Error types shared across the engine

use thiserror::Error;

/// Ranking contract violations.
///
/// "No card matches" is not an error: it is an empty recommendation list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("invalid category: {0:?} is not a canonical reward category")]
    InvalidCategory(String),
}
