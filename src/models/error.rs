//! Errors that can occur during tournament operations.

use crate::models::player::PlayerId;
use thiserror::Error;

/// Errors that can occur during tournament operations.
///
/// Validation variants are raised before any mutation is applied.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Referenced player id is not registered.
    #[error("Player {0} is not registered")]
    UnknownPlayer(PlayerId),
    /// A player cannot play against themselves.
    #[error("Player {0} cannot be paired against themselves")]
    InvalidPair(PlayerId),
    /// Pairings need an even number of registered players (no byes).
    #[error("Cannot pair an odd number of players ({count})")]
    OddPlayerCount { count: usize },
    /// Player name is empty after sanitization.
    #[error("Player name must not be empty")]
    InvalidName,
    /// Roster CSV could not be read.
    #[error("Invalid roster CSV: {0}")]
    InvalidCsv(String),
    /// Underlying store unreachable or a query failed.
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl From<sqlx::Error> for TournamentError {
    fn from(e: sqlx::Error) -> Self {
        TournamentError::StorageFailure(e.to_string())
    }
}

impl From<csv::Error> for TournamentError {
    fn from(e: csv::Error) -> Self {
        TournamentError::InvalidCsv(e.to_string())
    }
}
