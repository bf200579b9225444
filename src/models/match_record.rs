//! MatchRecord: one completed match, append-only.

use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a recorded match.
pub type MatchId = i64;

/// A single completed match. Never mutated once written.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub recorded_at: DateTime<Utc>,
}
