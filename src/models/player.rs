//! Player and PlayerAggregate data structures.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player, assigned by the store on registration.
pub type PlayerId = i64;

/// A registered player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Display name, already sanitized.
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Per-player totals derived from the match ledger.
///
/// Invariant: `matches_played == wins + losses`, and equals the number of
/// match records naming this player as winner or loser.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerAggregate {
    pub player_id: PlayerId,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
}

impl PlayerAggregate {
    /// Empty aggregate for a player with no matches yet.
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            ..Self::default()
        }
    }

    /// Record a win for this player.
    pub fn add_win(&mut self) {
        self.wins += 1;
        self.matches_played += 1;
    }

    /// Record a loss for this player.
    pub fn add_loss(&mut self) {
        self.losses += 1;
        self.matches_played += 1;
    }

    pub fn is_consistent(&self) -> bool {
        self.matches_played == self.wins + self.losses
    }
}

/// A cached aggregate that disagrees with the totals recomputed from match history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AggregateDrift {
    pub player_id: PlayerId,
    /// What the store currently holds (None if no aggregate row exists).
    pub cached: Option<PlayerAggregate>,
    /// What the match records say.
    pub expected: PlayerAggregate,
}
