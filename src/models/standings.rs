//! Ephemeral, computed-on-demand views: standings rows and round pairings.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// One row of the standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub matches_played: u32,
}

impl StandingsEntry {
    pub fn losses(&self) -> u32 {
        self.matches_played.saturating_sub(self.wins)
    }
}

/// Two players facing each other in the next round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub player1_id: PlayerId,
    pub player1_name: String,
    pub player2_id: PlayerId,
    pub player2_name: String,
}

impl Pairing {
    pub fn from_entries(first: &StandingsEntry, second: &StandingsEntry) -> Self {
        Self {
            player1_id: first.player_id,
            player1_name: first.name.clone(),
            player2_id: second.player_id,
            player2_name: second.name.clone(),
        }
    }
}
