//! Data structures for the Swiss tournament: players, match records, standings, pairings.

mod error;
mod match_record;
mod player;
mod standings;

pub use error::TournamentError;
pub use match_record::{MatchId, MatchRecord};
pub use player::{AggregateDrift, Player, PlayerAggregate, PlayerId};
pub use standings::{Pairing, StandingsEntry};
