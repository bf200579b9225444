//! Swiss-system tournament: library with models, storage and pairing logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;
mod tournament;

pub use config::ServerConfig;
pub use models::{
    AggregateDrift, MatchId, MatchRecord, Pairing, Player, PlayerAggregate, PlayerId,
    StandingsEntry, TournamentError,
};
pub use store::{MemoryStore, PgStore, SharedStore, TournamentStore};
pub use tournament::Tournament;
