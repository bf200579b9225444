//! Persistence seam: the store trait the tournament core consumes, plus two implementations.
//!
//! Every method is a single atomic unit: it either completes fully or leaves the
//! store untouched. The core never holds a connection between calls.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{MatchRecord, Player, PlayerAggregate, PlayerId, StandingsEntry, TournamentError};
use async_trait::async_trait;
use std::sync::Arc;

/// Shared handle to a store, injected into [`crate::Tournament`].
pub type SharedStore = Arc<dyn TournamentStore>;

#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Insert one player with an already-sanitized name; the store assigns the id.
    async fn insert_player(&self, name: &str) -> Result<Player, TournamentError>;

    /// Insert several players in one transaction, in order.
    async fn insert_players(&self, names: &[String]) -> Result<Vec<Player>, TournamentError>;

    async fn count_players(&self) -> Result<usize, TournamentError>;

    /// All players ordered by id.
    async fn list_players(&self) -> Result<Vec<Player>, TournamentError>;

    /// Delete every player together with all match records and aggregates.
    async fn delete_players(&self) -> Result<(), TournamentError>;

    /// Delete all match records and aggregates, keeping players.
    async fn delete_matches(&self) -> Result<(), TournamentError>;

    /// Append a match and increment both aggregates atomically.
    ///
    /// Fails with `UnknownPlayer` (and writes nothing) if either id is not registered.
    async fn record_match(
        &self,
        winner: PlayerId,
        loser: PlayerId,
    ) -> Result<MatchRecord, TournamentError>;

    /// All match records ordered by id.
    async fn list_matches(&self) -> Result<Vec<MatchRecord>, TournamentError>;

    /// One unranked row per registered player; players without matches report zeros.
    async fn standings_rows(&self) -> Result<Vec<StandingsEntry>, TournamentError>;

    /// Cached aggregates, ordered by player id. Players with no matches may be absent.
    async fn aggregates(&self) -> Result<Vec<PlayerAggregate>, TournamentError>;

    /// Replace all aggregates with totals recomputed from match records.
    /// Returns the number of aggregates written.
    async fn rebuild_aggregates(&self) -> Result<usize, TournamentError>;
}
