//! `Tournament`: the caller-facing facade over an injected store.

use crate::logic;
use crate::models::{AggregateDrift, MatchRecord, Pairing, Player, PlayerId, StandingsEntry, TournamentError};
use crate::store::{MemoryStore, SharedStore};
use std::sync::Arc;

/// One Swiss tournament. Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Tournament {
    store: SharedStore,
}

impl Tournament {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Tournament over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Register a player and return the id the store assigned.
    pub async fn register_player(&self, name: &str) -> Result<PlayerId, TournamentError> {
        logic::register_player(self.store.as_ref(), name).await
    }

    /// Register every row of a roster CSV (must have a `name` column).
    pub async fn import_players_csv(&self, data: &[u8]) -> Result<Vec<PlayerId>, TournamentError> {
        logic::import_players_csv(self.store.as_ref(), data).await
    }

    pub async fn count_players(&self) -> Result<usize, TournamentError> {
        self.store.count_players().await
    }

    /// Registered players ordered by id.
    pub async fn players(&self) -> Result<Vec<Player>, TournamentError> {
        self.store.list_players().await
    }

    /// Remove all players together with all match data.
    pub async fn delete_players(&self) -> Result<(), TournamentError> {
        logic::delete_players(self.store.as_ref()).await
    }

    /// Remove all match data but keep the player pool.
    pub async fn delete_matches(&self) -> Result<(), TournamentError> {
        logic::delete_matches(self.store.as_ref()).await
    }

    pub async fn report_match(
        &self,
        winner: PlayerId,
        loser: PlayerId,
    ) -> Result<MatchRecord, TournamentError> {
        logic::report_match(self.store.as_ref(), winner, loser).await
    }

    /// Match history ordered by id.
    pub async fn matches(&self) -> Result<Vec<MatchRecord>, TournamentError> {
        self.store.list_matches().await
    }

    pub async fn player_standings(&self) -> Result<Vec<StandingsEntry>, TournamentError> {
        logic::player_standings(self.store.as_ref()).await
    }

    /// Current standings rendered as CSV.
    pub async fn standings_csv(&self) -> Result<String, TournamentError> {
        let standings = self.player_standings().await?;
        let mut buf = Vec::new();
        logic::write_standings_csv(&standings, &mut buf)?;
        String::from_utf8(buf).map_err(|e| TournamentError::InvalidCsv(e.to_string()))
    }

    pub async fn swiss_pairings(&self) -> Result<Vec<Pairing>, TournamentError> {
        logic::swiss_pairings(self.store.as_ref()).await
    }

    /// Players whose cached aggregate disagrees with match history.
    pub async fn audit_aggregates(&self) -> Result<Vec<AggregateDrift>, TournamentError> {
        logic::audit_aggregates(self.store.as_ref()).await
    }

    /// Rebuild aggregates from match history.
    pub async fn reconcile_aggregates(&self) -> Result<usize, TournamentError> {
        logic::reconcile_aggregates(self.store.as_ref()).await
    }
}
