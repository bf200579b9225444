//! In-process store: players, match records and aggregates behind one `RwLock`.
//!
//! Each operation takes the lock once and finishes its work under it, so a
//! report or reset is never observed half-applied.

use crate::logic::tally_history;
use crate::models::{MatchRecord, Player, PlayerAggregate, PlayerId, StandingsEntry, TournamentError};
use crate::store::TournamentStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct MemoryState {
    players: BTreeMap<PlayerId, Player>,
    matches: Vec<MatchRecord>,
    aggregates: BTreeMap<PlayerId, PlayerAggregate>,
    next_player_id: PlayerId,
    next_match_id: i64,
}

impl MemoryState {
    fn push_player(&mut self, name: &str) -> Player {
        self.next_player_id += 1;
        let player = Player::new(self.next_player_id, name);
        self.players.insert(player.id, player.clone());
        player
    }
}

/// Store that keeps everything in memory. Ids start at 1 and are never reused,
/// even after a reset.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, TournamentError> {
        self.state
            .read()
            .map_err(|_| TournamentError::StorageFailure("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, TournamentError> {
        self.state
            .write()
            .map_err(|_| TournamentError::StorageFailure("lock error".to_string()))
    }
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn insert_player(&self, name: &str) -> Result<Player, TournamentError> {
        let mut g = self.write()?;
        Ok(g.push_player(name))
    }

    async fn insert_players(&self, names: &[String]) -> Result<Vec<Player>, TournamentError> {
        let mut g = self.write()?;
        Ok(names.iter().map(|name| g.push_player(name)).collect())
    }

    async fn count_players(&self) -> Result<usize, TournamentError> {
        Ok(self.read()?.players.len())
    }

    async fn list_players(&self) -> Result<Vec<Player>, TournamentError> {
        Ok(self.read()?.players.values().cloned().collect())
    }

    async fn delete_players(&self) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        g.matches.clear();
        g.aggregates.clear();
        g.players.clear();
        Ok(())
    }

    async fn delete_matches(&self) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        g.matches.clear();
        g.aggregates.clear();
        Ok(())
    }

    async fn record_match(
        &self,
        winner: PlayerId,
        loser: PlayerId,
    ) -> Result<MatchRecord, TournamentError> {
        let mut g = self.write()?;
        for id in [winner, loser] {
            if !g.players.contains_key(&id) {
                return Err(TournamentError::UnknownPlayer(id));
            }
        }

        g.next_match_id += 1;
        let record = MatchRecord {
            id: g.next_match_id,
            winner_id: winner,
            loser_id: loser,
            recorded_at: Utc::now(),
        };
        g.matches.push(record.clone());
        g.aggregates
            .entry(winner)
            .or_insert_with(|| PlayerAggregate::new(winner))
            .add_win();
        g.aggregates
            .entry(loser)
            .or_insert_with(|| PlayerAggregate::new(loser))
            .add_loss();
        Ok(record)
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, TournamentError> {
        Ok(self.read()?.matches.clone())
    }

    async fn standings_rows(&self) -> Result<Vec<StandingsEntry>, TournamentError> {
        let g = self.read()?;
        Ok(g.players
            .values()
            .map(|p| {
                let (wins, matches_played) = g
                    .aggregates
                    .get(&p.id)
                    .map(|a| (a.wins, a.matches_played))
                    .unwrap_or((0, 0));
                StandingsEntry {
                    player_id: p.id,
                    name: p.name.clone(),
                    wins,
                    matches_played,
                }
            })
            .collect())
    }

    async fn aggregates(&self) -> Result<Vec<PlayerAggregate>, TournamentError> {
        Ok(self.read()?.aggregates.values().cloned().collect())
    }

    async fn rebuild_aggregates(&self) -> Result<usize, TournamentError> {
        let mut g = self.write()?;
        let rebuilt = tally_history(&g.matches);
        let written = rebuilt.len();
        g.aggregates = rebuilt;
        Ok(written)
    }
}
