//! Swiss pairing: adjacent players in the standings meet in the next round.

use crate::logic::player_standings;
use crate::models::{Pairing, StandingsEntry, TournamentError};
use crate::store::TournamentStore;

/// Pair ranked entries `(0, 1), (2, 3), …`.
///
/// Requires an even count since there are no byes. Each player appears in exactly
/// one pairing.
pub fn pair_adjacent(ranked: &[StandingsEntry]) -> Result<Vec<Pairing>, TournamentError> {
    if ranked.len() % 2 != 0 {
        return Err(TournamentError::OddPlayerCount {
            count: ranked.len(),
        });
    }
    Ok(ranked
        .chunks_exact(2)
        .map(|pair| Pairing::from_entries(&pair[0], &pair[1]))
        .collect())
}

/// Pairings for the next round, derived from the current standings. Read-only.
pub async fn swiss_pairings(store: &dyn TournamentStore) -> Result<Vec<Pairing>, TournamentError> {
    let standings = player_standings(store).await?;
    let pairings = pair_adjacent(&standings)?;
    log::debug!("Generated {} pairing(s)", pairings.len());
    Ok(pairings)
}
