//! Match ledger: reporting results and keeping per-player aggregates honest.

use crate::models::{AggregateDrift, MatchRecord, PlayerAggregate, PlayerId, TournamentError};
use crate::store::TournamentStore;
use std::collections::BTreeMap;

/// Record that `winner` beat `loser`.
///
/// Self-matches are rejected here; unknown ids are rejected by the store inside the
/// same atomic unit that appends the record and bumps both aggregates.
pub async fn report_match(
    store: &dyn TournamentStore,
    winner: PlayerId,
    loser: PlayerId,
) -> Result<MatchRecord, TournamentError> {
    if winner == loser {
        return Err(TournamentError::InvalidPair(winner));
    }
    let record = store.record_match(winner, loser).await?;
    log::info!(
        "Recorded match {}: player {} beat player {}",
        record.id,
        record.winner_id,
        record.loser_id
    );
    Ok(record)
}

/// Clear every match record and aggregate; players stay registered.
pub async fn delete_matches(store: &dyn TournamentStore) -> Result<(), TournamentError> {
    store.delete_matches().await?;
    log::info!("Deleted all match records");
    Ok(())
}

/// Recompute aggregates from scratch out of match history.
/// Only players that appear in at least one record get an entry.
pub fn tally_history(matches: &[MatchRecord]) -> BTreeMap<PlayerId, PlayerAggregate> {
    let mut totals: BTreeMap<PlayerId, PlayerAggregate> = BTreeMap::new();
    for m in matches {
        totals
            .entry(m.winner_id)
            .or_insert_with(|| PlayerAggregate::new(m.winner_id))
            .add_win();
        totals
            .entry(m.loser_id)
            .or_insert_with(|| PlayerAggregate::new(m.loser_id))
            .add_loss();
    }
    totals
}

/// Compare cached aggregates against match history.
///
/// A zeroed cached aggregate for a player with no matches is not drift.
pub fn find_drift(
    cached: &[PlayerAggregate],
    matches: &[MatchRecord],
) -> Vec<AggregateDrift> {
    let expected = tally_history(matches);
    let cached: BTreeMap<PlayerId, &PlayerAggregate> =
        cached.iter().map(|a| (a.player_id, a)).collect();

    let mut ids: Vec<PlayerId> = expected.keys().chain(cached.keys()).copied().collect();
    ids.sort_unstable();
    ids.dedup();

    ids.into_iter()
        .filter_map(|id| {
            let want = expected
                .get(&id)
                .cloned()
                .unwrap_or_else(|| PlayerAggregate::new(id));
            let have = cached.get(&id).copied();
            let matches_cache = match have {
                Some(a) => *a == want,
                None => want.matches_played == 0,
            };
            if matches_cache {
                None
            } else {
                Some(AggregateDrift {
                    player_id: id,
                    cached: have.cloned(),
                    expected: want,
                })
            }
        })
        .collect()
}

/// Audit the store's aggregates against its match records.
pub async fn audit_aggregates(
    store: &dyn TournamentStore,
) -> Result<Vec<AggregateDrift>, TournamentError> {
    let matches = store.list_matches().await?;
    let cached = store.aggregates().await?;
    let drift = find_drift(&cached, &matches);
    if drift.is_empty() {
        log::debug!("Aggregate audit clean ({} match record(s))", matches.len());
    } else {
        log::warn!("Aggregate audit found {} drifted player(s)", drift.len());
    }
    Ok(drift)
}

/// Rebuild every aggregate from match history. Returns how many were written.
pub async fn reconcile_aggregates(store: &dyn TournamentStore) -> Result<usize, TournamentError> {
    let written = store.rebuild_aggregates().await?;
    log::info!("Rebuilt {} player aggregate(s) from match history", written);
    Ok(written)
}
