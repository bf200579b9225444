//! Standings: rank every registered player by wins.

use crate::models::{StandingsEntry, TournamentError};
use crate::store::TournamentStore;
use std::io::Write;

/// Order rows by wins (descending), then player id (ascending).
///
/// The id tie-break keeps the order independent of how the store happened to
/// return rows, which in turn makes pairings repeatable.
pub fn rank_standings(mut rows: Vec<StandingsEntry>) -> Vec<StandingsEntry> {
    rows.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.player_id.cmp(&b.player_id)));
    rows
}

/// Current standings for all registered players, including those yet to play.
pub async fn player_standings(
    store: &dyn TournamentStore,
) -> Result<Vec<StandingsEntry>, TournamentError> {
    let rows = store.standings_rows().await?;
    log::debug!("Computed standings for {} player(s)", rows.len());
    Ok(rank_standings(rows))
}

/// Write standings as CSV with header `id,name,wins,matches`.
pub fn write_standings_csv<W: Write>(
    standings: &[StandingsEntry],
    writer: W,
) -> Result<(), TournamentError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["id", "name", "wins", "matches"])?;
    for entry in standings {
        out.write_record([
            entry.player_id.to_string(),
            entry.name.clone(),
            entry.wins.to_string(),
            entry.matches_played.to_string(),
        ])?;
    }
    out.flush()
        .map_err(|e| TournamentError::InvalidCsv(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(player_id: i64, wins: u32, matches_played: u32) -> StandingsEntry {
        StandingsEntry {
            player_id,
            name: format!("P{player_id}"),
            wins,
            matches_played,
        }
    }

    #[test]
    fn ranks_by_wins_then_id() {
        let ranked = rank_standings(vec![
            entry(4, 0, 1),
            entry(3, 1, 1),
            entry(2, 0, 1),
            entry(1, 1, 1),
        ]);
        let ids: Vec<_> = ranked.iter().map(|e| e.player_id).collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);
    }

    #[test]
    fn csv_has_header_and_one_row_per_player() {
        let mut buf = Vec::new();
        write_standings_csv(&[entry(1, 2, 2), entry(2, 0, 2)], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "id,name,wins,matches\n1,P1,2,2\n2,P2,0,2\n"
        );
    }
}
