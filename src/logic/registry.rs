//! Player registry: registration, roster import, counting and reset.

use crate::logic::sanitize_name;
use crate::models::{PlayerId, TournamentError};
use crate::store::TournamentStore;
use serde::Deserialize;

#[derive(Deserialize)]
struct RosterRow {
    name: String,
}

/// Register one player. The name is sanitized first and must not end up empty.
/// Names need not be unique.
pub async fn register_player(
    store: &dyn TournamentStore,
    name: &str,
) -> Result<PlayerId, TournamentError> {
    let clean = sanitize_name(name);
    if clean.is_empty() {
        return Err(TournamentError::InvalidName);
    }
    let player = store.insert_player(&clean).await?;
    log::info!("Registered player {} ({})", player.id, player.name);
    Ok(player.id)
}

/// Parse a roster CSV (a header row with a `name` column; other columns are ignored)
/// into sanitized names. Fails on the first unreadable or blank row.
pub fn parse_roster(data: &[u8]) -> Result<Vec<String>, TournamentError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data);
    let mut names = Vec::new();
    for row in reader.deserialize::<RosterRow>() {
        let clean = sanitize_name(&row?.name);
        if clean.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        names.push(clean);
    }
    Ok(names)
}

/// Register every player in a roster CSV. Nothing is inserted unless every row is valid.
pub async fn import_players_csv(
    store: &dyn TournamentStore,
    data: &[u8],
) -> Result<Vec<PlayerId>, TournamentError> {
    let names = parse_roster(data)?;
    let players = store.insert_players(&names).await?;
    log::info!("Imported {} player(s) from roster", players.len());
    Ok(players.into_iter().map(|p| p.id).collect())
}

/// Remove every player, their match records and aggregates.
pub async fn delete_players(store: &dyn TournamentStore) -> Result<(), TournamentError> {
    store.delete_players().await?;
    log::info!("Deleted all players and match data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_reads_name_column_and_ignores_others() {
        let csv = b"seed,name\n1,Ann Lee\n2,  <b>Bo</b>  \n";
        assert_eq!(
            parse_roster(csv).unwrap(),
            vec!["Ann Lee".to_string(), "&lt;b&gt;Bo&lt;/b&gt;".to_string()]
        );
    }

    #[test]
    fn roster_without_name_column_is_rejected() {
        assert!(matches!(
            parse_roster(b"player\nAnn\n"),
            Err(TournamentError::InvalidCsv(_))
        ));
    }

    #[test]
    fn roster_with_blank_name_is_rejected() {
        assert_eq!(
            parse_roster(b"name\nAnn\n\"  \"\n"),
            Err(TournamentError::InvalidName)
        );
    }
}
