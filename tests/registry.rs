//! Integration tests for the player registry: registration, counting, roster import and reset.

use swiss_tournament::{Tournament, TournamentError};

#[tokio::test]
async fn count_tracks_registrations_since_last_reset() {
    let t = Tournament::in_memory();
    assert_eq!(t.count_players().await.unwrap(), 0);

    t.register_player("Chandra Nalaar").await.unwrap();
    assert_eq!(t.count_players().await.unwrap(), 1);
    t.register_player("Jace Beleren").await.unwrap();
    assert_eq!(t.count_players().await.unwrap(), 2);

    t.delete_players().await.unwrap();
    assert_eq!(t.count_players().await.unwrap(), 0);

    t.register_player("Markov Chaney").await.unwrap();
    assert_eq!(t.count_players().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_players_empties_standings_and_matches() {
    let t = Tournament::in_memory();
    let a = t.register_player("A").await.unwrap();
    let b = t.register_player("B").await.unwrap();
    t.report_match(a, b).await.unwrap();

    t.delete_players().await.unwrap();

    assert_eq!(t.count_players().await.unwrap(), 0);
    assert!(t.player_standings().await.unwrap().is_empty());
    assert!(t.matches().await.unwrap().is_empty());
    assert!(t.audit_aggregates().await.unwrap().is_empty());
}

#[tokio::test]
async fn names_are_sanitized_and_need_not_be_unique() {
    let t = Tournament::in_memory();
    let first = t.register_player("<i>Bruno</i>  Walton").await.unwrap();
    let second = t.register_player("<i>Bruno</i>  Walton").await.unwrap();
    assert_ne!(first, second);

    let players = t.players().await.unwrap();
    assert_eq!(players.len(), 2);
    assert!(players
        .iter()
        .all(|p| p.name == "&lt;i&gt;Bruno&lt;/i&gt; Walton"));
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let t = Tournament::in_memory();
    assert_eq!(
        t.register_player(" \t\n").await,
        Err(TournamentError::InvalidName)
    );
    assert_eq!(t.count_players().await.unwrap(), 0);
}

#[tokio::test]
async fn roster_import_is_all_or_nothing() {
    let t = Tournament::in_memory();
    let ids = t
        .import_players_csv(b"name,club\nAnn,North\nBo,South\nCy,East\nDee,West\n")
        .await
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(t.count_players().await.unwrap(), 4);

    let bad = t.import_players_csv(b"name\nEve\n\"\"\n").await;
    assert_eq!(bad, Err(TournamentError::InvalidName));
    assert_eq!(t.count_players().await.unwrap(), 4);
}
