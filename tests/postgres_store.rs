//! Integration tests against `PgStore`. Skipped unless `DATABASE_URL` points at a
//! PostgreSQL database the tests may wipe.

use std::collections::HashSet;
use std::sync::Arc;
use swiss_tournament::{PgStore, PlayerId, Tournament, TournamentError};
use tokio::sync::{Mutex, MutexGuard};

/// Tests in this file share one database, so they run one at a time.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

async fn pg_tournament() -> Option<(Tournament, MutexGuard<'static, ()>)> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping PostgreSQL test");
            return None;
        }
    };
    let guard = DB_LOCK.lock().await;
    let store = PgStore::connect(&url, 8).await.unwrap();
    store.migrate().await.unwrap();
    let t = Tournament::new(Arc::new(store));
    t.delete_players().await.unwrap();
    Some((t, guard))
}

async fn register(t: &Tournament, n: usize) -> Vec<PlayerId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        ids.push(t.register_player(&format!("P{i}")).await.unwrap());
    }
    ids
}

#[tokio::test]
async fn count_and_reset() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 3).await;
    assert_eq!(t.count_players().await.unwrap(), 3);
    t.report_match(ids[0], ids[1]).await.unwrap();

    t.delete_players().await.unwrap();

    assert_eq!(t.count_players().await.unwrap(), 0);
    assert!(t.player_standings().await.unwrap().is_empty());
    assert!(t.matches().await.unwrap().is_empty());
    assert!(t.audit_aggregates().await.unwrap().is_empty());
}

#[tokio::test]
async fn unplayed_players_stand_at_zero() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 2).await;
    let standings = t.player_standings().await.unwrap();
    let rows: Vec<_> = standings
        .iter()
        .map(|e| (e.player_id, e.wins, e.matches_played))
        .collect();
    assert_eq!(rows, vec![(ids[0], 0, 0), (ids[1], 0, 0)]);
}

#[tokio::test]
async fn rounds_pair_winners_together() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 4).await;

    let first: Vec<_> = t
        .swiss_pairings()
        .await
        .unwrap()
        .iter()
        .map(|p| (p.player1_id, p.player2_id))
        .collect();
    assert_eq!(first, vec![(ids[0], ids[1]), (ids[2], ids[3])]);

    t.report_match(ids[0], ids[1]).await.unwrap();
    t.report_match(ids[2], ids[3]).await.unwrap();

    let second: Vec<_> = t
        .swiss_pairings()
        .await
        .unwrap()
        .iter()
        .map(|p| (p.player1_id, p.player2_id))
        .collect();
    assert_eq!(second, vec![(ids[0], ids[2]), (ids[1], ids[3])]);
}

#[tokio::test]
async fn totals_match_history_and_rebuild_cleanly() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 4).await;
    let results = [(0, 1), (2, 3), (0, 2), (3, 1), (1, 0)];
    for (w, l) in results {
        t.report_match(ids[w], ids[l]).await.unwrap();
    }

    let standings = t.player_standings().await.unwrap();
    let wins: u32 = standings.iter().map(|e| e.wins).sum();
    let losses: u32 = standings.iter().map(|e| e.losses()).sum();
    assert_eq!(wins + losses, 2 * results.len() as u32);
    assert!(t.audit_aggregates().await.unwrap().is_empty());

    assert_eq!(t.reconcile_aggregates().await.unwrap(), 4);
    assert_eq!(t.player_standings().await.unwrap(), standings);
}

#[tokio::test]
async fn rejected_reports_write_nothing() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 3).await;
    t.report_match(ids[0], ids[1]).await.unwrap();
    let before = t.player_standings().await.unwrap();

    let missing = ids[2] + 1000;
    assert_eq!(
        t.report_match(ids[0], missing).await,
        Err(TournamentError::UnknownPlayer(missing))
    );
    assert_eq!(
        t.report_match(ids[1], ids[1]).await,
        Err(TournamentError::InvalidPair(ids[1]))
    );
    assert_eq!(
        t.swiss_pairings().await,
        Err(TournamentError::OddPlayerCount { count: 3 })
    );

    assert_eq!(t.player_standings().await.unwrap(), before);
    assert_eq!(t.matches().await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_matches_keeps_players() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 2).await;
    t.report_match(ids[1], ids[0]).await.unwrap();

    t.delete_matches().await.unwrap();

    assert_eq!(t.count_players().await.unwrap(), 2);
    assert!(t.matches().await.unwrap().is_empty());
    assert!(t
        .player_standings()
        .await
        .unwrap()
        .iter()
        .all(|e| e.wins == 0 && e.matches_played == 0));
}

#[tokio::test]
async fn opposite_direction_reports_run_concurrently() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 2).await;
    let (a, b) = (ids[0], ids[1]);

    let mut handles = Vec::new();
    for i in 0..40 {
        let t = t.clone();
        let (w, l) = if i % 2 == 0 { (a, b) } else { (b, a) };
        handles.push(tokio::spawn(async move { t.report_match(w, l).await }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let standings = t.player_standings().await.unwrap();
    assert!(standings.iter().all(|e| e.matches_played == 40 && e.wins == 20));
    assert_eq!(t.matches().await.unwrap().len(), 40);
    assert!(t.audit_aggregates().await.unwrap().is_empty());
}

#[tokio::test]
async fn resets_during_reports_keep_the_ledger_consistent() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 4).await;

    let mut handles = Vec::new();
    for i in 0..24 {
        let tr = t.clone();
        let (x, y) = (ids[i % 4], ids[(i + 1) % 4]);
        let (w, l) = if i % 2 == 0 { (x, y) } else { (y, x) };
        handles.push(tokio::spawn(async move {
            tr.report_match(w, l).await.map(|_| ())
        }));
        if i == 12 {
            let t = t.clone();
            handles.push(tokio::spawn(async move { t.delete_matches().await }));
        }
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let recorded = t.matches().await.unwrap().len() as u32;
    let played: u32 = t
        .player_standings()
        .await
        .unwrap()
        .iter()
        .map(|e| e.matches_played)
        .sum();
    assert_eq!(played, 2 * recorded);
    assert!(t.audit_aggregates().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_players_during_reports_never_fails_the_store() {
    let Some((t, _guard)) = pg_tournament().await else { return };
    let ids = register(&t, 2).await;
    let known: HashSet<PlayerId> = ids.iter().copied().collect();

    let mut reports = Vec::new();
    for i in 0..20 {
        let t = t.clone();
        let (w, l) = if i % 2 == 0 { (ids[0], ids[1]) } else { (ids[1], ids[0]) };
        reports.push(tokio::spawn(async move { t.report_match(w, l).await }));
    }
    let reset = {
        let t = t.clone();
        tokio::spawn(async move { t.delete_players().await })
    };

    reset.await.unwrap().unwrap();
    for h in reports {
        match h.await.unwrap() {
            Ok(_) => {}
            Err(TournamentError::UnknownPlayer(id)) => assert!(known.contains(&id)),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(t.count_players().await.unwrap(), 0);
    assert!(t.matches().await.unwrap().is_empty());
    assert!(t.audit_aggregates().await.unwrap().is_empty());
}
