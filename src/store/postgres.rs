//! PostgreSQL store backed by an `sqlx` connection pool.
//!
//! # Database Schema
//!
//! ```sql
//! CREATE TABLE players (
//!     id   BIGSERIAL PRIMARY KEY,
//!     name TEXT NOT NULL
//! );
//!
//! CREATE TABLE matches (
//!     id          BIGSERIAL PRIMARY KEY,
//!     winner      BIGINT NOT NULL REFERENCES players (id) ON DELETE CASCADE,
//!     loser       BIGINT NOT NULL REFERENCES players (id) ON DELETE CASCADE,
//!     recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     CHECK (winner <> loser)
//! );
//!
//! CREATE TABLE player_matches (
//!     player_id BIGINT PRIMARY KEY REFERENCES players (id) ON DELETE CASCADE,
//!     matches   INTEGER NOT NULL DEFAULT 0,
//!     wins      INTEGER NOT NULL DEFAULT 0,
//!     losses    INTEGER NOT NULL DEFAULT 0,
//!     CHECK (matches = wins + losses)
//! );
//! ```
//!
//! `player_matches` is only ever changed by single-statement upserts
//! (`matches = matches + 1`) inside the transaction that inserts the match.
//!
//! Lock order: every writer touches `players` before `matches` or
//! `player_matches`. Match reports lock their two player rows in ascending id
//! order; resets and rebuilds take `LOCK TABLE players IN EXCLUSIVE MODE`,
//! which waits for in-flight reports and blocks new ones while leaving plain
//! reads alone.

use crate::models::{MatchRecord, Player, PlayerAggregate, PlayerId, StandingsEntry, TournamentError};
use crate::store::TournamentStore;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id   BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS matches (
        id          BIGSERIAL PRIMARY KEY,
        winner      BIGINT NOT NULL REFERENCES players (id) ON DELETE CASCADE,
        loser       BIGINT NOT NULL REFERENCES players (id) ON DELETE CASCADE,
        recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CHECK (winner <> loser)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player_matches (
        player_id BIGINT PRIMARY KEY REFERENCES players (id) ON DELETE CASCADE,
        matches   INTEGER NOT NULL DEFAULT 0,
        wins      INTEGER NOT NULL DEFAULT 0,
        losses    INTEGER NOT NULL DEFAULT 0,
        CHECK (matches = wins + losses)
    )
    "#,
];

/// PostgreSQL tournament store.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url` with at most `max_connections` connections.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, TournamentError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), TournamentError> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

fn count_column(row: &PgRow, column: &str) -> Result<u32, TournamentError> {
    let value: i32 = row.try_get(column)?;
    u32::try_from(value).map_err(|_| {
        TournamentError::StorageFailure(format!("negative {column} count ({value})"))
    })
}

fn aggregate_from_row(row: &PgRow) -> Result<PlayerAggregate, TournamentError> {
    Ok(PlayerAggregate {
        player_id: row.try_get("player_id")?,
        matches_played: count_column(row, "matches")?,
        wins: count_column(row, "wins")?,
        losses: count_column(row, "losses")?,
    })
}

/// Serialize against in-flight match reports before bulk changes.
async fn lock_players(tx: &mut Transaction<'_, Postgres>) -> Result<(), TournamentError> {
    sqlx::query("LOCK TABLE players IN EXCLUSIVE MODE")
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Bump one player's aggregate by a single win or loss.
async fn bump_aggregate(
    tx: &mut Transaction<'_, Postgres>,
    player_id: PlayerId,
    won: bool,
) -> Result<(), TournamentError> {
    let (wins, losses): (i32, i32) = if won { (1, 0) } else { (0, 1) };
    sqlx::query(
        r#"
        INSERT INTO player_matches (player_id, matches, wins, losses)
        VALUES ($1, 1, $2, $3)
        ON CONFLICT (player_id) DO UPDATE
        SET matches = player_matches.matches + 1,
            wins = player_matches.wins + EXCLUDED.wins,
            losses = player_matches.losses + EXCLUDED.losses
        "#,
    )
    .bind(player_id)
    .bind(wins)
    .bind(losses)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_player_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<Player, TournamentError> {
    let id: PlayerId = sqlx::query_scalar("INSERT INTO players (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;
    Ok(Player::new(id, name))
}

#[async_trait]
impl TournamentStore for PgStore {
    async fn insert_player(&self, name: &str) -> Result<Player, TournamentError> {
        let mut tx = self.pool.begin().await?;
        let player = insert_player_tx(&mut tx, name).await?;
        tx.commit().await?;
        Ok(player)
    }

    async fn insert_players(&self, names: &[String]) -> Result<Vec<Player>, TournamentError> {
        let mut tx = self.pool.begin().await?;
        let mut players = Vec::with_capacity(names.len());
        for name in names {
            players.push(insert_player_tx(&mut tx, name).await?);
        }
        tx.commit().await?;
        Ok(players)
    }

    async fn count_players(&self) -> Result<usize, TournamentError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn list_players(&self) -> Result<Vec<Player>, TournamentError> {
        let rows = sqlx::query("SELECT id, name FROM players ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| -> Result<Player, TournamentError> {
                Ok(Player::new(row.try_get("id")?, row.try_get::<String, _>("name")?))
            })
            .collect()
    }

    async fn delete_players(&self) -> Result<(), TournamentError> {
        let mut tx = self.pool.begin().await?;
        lock_players(&mut tx).await?;
        sqlx::query("DELETE FROM player_matches").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM matches").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM players").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_matches(&self) -> Result<(), TournamentError> {
        let mut tx = self.pool.begin().await?;
        lock_players(&mut tx).await?;
        sqlx::query("DELETE FROM player_matches").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM matches").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Validates, inserts and upserts inside one transaction.
    ///
    /// Both player rows are locked `FOR UPDATE` in ascending id order before
    /// anything is written, so reports of the same pair in either direction
    /// queue behind each other instead of deadlocking, and a concurrent reset
    /// cannot slip in between validation and insert.
    async fn record_match(
        &self,
        winner: PlayerId,
        loser: PlayerId,
    ) -> Result<MatchRecord, TournamentError> {
        let mut tx = self.pool.begin().await?;

        let known: Vec<PlayerId> = sqlx::query_scalar(
            "SELECT id FROM players WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(vec![winner, loser])
        .fetch_all(&mut *tx)
        .await?;
        for id in [winner, loser] {
            if !known.contains(&id) {
                // Dropping `tx` rolls back.
                return Err(TournamentError::UnknownPlayer(id));
            }
        }

        let row = sqlx::query(
            r#"
            INSERT INTO matches (winner, loser)
            VALUES ($1, $2)
            RETURNING id, recorded_at
            "#,
        )
        .bind(winner)
        .bind(loser)
        .fetch_one(&mut *tx)
        .await?;

        let mut results = [(winner, true), (loser, false)];
        results.sort_unstable_by_key(|&(id, _)| id);
        for (player_id, won) in results {
            bump_aggregate(&mut tx, player_id, won).await?;
        }

        tx.commit().await?;

        Ok(MatchRecord {
            id: row.try_get("id")?,
            winner_id: winner,
            loser_id: loser,
            recorded_at: row.try_get("recorded_at")?,
        })
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, TournamentError> {
        let rows = sqlx::query("SELECT id, winner, loser, recorded_at FROM matches ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| -> Result<MatchRecord, TournamentError> {
                Ok(MatchRecord {
                    id: row.try_get("id")?,
                    winner_id: row.try_get("winner")?,
                    loser_id: row.try_get("loser")?,
                    recorded_at: row.try_get("recorded_at")?,
                })
            })
            .collect()
    }

    async fn standings_rows(&self) -> Result<Vec<StandingsEntry>, TournamentError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.name,
                   COALESCE(pm.wins, 0) AS wins,
                   COALESCE(pm.matches, 0) AS matches
            FROM players p
            LEFT JOIN player_matches pm ON pm.player_id = p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| -> Result<StandingsEntry, TournamentError> {
                Ok(StandingsEntry {
                    player_id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    wins: count_column(row, "wins")?,
                    matches_played: count_column(row, "matches")?,
                })
            })
            .collect()
    }

    async fn aggregates(&self) -> Result<Vec<PlayerAggregate>, TournamentError> {
        let rows = sqlx::query(
            "SELECT player_id, matches, wins, losses FROM player_matches ORDER BY player_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(aggregate_from_row).collect()
    }

    async fn rebuild_aggregates(&self) -> Result<usize, TournamentError> {
        let mut tx = self.pool.begin().await?;
        lock_players(&mut tx).await?;
        sqlx::query("DELETE FROM player_matches").execute(&mut *tx).await?;
        let written = sqlx::query(
            r#"
            INSERT INTO player_matches (player_id, matches, wins, losses)
            SELECT player_id,
                   COUNT(*),
                   COUNT(*) FILTER (WHERE won),
                   COUNT(*) FILTER (WHERE NOT won)
            FROM (
                SELECT winner AS player_id, TRUE AS won FROM matches
                UNION ALL
                SELECT loser AS player_id, FALSE AS won FROM matches
            ) AS results
            GROUP BY player_id
            "#,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx.commit().await?;
        Ok(written as usize)
    }
}
