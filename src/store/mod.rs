//! Queue store adapter
//!
//! Thin adapter over the relational store for the `clients` (queue entries)
//! and `barbers` (staff credentials) tables. The server only ever needs
//! insert, equality-filtered ordered select, and delete-by-id.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Queue entry as stored in the `clients` table.
#[derive(Debug, Clone)]
pub struct ClientRow {
    pub id: String,
    pub name: String,
    pub barber: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Staff credential from the `barbers` table.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password_hash: String,
}

pub struct QueueStore {
    pool: SqlitePool,
}

impl QueueStore {
    /// Connect to the database and ensure the schema exists.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                barber TEXT NOT NULL,
                status TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS barbers (
                username TEXT PRIMARY KEY,
                password TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("[Store] Connected to {}", database_url);

        Ok(Self { pool })
    }

    pub async fn insert_client(&self, client: &ClientRow) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO clients (id, name, barber, status, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.barber)
        .bind(&client.status)
        .bind(client.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a queue entry by id. Deleting an id that is already gone is
    /// a no-op, never an error.
    pub async fn delete_client(&self, client_id: &str) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Ids of waiting clients for one barber, ordered by join time.
    pub async fn waiting_ids(&self, barber: &str) -> sqlx::Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT id FROM clients WHERE barber = ? AND status = 'waiting' ORDER BY timestamp ASC",
        )
        .bind(barber)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// (id, name) of waiting clients for one barber, ordered by join time.
    pub async fn waiting_clients(&self, barber: &str) -> sqlx::Result<Vec<(String, String)>> {
        sqlx::query_as(
            "SELECT id, name FROM clients WHERE barber = ? AND status = 'waiting' ORDER BY timestamp ASC",
        )
        .bind(barber)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_credential(&self, username: &str) -> sqlx::Result<Option<Credential>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT username, password FROM barbers WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(username, password_hash)| Credential {
            username,
            password_hash,
        }))
    }

    pub async fn insert_credential(&self, username: &str, password_hash: &str) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO barbers (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
