//! [`SqliteStore`]: the SQLite implementation of [`StateStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use kgprompt_core::store::StateStore;

use crate::{
  Result,
  encode::{decode_dt, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Saved editor state backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening state store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The schema version recorded in the database file.
  pub async fn schema_version(&self) -> Result<i64> {
    let version = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    Ok(version)
  }

  /// When `key` was last written, or `None` if it never was.
  pub async fn saved_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
    let key = key.to_owned();
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT saved_at FROM saved_state WHERE storage_key = ?1",
              rusqlite::params![key],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.as_deref().map(decode_dt).transpose()
  }

  async fn read(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let payload = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT payload FROM saved_state WHERE storage_key = ?1",
              rusqlite::params![key],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(payload)
  }

  async fn write(&self, key: &str, payload: String) -> Result<()> {
    let key = key.to_owned();
    let saved_at = encode_dt(Utc::now());
    let bytes = payload.len();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO saved_state (storage_key, payload, saved_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(storage_key) DO UPDATE
             SET payload = excluded.payload, saved_at = excluded.saved_at",
          rusqlite::params![key, payload, saved_at],
        )?;
        Ok(())
      })
      .await?;

    debug!(bytes, "wrote saved state");
    Ok(())
  }
}

impl StateStore for SqliteStore {
  type Error = crate::Error;

  async fn read_blob<'a>(&'a self, key: &'a str) -> Result<Option<String>> {
    self.read(key).await
  }

  async fn write_blob<'a>(&'a self, key: &'a str, payload: String) -> Result<()> {
    self.write(key, payload).await
  }
}
