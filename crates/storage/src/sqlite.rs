//! SQLite-backed state slots for native builds.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::runtime::{Handle, Runtime};

use crate::slot::{SlotError, StateSlot};

/// Durable slot store in a single SQLite table.
///
/// The slot API is synchronous, so the store owns a small current-thread
/// runtime and blocks on it for every call. Calls made from inside another
/// runtime's context are driven on a scoped helper thread instead.
#[derive(Debug)]
pub struct SqliteSlot {
    runtime: Runtime,
    /// Taken on drop so the pool is closed on its own runtime.
    pool: Option<SqlitePool>,
    path: PathBuf,
}

impl SqliteSlot {
    /// Open (creating if needed) the slot database at `path`.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state directory at {:?}", parent))?;
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build runtime for SqliteSlot")?;

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);

        let pool = run_blocking(&runtime, async {
            // One connection keeps writes strictly ordered.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await
                .with_context(|| format!("failed to open SQLite state store at {:?}", path))?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS slots (
                    key        TEXT PRIMARY KEY,
                    value      TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                "#,
            )
            .execute(&pool)
            .await
            .context("failed to create slots table")?;

            Ok::<_, anyhow::Error>(pool)
        })??;

        tracing::debug!(path = %path.display(), "opened SQLite state store");

        Ok(Self {
            runtime,
            pool: Some(pool),
            path,
        })
    }

    /// Open the store at [`default_state_db_path`].
    pub fn open_default() -> anyhow::Result<Self> {
        let path = default_state_db_path()?;
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pool(&self) -> Result<&SqlitePool, SlotError> {
        self.pool
            .as_ref()
            .ok_or_else(|| SlotError::Unavailable("state store closed".to_string()))
    }
}

impl Drop for SqliteSlot {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            if let Err(err) = run_blocking(&self.runtime, pool.close()) {
                tracing::warn!(error = %err, "failed to close SQLite state store");
            }
        }
    }
}

impl StateSlot for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        let pool = self.pool()?;
        let row = run_blocking(&self.runtime, async {
            sqlx::query(
                r#"
                SELECT value
                FROM slots
                WHERE key = ?1
                "#,
            )
            .bind(key)
            .fetch_optional(pool)
            .await
        })?;
        let row = row.map_err(|e| SlotError::Storage(format!("failed to read slot {key}: {e}")))?;

        match row {
            Some(row) => row
                .try_get::<String, _>("value")
                .map(Some)
                .map_err(|e| SlotError::Storage(format!("failed to decode slot {key}: {e}"))),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let pool = self.pool()?;
        let now = Utc::now().to_rfc3339();

        let result = run_blocking(&self.runtime, async {
            sqlx::query(
                r#"
                INSERT INTO slots (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key)
                DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(&now)
            .execute(pool)
            .await
        })?;

        result
            .map(|_| ())
            .map_err(|e| SlotError::Storage(format!("failed to write slot {key}: {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        let pool = self.pool()?;
        let result = run_blocking(&self.runtime, async {
            sqlx::query(
                r#"
                DELETE FROM slots
                WHERE key = ?1
                "#,
            )
            .bind(key)
            .execute(pool)
            .await
        })?;

        result
            .map(|_| ())
            .map_err(|e| SlotError::Storage(format!("failed to remove slot {key}: {e}")))
    }
}

/// Drive `fut` to completion on `runtime`.
///
/// `Runtime::block_on` panics when the calling thread is already inside a
/// runtime (an async UI calling into the cart, a `#[tokio::test]`). In that
/// case the future runs on a scoped thread that has no runtime context.
fn run_blocking<F>(runtime: &Runtime, fut: F) -> Result<F::Output, SlotError>
where
    F: Future + Send,
    F::Output: Send,
{
    if Handle::try_current().is_err() {
        return Ok(runtime.block_on(fut));
    }

    std::thread::scope(|scope| scope.spawn(move || runtime.block_on(fut)).join())
        .map_err(|_| SlotError::Storage("state store worker panicked".to_string()))
}

/// Resolve the default state database path:
/// `{app_data_dir}/storefront/state.db`.
pub fn default_state_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut path = base;
    path.push("storefront");
    path.push("state.db");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("storefront-slot-{}", uuid::Uuid::now_v7()));
        path.push("state.db");
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn values_survive_reopening_the_store() {
        let path = temp_db_path();
        {
            let slot = SqliteSlot::open(&path).unwrap();
            assert_eq!(slot.read("cart").unwrap(), None);
            slot.write("cart", r#"{"1":{"qty":2}}"#).unwrap();
        }

        let reopened = SqliteSlot::open(&path).unwrap();
        assert_eq!(
            reopened.read("cart").unwrap().as_deref(),
            Some(r#"{"1":{"qty":2}}"#)
        );

        drop(reopened);
        cleanup(&path);
    }

    #[test]
    fn write_overwrites_and_remove_deletes() {
        let path = temp_db_path();
        let slot = SqliteSlot::open(&path).unwrap();

        slot.write("cart", "{}").unwrap();
        slot.write("cart", r#"{"2":{}}"#).unwrap();
        assert_eq!(slot.read("cart").unwrap().as_deref(), Some(r#"{"2":{}}"#));

        slot.remove("cart").unwrap();
        assert_eq!(slot.read("cart").unwrap(), None);
        slot.remove("cart").unwrap();

        drop(slot);
        cleanup(&path);
    }

    #[test]
    fn keys_are_independent() {
        let path = temp_db_path();
        let slot = SqliteSlot::open(&path).unwrap();

        slot.write("cart", "a").unwrap();
        slot.write("wishlist", "b").unwrap();
        slot.remove("wishlist").unwrap();

        assert_eq!(slot.read("cart").unwrap().as_deref(), Some("a"));

        drop(slot);
        cleanup(&path);
    }

    #[tokio::test]
    async fn usable_from_inside_an_async_runtime() {
        let path = temp_db_path();
        {
            let slot = SqliteSlot::open(&path).unwrap();
            slot.write("cart", r#"{"1":{"qty":1}}"#).unwrap();
            assert_eq!(slot.read("cart").unwrap().as_deref(), Some(r#"{"1":{"qty":1}}"#));
            slot.remove("cart").unwrap();
            assert_eq!(slot.read("cart").unwrap(), None);
            slot.write("cart", "{}").unwrap();
        }

        // Dropping inside the runtime closed the pool cleanly; reopen sees the data.
        let reopened = SqliteSlot::open(&path).unwrap();
        assert_eq!(reopened.read("cart").unwrap().as_deref(), Some("{}"));

        drop(reopened);
        cleanup(&path);
    }

    #[test]
    fn default_path_ends_in_storefront_state_db() {
        if let Ok(path) = default_state_db_path() {
            assert!(path.ends_with("storefront/state.db"));
        }
    }
}
