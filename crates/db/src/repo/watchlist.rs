//! Per-user watchlist persisted as one versioned JSON record in the `kv` table.
//!
//! Record layout (version 1):
//!
//! ```json
//! { "version": 1, "entries": [ { "id": 603, "content_type": "movie", ... } ] }
//! ```
//!
//! A bare JSON array is the legacy unversioned layout; it is read as version 0
//! and rewritten as version 1 on the next toggle.

use marquee_core::types::ContentType;
use marquee_core::watchlist::{Watchlist, WatchlistEntry};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;

use super::kv;
use crate::DbError;

pub const KEY_PREFIX: &str = "mylist_";
pub const RECORD_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Record {
    version: u32,
    entries: Vec<WatchlistEntry>,
}

pub fn storage_key(user_id: &str) -> String {
    format!("{KEY_PREFIX}{user_id}")
}

/// Parse a stored record. Anything unreadable yields an empty list.
pub fn decode(raw: &str) -> Watchlist {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "corrupt watchlist record, treating as empty");
            return Watchlist::default();
        }
    };

    match value {
        serde_json::Value::Array(items) => {
            // v0 entries were written without schema checks; keep what parses.
            let entries = items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<WatchlistEntry>(item).ok())
                .collect();
            Watchlist::from_entries(entries)
        }
        serde_json::Value::Object(_) => match serde_json::from_value::<Record>(value) {
            Ok(record) if record.version == RECORD_VERSION => {
                Watchlist::from_entries(record.entries)
            }
            Ok(record) => {
                warn!(version = record.version, "unknown watchlist record version");
                Watchlist::default()
            }
            Err(e) => {
                warn!(error = %e, "malformed watchlist record, treating as empty");
                Watchlist::default()
            }
        },
        _ => {
            warn!("unexpected watchlist record shape, treating as empty");
            Watchlist::default()
        }
    }
}

pub fn encode(list: &Watchlist) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Record {
        version: RECORD_VERSION,
        entries: list.entries().to_vec(),
    })
}

/// Load a user's watchlist.
pub async fn list(pool: &SqlitePool, user_id: &str) -> Result<Watchlist, DbError> {
    let raw = kv::get(pool, &storage_key(user_id)).await?;
    Ok(raw.as_deref().map(decode).unwrap_or_default())
}

pub async fn contains(
    pool: &SqlitePool,
    user_id: &str,
    content_type: ContentType,
    id: u64,
) -> Result<bool, DbError> {
    Ok(list(pool, user_id).await?.contains(content_type, id))
}

/// Add the entry, or remove it when the same title is already saved.
///
/// The read-modify-write runs under `BEGIN IMMEDIATE`, which takes the write
/// lock up front; concurrent toggles wait on the busy timeout instead of
/// failing the lock upgrade.
pub async fn toggle(
    pool: &SqlitePool,
    user_id: &str,
    entry: WatchlistEntry,
) -> Result<(bool, Watchlist), DbError> {
    let key = storage_key(user_id);
    let mut conn = pool.acquire().await?;

    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
    let result = match toggle_locked(&mut conn, &key, entry).await {
        Ok(toggled) => sqlx::query("COMMIT")
            .execute(&mut *conn)
            .await
            .map(|_| toggled)
            .map_err(DbError::from),
        Err(e) => Err(e),
    };
    // The connection goes back to the pool; it must not stay inside a transaction.
    if result.is_err() {
        let rollback = sqlx::query("ROLLBACK").execute(&mut *conn).await;
        if let Err(e) = rollback {
            warn!(error = %e, "watchlist rollback failed");
        }
    }
    result
}

async fn toggle_locked(
    conn: &mut SqliteConnection,
    key: &str,
    entry: WatchlistEntry,
) -> Result<(bool, Watchlist), DbError> {
    let mut current = kv::get(&mut *conn, key)
        .await?
        .as_deref()
        .map(decode)
        .unwrap_or_default();
    let added = current.toggle(entry);
    kv::set(&mut *conn, key, &encode(&current)?).await?;
    Ok((added, current))
}
