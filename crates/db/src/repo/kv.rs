//! String-keyed value store backing per-user client state.

use sqlx::{Sqlite, SqlitePool};

/// Get a value by key.
pub async fn get<'e, E>(executor: E, key: &str) -> Result<Option<String>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
        .bind(key)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|(v,)| v))
}

/// Set a value (upsert).
pub async fn set<'e, E>(executor: E, key: &str, value: &str) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = chrono::Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO kv (key, value, updated_ts) VALUES (?, ?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_ts = excluded.updated_ts",
    )
    .bind(key)
    .bind(value)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Number of keys starting with `prefix`.
pub async fn count_prefix(pool: &SqlitePool, prefix: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv WHERE substr(key, 1, ?) = ?")
        .bind(prefix.len() as i64)
        .bind(prefix)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool() -> SqlitePool {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn set_then_get_upserts() {
        let pool = pool().await;
        assert_eq!(get(&pool, "k").await.unwrap(), None);

        set(&pool, "k", "one").await.unwrap();
        set(&pool, "k", "two").await.unwrap();
        assert_eq!(get(&pool, "k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(get(&pool, "other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn prefix_count_treats_underscore_literally() {
        let pool = pool().await;
        set(&pool, "mylist_a", "[]").await.unwrap();
        set(&pool, "mylist_b", "[]").await.unwrap();
        set(&pool, "mylistXc", "[]").await.unwrap();
        assert_eq!(count_prefix(&pool, "mylist_").await.unwrap(), 2);
    }
}
