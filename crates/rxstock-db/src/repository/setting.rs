//! # Setting Repository
//!
//! Key/value settings. Values are stored as text; interpreting them
//! (e.g. the tax rate) is up to the caller.

use sqlx::{SqliteExecutor, SqlitePool};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::DbResult;
use crate::unit_of_work::WriteGate;
use rxstock_core::Setting;

/// Repository for settings.
#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
    gate: WriteGate,
}

impl SettingRepository {
    pub fn new(pool: SqlitePool, gate: WriteGate) -> Self {
        SettingRepository { pool, gate }
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        fetch_value(&self.pool, key).await
    }

    /// All settings, keyed by name.
    pub async fn all(&self) -> DbResult<BTreeMap<String, String>> {
        let rows = sqlx::query_as::<_, Setting>("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|s| (s.key, s.value)).collect())
    }

    /// Inserts or replaces every entry in one transaction.
    pub async fn upsert_many(&self, entries: &BTreeMap<String, String>) -> DbResult<()> {
        debug!(count = entries.len(), "Upserting settings");

        let _writer = self.gate.acquire().await;
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO settings (key, value) VALUES (?1, ?2)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let mut entries = BTreeMap::new();
        entries.insert(key.to_string(), value.to_string());
        self.upsert_many(&entries).await
    }
}

pub(crate) async fn fetch_value<'e, E>(executor: E, key: &str) -> DbResult<Option<String>>
where
    E: SqliteExecutor<'e>,
{
    let value = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
        .bind(key)
        .fetch_optional(executor)
        .await?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;
    use rxstock_core::TAX_RATE_KEY;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let db = test_db().await;
        let settings = db.settings();

        assert_eq!(settings.get(TAX_RATE_KEY).await.unwrap(), None);

        settings.set(TAX_RATE_KEY, "10").await.unwrap();
        let mut batch = BTreeMap::new();
        batch.insert(TAX_RATE_KEY.to_string(), "12.5".to_string());
        batch.insert("pharmacy_name".to_string(), "Corner Pharmacy".to_string());
        settings.upsert_many(&batch).await.unwrap();

        assert_eq!(settings.get(TAX_RATE_KEY).await.unwrap().as_deref(), Some("12.5"));
        assert_eq!(settings.all().await.unwrap(), batch);
    }
}
