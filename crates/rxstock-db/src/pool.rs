//! # Pool & Database Handle
//!
//! Opens the SQLite store and hands out repositories and services that all
//! share one pool and one writer gate.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig (path, pool sizing, timeouts)                                 │
//! │       │                                                                 │
//! │  Database::new ──► SqlitePool (WAL, foreign_keys=ON, busy_timeout)      │
//! │       │        └─► migrations (optional)                                │
//! │       │                                                                 │
//! │  Database ─┬─ products() suppliers() promotions() settings()   writes  │
//! │            │      └── take the WriteGate, then a pooled connection      │
//! │            ├─ sales() restocks()                              reads    │
//! │            │      └── any pooled connection, never blocked              │
//! │            └─ checkout() inventory() begin()           units of work   │
//! │                   └── WriteGate + one transaction                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why a Writer Gate
//! SQLite allows one writer at a time. A deferred transaction that reads
//! before it writes can fail to upgrade its lock if another connection
//! committed in between. Serializing writers in-process means a sale's
//! stock check and its decrement always see the same data.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::checkout::SaleProcessor;
use crate::error::{DbError, DbResult};
use crate::inventory::InventoryService;
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::promotion::PromotionRepository;
use crate::repository::restock::RestockRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::setting::SettingRepository;
use crate::repository::supplier::SupplierRepository;
use crate::unit_of_work::{UnitOfWork, WriteGate};

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for [`Database::new`].
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/rxstock/rxstock.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Pool ceiling (default 5).
    pub max_connections: u32,

    /// Connections kept open while idle (default 1).
    pub min_connections: u32,

    /// How long to wait for a pooled connection (default 30s).
    pub connect_timeout: Duration,

    /// Idle connections are reaped after this long (default 10 min).
    /// `None` for in-memory stores, which vanish with their last connection.
    pub idle_timeout: Option<Duration>,

    /// SQLite `busy_timeout` for a locked file (default 5s).
    pub busy_timeout: Duration,

    /// Apply pending migrations while connecting (default on).
    pub run_migrations: bool,
}

impl DbConfig {
    /// Settings for a file-backed store; the file is created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// A private in-memory store on a single, never-reaped connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository and service access.
///
/// Cheap to clone: the pool and the writer gate are shared.
///
/// ## Usage in Handlers
/// ```rust,ignore
/// async fn create_sale(State(state): State<AppState>, ...) -> Result<Json<Sale>, ApiError> {
///     let sale = state.db.checkout().create_sale(new_sale, today).await?;
///     Ok(Json(sale))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    gate: WriteGate,
}

impl Database {
    /// Opens (creating if needed) the store and applies migrations.
    ///
    /// Every connection runs in WAL mode with `synchronous=NORMAL` and
    /// foreign key enforcement on.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening RxStock database"
        );

        // sqlite://path?mode=rwc creates the file if it does not exist
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has foreign keys disabled by default
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);

        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "SQLite pool ready"
        );

        let db = Database {
            pool,
            gate: WriteGate::default(),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a unit of work: takes the writer gate and begins a transaction.
    ///
    /// Dropping the unit of work without [`UnitOfWork::commit`] rolls back.
    pub async fn begin(&self) -> DbResult<UnitOfWork> {
        UnitOfWork::begin(&self.pool, &self.gate).await
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.gate.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.pool.clone(), self.gate.clone())
    }

    pub fn promotions(&self) -> PromotionRepository {
        PromotionRepository::new(self.pool.clone(), self.gate.clone())
    }

    pub fn settings(&self) -> SettingRepository {
        SettingRepository::new(self.pool.clone(), self.gate.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn restocks(&self) -> RestockRepository {
        RestockRepository::new(self.pool.clone())
    }

    /// Returns the sale transaction processor.
    pub fn checkout(&self) -> SaleProcessor {
        SaleProcessor::new(self.clone())
    }

    /// Returns the restocking service.
    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.clone())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        info!("Closing RxStock database");
        self.pool.close().await;
    }

    /// `true` when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_answers_queries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_file_database_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rxstock.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(db.health_check().await);
        assert!(path.exists());
        db.close().await;
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("rxstock-test.db")
            .max_connections(8)
            .min_connections(3)
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 3);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
