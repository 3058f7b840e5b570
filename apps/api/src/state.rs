//! Shared application state.

use chrono::{Local, NaiveDate};
use rxstock_db::Database;
use std::sync::Arc;

/// Source of the business date used to pick running promotions.
type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    clock: Clock,
}

impl AppState {
    /// State using the server's local calendar date.
    pub fn new(db: Database) -> Self {
        AppState {
            db,
            clock: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// State pinned to one business date.
    pub fn with_fixed_date(db: Database, date: NaiveDate) -> Self {
        AppState {
            db,
            clock: Arc::new(move || date),
        }
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("today", &self.today())
            .finish()
    }
}
