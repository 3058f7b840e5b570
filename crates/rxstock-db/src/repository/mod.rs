//! # Repository Module
//!
//! Database repository implementations for RxStock.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Shared Queries                      │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  db.products().list(100)                                       │
//! │       ▼                                                                 │
//! │  ProductRepository { pool, gate }                                      │
//! │       │                                                                 │
//! │       │  reads  → pool directly                                        │
//! │       │  writes → gate.acquire() then pool                             │
//! │       ▼                                                                 │
//! │  pub(crate) fn fetch_product(executor, id)  ◄── also called by         │
//! │       │                                         UnitOfWork on its      │
//! │       ▼                                         transaction            │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each module keeps its SQL in free functions generic over
//! `sqlx::SqliteExecutor`, so the same query runs on the pool or inside a
//! [`UnitOfWork`](crate::unit_of_work::UnitOfWork).
//!
//! ## Available Repositories
//!
//! - [`SupplierRepository`](supplier::SupplierRepository) - Supplier directory
//! - [`ProductRepository`](product::ProductRepository) - Catalog and stock
//! - [`PromotionRepository`](promotion::PromotionRepository) - Promotions and their products
//! - [`SettingRepository`](setting::SettingRepository) - Key/value settings
//! - [`SaleRepository`](sale::SaleRepository) - Sale history (read side)
//! - [`RestockRepository`](restock::RestockRepository) - Restock history (read side)

pub mod product;
pub mod promotion;
pub mod restock;
pub mod sale;
pub mod setting;
pub mod supplier;
