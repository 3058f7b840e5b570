//! # RxStock API
//!
//! REST server for the pharmacy inventory and sales backend.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET   /health                                                          │
//! │                                                                         │
//! │  POST  /api/sales                    create a sale (atomic)            │
//! │  GET   /api/sales                    recent sales                      │
//! │  GET   /api/sales/:id                one sale with items               │
//! │                                                                         │
//! │  POST  /api/products                 GET /api/products                 │
//! │  GET   /api/products/:id             PUT /api/products/:id             │
//! │  POST  /api/products/:id/restock     GET /api/restock-history          │
//! │                                                                         │
//! │  POST  /api/suppliers                GET /api/suppliers[/:id]          │
//! │  POST  /api/promotions               GET /api/promotions[/:id]         │
//! │  PATCH /api/promotions/:id           toggle is_active                  │
//! │  GET   /api/settings                 POST /api/settings                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, products, promotions, sales, settings, suppliers};

pub use crate::config::{ApiConfig, ConfigError};
pub use crate::error::{ApiError, ErrorCode};
pub use crate::state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sales", get(sales::list_sales).post(sales::create_sale))
        .route("/sales/:id", get(sales::get_sale))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product).put(products::update_product),
        )
        .route(
            "/products/:id/restock",
            axum::routing::post(products::restock_product),
        )
        .route("/restock-history", get(products::restock_history))
        .route(
            "/suppliers",
            get(suppliers::list_suppliers).post(suppliers::create_supplier),
        )
        .route("/suppliers/:id", get(suppliers::get_supplier))
        .route(
            "/promotions",
            get(promotions::list_promotions).post(promotions::create_promotion),
        )
        .route(
            "/promotions/:id",
            get(promotions::get_promotion).patch(promotions::set_promotion_active),
        )
        .route(
            "/settings",
            get(settings::get_settings).post(settings::update_settings),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
