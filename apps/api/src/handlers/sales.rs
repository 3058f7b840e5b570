//! # Sale Handlers
//!
//! `POST /api/sales` is the point-of-sale entry: the cart is validated,
//! then handed to the [`SaleProcessor`](rxstock_db::SaleProcessor) which
//! prices it and commits sale, items and stock changes together.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rxstock_core::validation::validate_sale_input;
use rxstock_core::{CoreError, Sale, SaleInput};
use tracing::debug;

use crate::error::ApiError;
use crate::handlers::{acting_user, ListParams};
use crate::state::AppState;

/// `POST /api/sales`
pub async fn create_sale(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SaleInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    let Json(input) = payload?;
    let user = acting_user(&headers);
    debug!(user = %user, lines = input.items.len(), "create_sale request");

    let new_sale = validate_sale_input(&input, &user)?;
    let sale = state.db.checkout().create_sale(new_sale, state.today()).await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /api/sales?limit=N`, newest first.
pub async fn list_sales(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let limit = ListParams::from_query(query)?;
    Ok(Json(state.db.sales().list_recent(limit).await?))
}

/// `GET /api/sales/:id`
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::SaleNotFound(id))?;

    Ok(Json(sale))
}
