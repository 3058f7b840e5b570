//! # Product Handlers
//!
//! Catalog CRUD plus restocking. Stock only changes through
//! `POST /api/products/:id/restock` and sales.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rxstock_core::validation::{validate_new_product, validate_product_update};
use rxstock_core::{CoreError, NewProduct, Product, ProductUpdate, RestockEntry, RestockRequest};

use crate::error::ApiError;
use crate::handlers::{acting_user, ListParams};
use crate::state::AppState;

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(new) = payload?;
    validate_new_product(&new)?;

    let product = state.db.products().create(&new).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products?limit=N`, ordered by name.
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let limit = ListParams::from_query(query)?;
    Ok(Json(state.db.products().list(limit).await?))
}

/// `GET /api/products/:id`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::ProductNotFound(id))?;

    Ok(Json(product))
}

/// `PUT /api/products/:id`
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Json(update) = payload?;
    validate_product_update(&update)?;

    Ok(Json(state.db.products().update_details(&id, &update).await?))
}

/// `POST /api/products/:id/restock`
pub async fn restock_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<RestockRequest>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Json(request) = payload?;
    let user = acting_user(&headers);

    let product = state.db.inventory().restock(&id, request, Some(user)).await?;
    Ok(Json(product))
}

/// `GET /api/restock-history?limit=N`, newest first.
pub async fn restock_history(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<RestockEntry>>, ApiError> {
    let limit = ListParams::from_query(query)?;
    Ok(Json(state.db.restocks().history(limit).await?))
}
