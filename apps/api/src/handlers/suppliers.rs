//! Supplier handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rxstock_core::validation::validate_new_supplier;
use rxstock_core::{CoreError, NewSupplier, Supplier};

use crate::error::ApiError;
use crate::handlers::ListParams;
use crate::state::AppState;

/// `POST /api/suppliers`
pub async fn create_supplier(
    State(state): State<AppState>,
    payload: Result<Json<NewSupplier>, JsonRejection>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let Json(new) = payload?;
    validate_new_supplier(&new)?;

    let supplier = state.db.suppliers().create(&new).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// `GET /api/suppliers?limit=N`
pub async fn list_suppliers(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    let limit = ListParams::from_query(query)?;
    Ok(Json(state.db.suppliers().list(limit).await?))
}

/// `GET /api/suppliers/:id`
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = state
        .db
        .suppliers()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::SupplierNotFound(id))?;

    Ok(Json(supplier))
}
