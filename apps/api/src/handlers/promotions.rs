//! Promotion handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rxstock_core::validation::validate_new_promotion;
use rxstock_core::{CoreError, NewPromotion, Promotion};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::ListParams;
use crate::state::AppState;

/// Body of `PATCH /api/promotions/:id`.
#[derive(Debug, Deserialize)]
pub struct PromotionPatch {
    pub is_active: bool,
}

/// `POST /api/promotions`
pub async fn create_promotion(
    State(state): State<AppState>,
    payload: Result<Json<NewPromotion>, JsonRejection>,
) -> Result<(StatusCode, Json<Promotion>), ApiError> {
    let Json(new) = payload?;
    validate_new_promotion(&new)?;

    let promotion = state.db.promotions().create(&new).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// `GET /api/promotions?limit=N`, newest window first.
pub async fn list_promotions(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Promotion>>, ApiError> {
    let limit = ListParams::from_query(query)?;
    Ok(Json(state.db.promotions().list(limit).await?))
}

/// `GET /api/promotions/:id`
pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Promotion>, ApiError> {
    let promotion = state
        .db
        .promotions()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::PromotionNotFound(id))?;

    Ok(Json(promotion))
}

/// `PATCH /api/promotions/:id` with `{"is_active": bool}`
pub async fn set_promotion_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PromotionPatch>, JsonRejection>,
) -> Result<Json<Promotion>, ApiError> {
    let Json(patch) = payload?;
    Ok(Json(
        state.db.promotions().set_active(&id, patch.is_active).await?,
    ))
}
