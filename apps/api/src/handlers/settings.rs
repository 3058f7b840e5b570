//! # Settings Handlers
//!
//! Settings are a flat string map. `POST` accepts strings, numbers and
//! booleans (`{"tax_rate": 8.25}` is stored as `"8.25"`) and returns the
//! full map afterwards.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use rxstock_core::validation::{validate_required_text, MAX_TEXT_LEN};
use rxstock_core::ValidationError;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/settings`
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    Ok(Json(state.db.settings().all().await?))
}

/// `POST /api/settings`
pub async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<BTreeMap<String, Value>>, JsonRejection>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let Json(raw) = payload?;
    let entries = to_setting_values(raw)?;

    state.db.settings().upsert_many(&entries).await?;
    info!(keys = ?entries.keys().collect::<Vec<_>>(), "Settings updated");

    Ok(Json(state.db.settings().all().await?))
}

fn to_setting_values(raw: BTreeMap<String, Value>) -> Result<BTreeMap<String, String>, ValidationError> {
    raw.into_iter()
        .map(|(key, value)| {
            validate_required_text("key", &key, MAX_TEXT_LEN)?;
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(ValidationError::InvalidFormat {
                        field: key,
                        reason: "must be a string, number or boolean".to_string(),
                    })
                }
            };
            Ok((key, text))
        })
        .collect()
}
