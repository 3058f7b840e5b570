//! # REST Handlers
//!
//! One module per resource. Handlers stay thin:
//!
//! ```text
//! request ──► decode (Json / Query) ──► validate (rxstock_core::validation)
//!                                            │
//!                                            ▼
//!                         repository or service (rxstock_db)
//!                                            │
//!                                            ▼
//!                         Json<T>  or  ApiError → status + JSON body
//! ```
//!
//! The acting user comes from the `X-User-Name` header. Authentication
//! happens in front of this service; a missing header means `anonymous`.

pub mod health;
pub mod products;
pub mod promotions;
pub mod sales;
pub mod settings;
pub mod suppliers;

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::HeaderMap;
use rxstock_core::{ANONYMOUS_USER, DEFAULT_LIST_LIMIT};
use serde::Deserialize;

use crate::error::ApiError;

/// Header carrying the acting user's name.
pub const USER_HEADER: &str = "x-user-name";

/// Upper bound for `?limit=`.
pub const MAX_LIST_LIMIT: u32 = 500;

/// Name of the user making the request.
pub fn acting_user(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_USER)
        .to_string()
}

/// `?limit=N` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn from_query(query: Result<Query<ListParams>, QueryRejection>) -> Result<u32, ApiError> {
        let Query(params) = query?;
        Ok(params
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_acting_user() {
        let mut headers = HeaderMap::new();
        assert_eq!(acting_user(&headers), "anonymous");

        headers.insert(USER_HEADER, HeaderValue::from_static("  "));
        assert_eq!(acting_user(&headers), "anonymous");

        headers.insert(USER_HEADER, HeaderValue::from_static("  dana "));
        assert_eq!(acting_user(&headers), "dana");
    }

    #[test]
    fn test_list_limit_is_clamped() {
        let limit = |limit| ListParams::from_query(Ok(Query(ListParams { limit }))).unwrap();
        assert_eq!(limit(None), DEFAULT_LIST_LIMIT);
        assert_eq!(limit(Some(0)), 1);
        assert_eq!(limit(Some(10_000)), MAX_LIST_LIMIT);
    }
}
