//! REST API module.
//!
//! One generic family of handlers serves every resource in the registry.

mod records;
mod submission;

pub use records::*;
pub use submission::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resources::ResourceConfig;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Look up a resource by its path segment.
fn resource<'a>(state: &'a AppState, name: &str) -> Result<&'a ResourceConfig, AppError> {
    state
        .resources
        .get(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown resource '{}'", name)))
}
