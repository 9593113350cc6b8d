//! API endpoint handlers.

pub mod conversations;
pub mod health;
pub mod mood;

use axum::extract::OriginalUri;

use crate::api::error::ApiError;

/// Fallback for unmatched paths: the structured 404 body every other
/// error uses.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
