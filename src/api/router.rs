//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. CORS is permissive so the browser chat
//! and the admin mood log can call it from any origin.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/mood/analyze", post(endpoints::mood::analyze))
        .route("/mood/respond", post(endpoints::mood::respond))
        .route(
            "/conversations/:participant_id",
            get(endpoints::conversations::load).post(endpoints::conversations::save),
        )
        .route(
            "/conversations/:participant_id/moods",
            get(endpoints::conversations::moods),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .fallback(endpoints::not_found)
        .layer(CorsLayer::permissive())
}
