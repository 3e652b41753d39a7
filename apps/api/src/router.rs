use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use booking_cell::router::booking_routes;
use catalog_cell::router::catalog_routes;
use provider_cell::router::provider_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Scheduling API is running!" }))
        .nest("/providers", provider_routes(state.clone()))
        .nest("/services", catalog_routes(state.clone()))
        .nest("/appointments", booking_routes(state.clone()))
}
