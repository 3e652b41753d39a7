// libs/provider-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::admin_middleware;

use crate::handlers;

pub fn provider_routes(state: Arc<AppConfig>) -> Router {
    // Customer-facing reads
    let public_routes = Router::new()
        .route("/", get(handlers::list_providers))
        .route("/{provider_id}", get(handlers::get_provider))
        .route("/{provider_id}/hours", get(handlers::get_weekly_hours));

    // Schedule management requires the admin key
    let admin_routes = Router::new()
        .route("/", post(handlers::create_provider))
        .route("/{provider_id}", put(handlers::update_provider))
        .route("/{provider_id}/deactivate", post(handlers::deactivate_provider))
        .route("/{provider_id}/hours", put(handlers::upsert_hours))
        .route("/{provider_id}/time-off", get(handlers::list_time_off))
        .route("/{provider_id}/time-off", post(handlers::create_time_off))
        .route("/{provider_id}/time-off/{time_off_id}", delete(handlers::delete_time_off))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
