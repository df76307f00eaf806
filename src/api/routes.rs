//! API route definitions

use super::conso_handlers;
use super::handlers::{self, SoireeState};
use super::message_handlers;
use super::order_handlers;
use super::preference_handlers;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: SoireeState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check / metrics
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // ====================================================================
        // Messaging
        // ====================================================================
        .route("/messages", post(message_handlers::create_message))
        .route(
            "/messages/{from}/{to}",
            get(message_handlers::get_messages),
        )
        .route(
            "/conversations/{user_id}",
            get(message_handlers::get_conversations),
        )
        .route(
            "/node_type/{node_id}",
            get(message_handlers::get_node_type),
        )
        // ====================================================================
        // Consos
        // ====================================================================
        .route("/consos/get_conso/{id}", get(conso_handlers::get_conso))
        .route(
            "/establishments/{establishment_id}/consos",
            get(conso_handlers::list_establishment_consos),
        )
        .route(
            "/orders/{order_id}/conso",
            get(conso_handlers::get_order_consos),
        )
        // ====================================================================
        // Preferences
        // ====================================================================
        .route("/preferences", get(preference_handlers::list_preferences))
        .route(
            "/users/{user_id}/preferences",
            get(preference_handlers::get_user_preferences)
                .post(preference_handlers::update_user_preferences),
        )
        // ====================================================================
        // Orders
        // ====================================================================
        .route("/orders", post(order_handlers::create_order))
        .route("/userOrder", get(order_handlers::get_user_orders))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
