//! Test helper factories and mock state builders
//!
//! Provides convenience functions for creating test objects with sensible defaults,
//! and helpers for building mock AppState / routers over the in-memory store.
#![allow(dead_code)]

use crate::api::create_router;
use crate::metrics::OperationMetrics;
use crate::neo4j::mock::MockGraphStore;
use crate::neo4j::models::*;
use crate::neo4j::InstrumentedStore;
use crate::{AppState, Config};
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;

// ============================================================================
// Mock state builders
// ============================================================================

fn mock_config() -> Config {
    Config {
        neo4j_uri: "bolt://mock:7687".to_string(),
        neo4j_user: "neo4j".to_string(),
        neo4j_password: "mock".to_string(),
        neo4j_max_connections: 4,
        neo4j_acquire_timeout_secs: 1,
        server_port: 0,
    }
}

/// Create a mock AppState over a pre-seeded store
pub fn mock_app_state(graph: MockGraphStore) -> AppState {
    let metrics = Arc::new(OperationMetrics::new());
    AppState {
        neo4j: Arc::new(InstrumentedStore::new(Arc::new(graph), metrics.clone())),
        metrics,
        config: Arc::new(mock_config()),
    }
}

/// Full router over a pre-seeded store, wired like the real server
pub fn test_router(graph: MockGraphStore) -> Router {
    create_router(mock_app_state(graph).server_state())
}

// ============================================================================
// Request / response helpers
// ============================================================================

/// GET request with an empty body
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// POST request with a JSON body
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON
pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Entity factories
// ============================================================================

/// Create a test conso
pub fn test_conso(id: &str, name: &str, price: f64) -> ConsoNode {
    ConsoNode {
        id: id.to_string(),
        name: name.to_string(),
        price,
        description: None,
        picture: None,
    }
}

/// Create a test preference (establishment type)
pub fn test_preference(id: &str, name: &str) -> PreferenceNode {
    PreferenceNode {
        id: id.to_string(),
        name: name.to_string(),
    }
}
