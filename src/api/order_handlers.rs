//! Order handlers

use super::envelope::Envelope;
use super::handlers::SoireeState;
use crate::neo4j::models::OrderNode;
use crate::service::CreateOrderRequest;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

/// Query parameters for `GET /userOrder`
#[derive(Debug, Deserialize)]
pub struct UserOrderQuery {
    #[serde(default)]
    pub user_id: String,
}

/// Place an order
pub async fn create_order(
    State(state): State<SoireeState>,
    Json(req): Json<CreateOrderRequest>,
) -> Envelope<OrderNode> {
    Envelope::from_result("order", state.service.create_order(req).await)
}

/// Orders of a user
pub async fn get_user_orders(
    State(state): State<SoireeState>,
    Query(query): Query<UserOrderQuery>,
) -> Envelope<Vec<OrderNode>> {
    Envelope::from_result(
        "orders",
        state.service.get_user_orders(&query.user_id).await,
    )
}
