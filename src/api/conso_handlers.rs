//! Conso (menu item) handlers

use super::envelope::Envelope;
use super::handlers::SoireeState;
use crate::neo4j::models::{ConsoNode, OrderLine};
use axum::extract::{Path, State};

/// Get a conso by ID
pub async fn get_conso(
    State(state): State<SoireeState>,
    Path(id): Path<String>,
) -> Envelope<ConsoNode> {
    Envelope::from_result("conso", state.service.get_conso(&id).await)
}

/// Consos sold by an establishment
pub async fn list_establishment_consos(
    State(state): State<SoireeState>,
    Path(establishment_id): Path<String>,
) -> Envelope<Vec<ConsoNode>> {
    Envelope::from_result(
        "consos",
        state
            .service
            .list_establishment_consos(&establishment_id)
            .await,
    )
}

/// Consos contained in an order
pub async fn get_order_consos(
    State(state): State<SoireeState>,
    Path(order_id): Path<String>,
) -> Envelope<Vec<OrderLine>> {
    Envelope::from_result("lines", state.service.get_order_consos(&order_id).await)
}
