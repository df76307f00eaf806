//! Preference handlers

use super::envelope::Envelope;
use super::handlers::SoireeState;
use crate::neo4j::models::PreferenceNode;
use crate::service::UpdatePreferencesRequest;
use axum::{
    extract::{Path, State},
    Json,
};

/// All establishment types
pub async fn list_preferences(State(state): State<SoireeState>) -> Envelope<Vec<PreferenceNode>> {
    Envelope::from_result("preferences", state.service.list_preferences().await)
}

/// Preferences of a user
pub async fn get_user_preferences(
    State(state): State<SoireeState>,
    Path(user_id): Path<String>,
) -> Envelope<Vec<PreferenceNode>> {
    Envelope::from_result(
        "preferences",
        state.service.get_user_preferences(&user_id).await,
    )
}

/// Replace the preferences of a user
pub async fn update_user_preferences(
    State(state): State<SoireeState>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Envelope<Vec<PreferenceNode>> {
    Envelope::from_result(
        "preferences",
        state.service.update_user_preferences(&user_id, req).await,
    )
}
