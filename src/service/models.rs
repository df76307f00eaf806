//! Request bodies accepted by the service

use crate::neo4j::models::OrderItem;
use serde::{Deserialize, Serialize};

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub from: String,
    pub to: String,
    pub text: String,
}

/// Request to replace a user's preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePreferencesRequest {
    /// Establishment type ids; an empty list clears the preferences
    #[serde(default)]
    pub preferences: Vec<String>,
}

/// Request to place an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub establishment_id: String,
    pub items: Vec<OrderItem>,
}
