//! Messaging, menu, preference and order operations

use super::models::*;
use crate::neo4j::error::{StoreError, StoreResult};
use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use chrono::{SubsecRound, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Service for every operation exposed over HTTP
#[derive(Clone)]
pub struct SoireeService {
    store: Arc<dyn GraphStore>,
}

fn require_id(kind: &str, id: &str) -> StoreResult<()> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidInput(format!("{} id is required", kind)));
    }
    Ok(())
}

impl SoireeService {
    /// Create a new service over a graph store
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub async fn health_check(&self) -> StoreResult<bool> {
        self.store.health_check().await
    }

    /// Resolve the type of a node
    pub async fn get_node_type(&self, id: &str) -> StoreResult<NodeType> {
        require_id("node", id)?;
        self.store.get_node_type(id).await
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    /// Send a message. The text is stored verbatim; the date is set here.
    pub async fn create_message(&self, req: CreateMessageRequest) -> StoreResult<MessageNode> {
        require_id("sender", &req.from)?;
        require_id("recipient", &req.to)?;
        if req.from == req.to {
            return Err(StoreError::InvalidInput(
                "cannot send a message to yourself".into(),
            ));
        }
        if req.text.trim().is_empty() {
            return Err(StoreError::InvalidInput("message text is empty".into()));
        }

        let message = MessageNode {
            id: Uuid::new_v4().to_string(),
            from: req.from,
            to: req.to,
            // Stored with second precision
            date: Utc::now().trunc_subsecs(0),
            text: req.text,
        };
        self.store.create_message(&message).await
    }

    /// Messages between two users, or sent to a group
    pub async fn get_messages(&self, from: &str, to: &str) -> StoreResult<Vec<MessageNode>> {
        require_id("sender", from)?;
        require_id("recipient", to)?;
        self.store.get_messages(from, to).await
    }

    /// Conversations a user takes part in
    pub async fn get_conversations(&self, user_id: &str) -> StoreResult<Vec<ConversationNode>> {
        require_id("user", user_id)?;
        self.store.get_conversations(user_id).await
    }

    // ========================================================================
    // Consos
    // ========================================================================

    pub async fn get_conso(&self, id: &str) -> StoreResult<ConsoNode> {
        require_id("conso", id)?;
        self.store.get_conso(id).await
    }

    pub async fn list_establishment_consos(
        &self,
        establishment_id: &str,
    ) -> StoreResult<Vec<ConsoNode>> {
        require_id("establishment", establishment_id)?;
        self.store.list_establishment_consos(establishment_id).await
    }

    pub async fn get_order_consos(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        require_id("order", order_id)?;
        self.store.get_order_consos(order_id).await
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    pub async fn list_preferences(&self) -> StoreResult<Vec<PreferenceNode>> {
        self.store.list_preferences().await
    }

    pub async fn get_user_preferences(&self, user_id: &str) -> StoreResult<Vec<PreferenceNode>> {
        require_id("user", user_id)?;
        self.store.get_user_preferences(user_id).await
    }

    /// Replace a user's preferences and return the new list.
    ///
    /// Runs as two independent queries (delete, then create) without a
    /// transaction: a concurrent reader can observe the empty intermediate
    /// state, and two concurrent updates of the same user can interleave
    /// and leave the union of both lists.
    pub async fn update_user_preferences(
        &self,
        user_id: &str,
        req: UpdatePreferencesRequest,
    ) -> StoreResult<Vec<PreferenceNode>> {
        require_id("user", user_id)?;

        let mut ids: Vec<String> = Vec::with_capacity(req.preferences.len());
        for id in req.preferences {
            require_id("preference", &id)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        self.store.delete_user_preferences(user_id).await?;
        self.store.add_user_preferences(user_id, &ids).await?;
        self.store.get_user_preferences(user_id).await
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Place an order at an establishment.
    ///
    /// Every conso must be sold by the establishment. Repeated consos are
    /// merged into one line with the summed quantity.
    pub async fn create_order(&self, req: CreateOrderRequest) -> StoreResult<OrderNode> {
        require_id("user", &req.user_id)?;
        require_id("establishment", &req.establishment_id)?;
        if req.items.is_empty() {
            return Err(StoreError::InvalidInput("order has no items".into()));
        }

        let mut merged: Vec<OrderItem> = Vec::with_capacity(req.items.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for item in req.items {
            require_id("conso", &item.conso_id)?;
            if item.quantity <= 0 {
                return Err(StoreError::InvalidInput(format!(
                    "quantity for conso {} must be positive",
                    item.conso_id
                )));
            }
            match positions.get(&item.conso_id) {
                Some(&pos) => {
                    merged[pos].quantity = merged[pos]
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or_else(|| {
                            StoreError::InvalidInput(format!(
                                "quantity for conso {} is too large",
                                item.conso_id
                            ))
                        })?;
                }
                None => {
                    positions.insert(item.conso_id.clone(), merged.len());
                    merged.push(item);
                }
            }
        }

        let sold = self
            .store
            .list_establishment_consos(&req.establishment_id)
            .await?;
        if let Some(missing) = merged
            .iter()
            .find(|item| !sold.iter().any(|c| c.id == item.conso_id))
        {
            return Err(StoreError::InvalidInput(format!(
                "conso {} is not sold by establishment {}",
                missing.conso_id, req.establishment_id
            )));
        }

        let order = NewOrder {
            id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            establishment_id: req.establishment_id,
            created_at: Utc::now().trunc_subsecs(0),
            items: merged,
        };
        self.store.create_order(&order).await?;

        tracing::info!(
            "Order {} created for {} at {}",
            order.id,
            order.user_id,
            order.establishment_id
        );
        self.store.get_order(&order.id).await
    }

    /// Orders placed by a user
    pub async fn get_user_orders(&self, user_id: &str) -> StoreResult<Vec<OrderNode>> {
        require_id("user", user_id)?;
        self.store.get_user_orders(user_id).await
    }
}
