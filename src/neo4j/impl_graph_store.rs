//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::error::StoreResult;
use super::models::*;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn health_check(&self) -> StoreResult<bool> {
        self.health_check().await
    }

    async fn get_node_type(&self, id: &str) -> StoreResult<NodeType> {
        self.get_node_type(id).await
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    async fn create_message(&self, message: &MessageNode) -> StoreResult<MessageNode> {
        self.create_message(message).await
    }

    async fn get_messages(&self, a: &str, b: &str) -> StoreResult<Vec<MessageNode>> {
        self.get_messages(a, b).await
    }

    async fn get_conversations(&self, user_id: &str) -> StoreResult<Vec<ConversationNode>> {
        self.get_conversations(user_id).await
    }

    // ========================================================================
    // Consos
    // ========================================================================

    async fn get_conso(&self, id: &str) -> StoreResult<ConsoNode> {
        self.get_conso(id).await
    }

    async fn list_establishment_consos(
        &self,
        establishment_id: &str,
    ) -> StoreResult<Vec<ConsoNode>> {
        self.list_establishment_consos(establishment_id).await
    }

    async fn get_order_consos(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        self.get_order_consos(order_id).await
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    async fn list_preferences(&self) -> StoreResult<Vec<PreferenceNode>> {
        self.list_preferences().await
    }

    async fn get_user_preferences(&self, user_id: &str) -> StoreResult<Vec<PreferenceNode>> {
        self.get_user_preferences(user_id).await
    }

    async fn delete_user_preferences(&self, user_id: &str) -> StoreResult<()> {
        self.delete_user_preferences(user_id).await
    }

    async fn add_user_preferences(
        &self,
        user_id: &str,
        preference_ids: &[String],
    ) -> StoreResult<()> {
        self.add_user_preferences(user_id, preference_ids).await
    }

    // ========================================================================
    // Orders
    // ========================================================================

    async fn create_order(&self, order: &NewOrder) -> StoreResult<()> {
        self.create_order(order).await
    }

    async fn get_order(&self, id: &str) -> StoreResult<OrderNode> {
        self.get_order(id).await
    }

    async fn get_user_orders(&self, user_id: &str) -> StoreResult<Vec<OrderNode>> {
        self.get_user_orders(user_id).await
    }
}
