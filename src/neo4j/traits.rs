//! GraphStore trait definition
//!
//! Defines the abstract interface for all graph operations.
//! This trait mirrors the public async methods of `Neo4jClient`,
//! enabling testing with mock implementations and decorators
//! such as `InstrumentedStore`.

use super::error::StoreResult;
use super::models::*;
use async_trait::async_trait;

/// Abstract interface for all graph database operations.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Health
    // ========================================================================

    /// Check connectivity to the database
    async fn health_check(&self) -> StoreResult<bool>;

    // ========================================================================
    // Node lookup
    // ========================================================================

    /// Resolve the type of any node by its id
    async fn get_node_type(&self, id: &str) -> StoreResult<NodeType>;

    // ========================================================================
    // Messaging
    // ========================================================================

    /// Create a message from `from` to `to`, stamped with `message.date`
    async fn create_message(&self, message: &MessageNode) -> StoreResult<MessageNode>;

    /// Messages exchanged between two users, or sent to group `b`, oldest first
    async fn get_messages(&self, a: &str, b: &str) -> StoreResult<Vec<MessageNode>>;

    /// Conversations a user takes part in, most recent first
    async fn get_conversations(&self, user_id: &str) -> StoreResult<Vec<ConversationNode>>;

    // ========================================================================
    // Consos
    // ========================================================================

    /// Get a conso by ID
    async fn get_conso(&self, id: &str) -> StoreResult<ConsoNode>;

    /// Consos sold by an establishment, by name
    async fn list_establishment_consos(&self, establishment_id: &str)
        -> StoreResult<Vec<ConsoNode>>;

    /// Consos contained in an order, with quantities
    async fn get_order_consos(&self, order_id: &str) -> StoreResult<Vec<OrderLine>>;

    // ========================================================================
    // Preferences
    // ========================================================================

    /// All establishment types a user can pick from
    async fn list_preferences(&self) -> StoreResult<Vec<PreferenceNode>>;

    /// Establishment types a user likes
    async fn get_user_preferences(&self, user_id: &str) -> StoreResult<Vec<PreferenceNode>>;

    /// Remove every LIKES edge of a user
    async fn delete_user_preferences(&self, user_id: &str) -> StoreResult<()>;

    /// Link a user to the given establishment types (duplicates collapse)
    async fn add_user_preferences(&self, user_id: &str, preference_ids: &[String])
        -> StoreResult<()>;

    // ========================================================================
    // Orders
    // ========================================================================

    /// Write a new order with its lines
    async fn create_order(&self, order: &NewOrder) -> StoreResult<()>;

    /// Get an order with its lines
    async fn get_order(&self, id: &str) -> StoreResult<OrderNode>;

    /// Orders placed by a user, most recent first
    async fn get_user_orders(&self, user_id: &str) -> StoreResult<Vec<OrderNode>>;
}
