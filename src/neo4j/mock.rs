//! In-memory mock implementation of GraphStore for testing.
//!
//! Mirrors the Cypher semantics of `Neo4jClient` (missing matches yield
//! empty results, MERGE collapses duplicates) using
//! `tokio::sync::RwLock<HashMap<K, V>>` collections.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::neo4j::error::{StoreError, StoreResult};
use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// An order as stored, lines resolved at read time
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub user_id: String,
    pub establishment_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    // Every node id with its type
    pub nodes: RwLock<HashMap<String, NodeType>>,

    // Entity stores
    pub consos: RwLock<HashMap<String, ConsoNode>>,
    pub preferences: RwLock<HashMap<String, PreferenceNode>>,
    pub messages: RwLock<Vec<MessageNode>>,
    pub orders: RwLock<HashMap<String, StoredOrder>>,

    // Relationships (adjacency lists)
    pub establishment_consos: RwLock<HashMap<String, Vec<String>>>,
    pub group_members: RwLock<HashMap<String, Vec<String>>>,
    pub user_likes: RwLock<HashMap<String, Vec<String>>>,

    /// When set, every operation fails as if the pool were exhausted
    pub unavailable: AtomicBool,
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            consos: RwLock::new(HashMap::new()),
            preferences: RwLock::new(HashMap::new()),
            messages: RwLock::new(Vec::new()),
            orders: RwLock::new(HashMap::new()),
            establishment_consos: RwLock::new(HashMap::new()),
            group_members: RwLock::new(HashMap::new()),
            user_likes: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed a user node.
    pub async fn with_user(self, id: &str) -> Self {
        self.nodes.write().await.insert(id.to_string(), NodeType::User);
        self
    }

    /// Seed a group node and its members.
    pub async fn with_group(self, id: &str, members: &[&str]) -> Self {
        self.nodes
            .write()
            .await
            .insert(id.to_string(), NodeType::Group);
        self.group_members.write().await.insert(
            id.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    /// Seed an establishment node.
    pub async fn with_establishment(self, id: &str) -> Self {
        self.nodes
            .write()
            .await
            .insert(id.to_string(), NodeType::Establishment);
        self
    }

    /// Seed a conso sold by an establishment (the establishment is created too).
    pub async fn with_conso(self, establishment_id: &str, conso: ConsoNode) -> Self {
        {
            let mut nodes = self.nodes.write().await;
            nodes.insert(establishment_id.to_string(), NodeType::Establishment);
            nodes.insert(conso.id.clone(), NodeType::Conso);
        }
        self.establishment_consos
            .write()
            .await
            .entry(establishment_id.to_string())
            .or_default()
            .push(conso.id.clone());
        self.consos.write().await.insert(conso.id.clone(), conso);
        self
    }

    /// Seed an establishment type users can like.
    pub async fn with_preference(self, preference: PreferenceNode) -> Self {
        self.nodes
            .write()
            .await
            .insert(preference.id.clone(), NodeType::EstablishmentType);
        self.preferences
            .write()
            .await
            .insert(preference.id.clone(), preference);
        self
    }

    /// Seed an existing message.
    pub async fn with_message(self, message: MessageNode) -> Self {
        self.nodes
            .write()
            .await
            .insert(message.id.clone(), NodeType::Message);
        self.messages.write().await.push(message);
        self
    }

    /// Seed a node with a label this service does not model.
    pub async fn with_node(self, id: &str, node_type: NodeType) -> Self {
        self.nodes.write().await.insert(id.to_string(), node_type);
        self
    }

    /// Make every subsequent operation fail.
    pub fn with_pool_exhausted(self) -> Self {
        self.unavailable.store(true, Ordering::SeqCst);
        self
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::ConnectionUnavailable {
                waited: Duration::from_secs(5),
            })
        } else {
            Ok(())
        }
    }

    async fn node_is(&self, id: &str, node_type: NodeType) -> bool {
        self.nodes.read().await.get(id) == Some(&node_type)
    }

    async fn lines_for(&self, items: &[OrderItem]) -> Vec<OrderLine> {
        let consos = self.consos.read().await;
        let mut lines: Vec<OrderLine> = items
            .iter()
            .filter_map(|item| {
                consos.get(&item.conso_id).map(|c| OrderLine {
                    conso: c.clone(),
                    quantity: item.quantity,
                })
            })
            .collect();
        lines.sort_by(|a, b| a.conso.name.cmp(&b.conso.name));
        lines
    }

    async fn to_order_node(&self, id: &str, stored: &StoredOrder) -> OrderNode {
        let lines = self.lines_for(&stored.items).await;
        let total_price = OrderNode::compute_total(&lines);
        OrderNode {
            id: id.to_string(),
            user_id: stored.user_id.clone(),
            establishment_id: stored.establishment_id.clone(),
            status: stored.status,
            created_at: stored.created_at,
            lines,
            total_price,
        }
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }

    async fn get_node_type(&self, id: &str) -> StoreResult<NodeType> {
        self.check_available()?;
        self.nodes
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("node", id))
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    async fn create_message(&self, message: &MessageNode) -> StoreResult<MessageNode> {
        self.check_available()?;
        let sender_ok = self.node_is(&message.from, NodeType::User).await;
        let recipient_ok = self.node_is(&message.to, NodeType::User).await
            || self.node_is(&message.to, NodeType::Group).await;
        if !sender_ok || !recipient_ok {
            return Err(StoreError::not_found(
                "sender or recipient",
                format!("{} -> {}", message.from, message.to),
            ));
        }

        self.nodes
            .write()
            .await
            .insert(message.id.clone(), NodeType::Message);
        self.messages.write().await.push(message.clone());
        Ok(message.clone())
    }

    async fn get_messages(&self, a: &str, b: &str) -> StoreResult<Vec<MessageNode>> {
        self.check_available()?;
        let b_is_group = self.node_is(b, NodeType::Group).await;
        let mut found: Vec<MessageNode> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| {
                (m.from == a && m.to == b)
                    || (m.from == b && m.to == a)
                    || (b_is_group && m.to == b)
            })
            .cloned()
            .collect();
        found.sort_by_key(|m| m.date);
        Ok(found)
    }

    async fn get_conversations(&self, user_id: &str) -> StoreResult<Vec<ConversationNode>> {
        self.check_available()?;
        if !self.node_is(user_id, NodeType::User).await {
            return Ok(vec![]);
        }

        let groups: HashSet<String> = self
            .group_members
            .read()
            .await
            .iter()
            .filter(|(_, members)| members.iter().any(|m| m == user_id))
            .map(|(g, _)| g.clone())
            .collect();

        // counterpart -> (message ids, last date)
        let mut per_counterpart: HashMap<String, (HashSet<String>, DateTime<Utc>)> =
            HashMap::new();
        for m in self.messages.read().await.iter() {
            let counterpart = if m.from == user_id || groups.contains(&m.to) {
                Some(m.to.clone())
            } else if m.to == user_id {
                Some(m.from.clone())
            } else {
                None
            };
            if let Some(counterpart) = counterpart {
                let entry = per_counterpart
                    .entry(counterpart)
                    .or_insert_with(|| (HashSet::new(), m.date));
                entry.0.insert(m.id.clone());
                if m.date > entry.1 {
                    entry.1 = m.date;
                }
            }
        }

        let nodes = self.nodes.read().await;
        let mut conversations: Vec<ConversationNode> = per_counterpart
            .into_iter()
            .filter_map(|(recipient_id, (ids, last))| {
                let kind = nodes
                    .get(&recipient_id)
                    .and_then(RecipientKind::from_node_type)?;
                Some(ConversationNode {
                    id: conversation_id(user_id, &recipient_id, kind),
                    message_count: ids.len() as i64,
                    recipient_id,
                    recipient_type: kind,
                    last_message_at: Some(last),
                })
            })
            .collect();
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(conversations)
    }

    // ========================================================================
    // Consos
    // ========================================================================

    async fn get_conso(&self, id: &str) -> StoreResult<ConsoNode> {
        self.check_available()?;
        self.consos
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("conso", id))
    }

    async fn list_establishment_consos(
        &self,
        establishment_id: &str,
    ) -> StoreResult<Vec<ConsoNode>> {
        self.check_available()?;
        let ids = self
            .establishment_consos
            .read()
            .await
            .get(establishment_id)
            .cloned()
            .unwrap_or_default();
        let consos = self.consos.read().await;
        let mut result: Vec<ConsoNode> = ids
            .iter()
            .filter_map(|id| consos.get(id).cloned())
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn get_order_consos(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        self.check_available()?;
        let items = match self.orders.read().await.get(order_id) {
            Some(order) => order.items.clone(),
            None => return Ok(vec![]),
        };
        Ok(self.lines_for(&items).await)
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    async fn list_preferences(&self) -> StoreResult<Vec<PreferenceNode>> {
        self.check_available()?;
        let mut all: Vec<PreferenceNode> =
            self.preferences.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn get_user_preferences(&self, user_id: &str) -> StoreResult<Vec<PreferenceNode>> {
        self.check_available()?;
        let liked = self
            .user_likes
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        let preferences = self.preferences.read().await;
        let mut result: Vec<PreferenceNode> = liked
            .iter()
            .filter_map(|id| preferences.get(id).cloned())
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn delete_user_preferences(&self, user_id: &str) -> StoreResult<()> {
        self.check_available()?;
        self.user_likes.write().await.remove(user_id);
        Ok(())
    }

    async fn add_user_preferences(
        &self,
        user_id: &str,
        preference_ids: &[String],
    ) -> StoreResult<()> {
        self.check_available()?;
        if !self.node_is(user_id, NodeType::User).await {
            return Ok(());
        }
        let preferences = self.preferences.read().await;
        let mut likes = self.user_likes.write().await;
        let liked = likes.entry(user_id.to_string()).or_default();
        for id in preference_ids {
            if preferences.contains_key(id) && !liked.contains(id) {
                liked.push(id.clone());
            }
        }
        Ok(())
    }

    // ========================================================================
    // Orders
    // ========================================================================

    async fn create_order(&self, order: &NewOrder) -> StoreResult<()> {
        self.check_available()?;
        let user_ok = self.node_is(&order.user_id, NodeType::User).await;
        let establishment_ok = self
            .node_is(&order.establishment_id, NodeType::Establishment)
            .await;
        if !user_ok || !establishment_ok {
            return Err(StoreError::not_found(
                "user or establishment",
                format!("{} @ {}", order.user_id, order.establishment_id),
            ));
        }

        let sold = self
            .establishment_consos
            .read()
            .await
            .get(&order.establishment_id)
            .cloned()
            .unwrap_or_default();
        let items = order
            .items
            .iter()
            .filter(|i| sold.contains(&i.conso_id))
            .cloned()
            .collect();

        self.nodes
            .write()
            .await
            .insert(order.id.clone(), NodeType::Order);
        self.orders.write().await.insert(
            order.id.clone(),
            StoredOrder {
                user_id: order.user_id.clone(),
                establishment_id: order.establishment_id.clone(),
                status: OrderStatus::Pending,
                created_at: order.created_at,
                items,
            },
        );
        Ok(())
    }

    async fn get_order(&self, id: &str) -> StoreResult<OrderNode> {
        self.check_available()?;
        let stored = self
            .orders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("order", id))?;
        Ok(self.to_order_node(id, &stored).await)
    }

    async fn get_user_orders(&self, user_id: &str) -> StoreResult<Vec<OrderNode>> {
        self.check_available()?;
        let stored: Vec<(String, StoredOrder)> = self
            .orders
            .read()
            .await
            .iter()
            .filter(|(_, o)| o.user_id == user_id)
            .map(|(id, o)| (id.clone(), o.clone()))
            .collect();

        let mut orders = Vec::with_capacity(stored.len());
        for (id, order) in &stored {
            orders.push(self.to_order_node(id, order).await);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
