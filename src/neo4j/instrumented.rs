//! Logging and metrics decorator around any `GraphStore`.

use super::error::StoreResult;
use super::models::*;
use super::traits::GraphStore;
use crate::metrics::OperationMetrics;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Wraps a store, logging every call and recording it in [`OperationMetrics`]
pub struct InstrumentedStore {
    inner: Arc<dyn GraphStore>,
    metrics: Arc<OperationMetrics>,
}

impl InstrumentedStore {
    pub fn new(inner: Arc<dyn GraphStore>, metrics: Arc<OperationMetrics>) -> Self {
        Self { inner, metrics }
    }

    async fn observe<T, F>(&self, op: &'static str, subject: &str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let started = Instant::now();
        let result = fut.await;
        let elapsed = started.elapsed();
        self.metrics.record(op, elapsed, result.is_err());

        match &result {
            Ok(_) => tracing::info!(op, subject, took_us = elapsed.as_micros() as u64, "ok"),
            Err(e) => tracing::warn!(
                op,
                subject,
                took_us = elapsed.as_micros() as u64,
                "failed: {}",
                e
            ),
        }
        result
    }
}

#[async_trait]
impl GraphStore for InstrumentedStore {
    async fn health_check(&self) -> StoreResult<bool> {
        // Not recorded
        self.inner.health_check().await
    }

    async fn get_node_type(&self, id: &str) -> StoreResult<NodeType> {
        self.observe("get_node_type", id, self.inner.get_node_type(id))
            .await
    }

    async fn create_message(&self, message: &MessageNode) -> StoreResult<MessageNode> {
        let subject = format!("{} -> {}", message.from, message.to);
        self.observe("create_message", &subject, self.inner.create_message(message))
            .await
    }

    async fn get_messages(&self, a: &str, b: &str) -> StoreResult<Vec<MessageNode>> {
        let subject = format!("{} <-> {}", a, b);
        self.observe("get_messages", &subject, self.inner.get_messages(a, b))
            .await
    }

    async fn get_conversations(&self, user_id: &str) -> StoreResult<Vec<ConversationNode>> {
        self.observe(
            "get_conversations",
            user_id,
            self.inner.get_conversations(user_id),
        )
        .await
    }

    async fn get_conso(&self, id: &str) -> StoreResult<ConsoNode> {
        self.observe("get_conso", id, self.inner.get_conso(id)).await
    }

    async fn list_establishment_consos(
        &self,
        establishment_id: &str,
    ) -> StoreResult<Vec<ConsoNode>> {
        self.observe(
            "list_establishment_consos",
            establishment_id,
            self.inner.list_establishment_consos(establishment_id),
        )
        .await
    }

    async fn get_order_consos(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        self.observe(
            "get_order_consos",
            order_id,
            self.inner.get_order_consos(order_id),
        )
        .await
    }

    async fn list_preferences(&self) -> StoreResult<Vec<PreferenceNode>> {
        self.observe("list_preferences", "*", self.inner.list_preferences())
            .await
    }

    async fn get_user_preferences(&self, user_id: &str) -> StoreResult<Vec<PreferenceNode>> {
        self.observe(
            "get_user_preferences",
            user_id,
            self.inner.get_user_preferences(user_id),
        )
        .await
    }

    async fn delete_user_preferences(&self, user_id: &str) -> StoreResult<()> {
        self.observe(
            "delete_user_preferences",
            user_id,
            self.inner.delete_user_preferences(user_id),
        )
        .await
    }

    async fn add_user_preferences(
        &self,
        user_id: &str,
        preference_ids: &[String],
    ) -> StoreResult<()> {
        self.observe(
            "add_user_preferences",
            user_id,
            self.inner.add_user_preferences(user_id, preference_ids),
        )
        .await
    }

    async fn create_order(&self, order: &NewOrder) -> StoreResult<()> {
        self.observe("create_order", &order.id, self.inner.create_order(order))
            .await
    }

    async fn get_order(&self, id: &str) -> StoreResult<OrderNode> {
        self.observe("get_order", id, self.inner.get_order(id)).await
    }

    async fn get_user_orders(&self, user_id: &str) -> StoreResult<Vec<OrderNode>> {
        self.observe(
            "get_user_orders",
            user_id,
            self.inner.get_user_orders(user_id),
        )
        .await
    }
}
