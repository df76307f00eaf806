//! Typed HTTP client for the soiree API
//!
//! Each method issues one request and unwraps the `{ <key>: payload, err }`
//! envelope: a non-empty `err` becomes [`ClientError::Remote`], a null
//! payload becomes [`ClientError::MissingPayload`].

use crate::neo4j::models::{
    ConsoNode, ConversationNode, MessageNode, NodeType, OrderLine, OrderNode, PreferenceNode,
};
use crate::service::{CreateMessageRequest, CreateOrderRequest, UpdatePreferencesRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Remote(String),

    #[error("response has no `{0}` payload")]
    MissingPayload(&'static str),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// HTTP client for a running soiree server
#[derive(Clone)]
pub struct SoireeClient {
    http: reqwest::Client,
    base_url: String,
}

impl SoireeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing reqwest client (timeouts, proxies, ...)
    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &'static str,
    ) -> ClientResult<T> {
        tracing::debug!("GET {}", path);
        let resp = self.http.get(self.url(path)).send().await?;
        let body: Value = resp.json().await?;
        unwrap_envelope(body, key)
    }

    async fn post_envelope<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        key: &'static str,
    ) -> ClientResult<T> {
        tracing::debug!("POST {}", path);
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        let body: Value = resp.json().await?;
        unwrap_envelope(body, key)
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    pub async fn create_message(&self, req: &CreateMessageRequest) -> ClientResult<MessageNode> {
        self.post_envelope("/messages", req, "message").await
    }

    pub async fn get_messages(&self, from: &str, to: &str) -> ClientResult<Vec<MessageNode>> {
        self.get_envelope(
            &format!("/messages/{}/{}", segment(from), segment(to)),
            "messages",
        )
        .await
    }

    pub async fn get_conversations(&self, user_id: &str) -> ClientResult<Vec<ConversationNode>> {
        self.get_envelope(
            &format!("/conversations/{}", segment(user_id)),
            "conversations",
        )
        .await
    }

    pub async fn get_node_type(&self, node_id: &str) -> ClientResult<NodeType> {
        self.get_envelope(&format!("/node_type/{}", segment(node_id)), "node_type")
            .await
    }

    // ========================================================================
    // Consos
    // ========================================================================

    pub async fn get_conso(&self, id: &str) -> ClientResult<ConsoNode> {
        self.get_envelope(&format!("/consos/get_conso/{}", segment(id)), "conso")
            .await
    }

    pub async fn list_establishment_consos(
        &self,
        establishment_id: &str,
    ) -> ClientResult<Vec<ConsoNode>> {
        self.get_envelope(
            &format!("/establishments/{}/consos", segment(establishment_id)),
            "consos",
        )
        .await
    }

    pub async fn get_order_consos(&self, order_id: &str) -> ClientResult<Vec<OrderLine>> {
        self.get_envelope(&format!("/orders/{}/conso", segment(order_id)), "lines")
            .await
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    pub async fn list_preferences(&self) -> ClientResult<Vec<PreferenceNode>> {
        self.get_envelope("/preferences", "preferences").await
    }

    pub async fn get_user_preferences(&self, user_id: &str) -> ClientResult<Vec<PreferenceNode>> {
        self.get_envelope(
            &format!("/users/{}/preferences", segment(user_id)),
            "preferences",
        )
        .await
    }

    pub async fn update_user_preferences(
        &self,
        user_id: &str,
        preferences: Vec<String>,
    ) -> ClientResult<Vec<PreferenceNode>> {
        self.post_envelope(
            &format!("/users/{}/preferences", segment(user_id)),
            &UpdatePreferencesRequest { preferences },
            "preferences",
        )
        .await
    }

    // ========================================================================
    // Orders
    // ========================================================================

    pub async fn create_order(&self, req: &CreateOrderRequest) -> ClientResult<OrderNode> {
        self.post_envelope("/orders", req, "order").await
    }

    pub async fn get_user_orders(&self, user_id: &str) -> ClientResult<Vec<OrderNode>> {
        tracing::debug!("GET /userOrder?user_id={}", user_id);
        let resp = self
            .http
            .get(self.url("/userOrder"))
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        let body: Value = resp.json().await?;
        unwrap_envelope(body, "orders")
    }

    // ========================================================================
    // Operational
    // ========================================================================

    /// True when the server reports a reachable database
    pub async fn health(&self) -> ClientResult<bool> {
        let resp = self.http.get(self.url("/health")).send().await?;
        Ok(resp.status().is_success())
    }
}

/// Percent-encode one path segment
fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

fn unwrap_envelope<T: DeserializeOwned>(mut body: Value, key: &'static str) -> ClientResult<T> {
    if let Some(err) = body.get("err").and_then(Value::as_str) {
        if !err.is_empty() {
            return Err(ClientError::Remote(err.to_string()));
        }
    }
    match body.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Err(ClientError::MissingPayload(key)),
        Some(payload) => Ok(serde_json::from_value(payload)?),
    }
}
