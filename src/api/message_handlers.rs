//! Message, conversation and node-type handlers

use super::envelope::Envelope;
use super::handlers::SoireeState;
use crate::neo4j::models::{ConversationNode, MessageNode, NodeType};
use crate::service::CreateMessageRequest;
use axum::{
    extract::{Path, State},
    Json,
};

/// Send a message
pub async fn create_message(
    State(state): State<SoireeState>,
    Json(req): Json<CreateMessageRequest>,
) -> Envelope<MessageNode> {
    Envelope::from_result("message", state.service.create_message(req).await)
}

/// Messages exchanged between two users, or sent to a group
pub async fn get_messages(
    State(state): State<SoireeState>,
    Path((from, to)): Path<(String, String)>,
) -> Envelope<Vec<MessageNode>> {
    Envelope::from_result("messages", state.service.get_messages(&from, &to).await)
}

/// Conversations of a user
pub async fn get_conversations(
    State(state): State<SoireeState>,
    Path(user_id): Path<String>,
) -> Envelope<Vec<ConversationNode>> {
    Envelope::from_result(
        "conversations",
        state.service.get_conversations(&user_id).await,
    )
}

/// Type of any node
pub async fn get_node_type(
    State(state): State<SoireeState>,
    Path(node_id): Path<String>,
) -> Envelope<NodeType> {
    Envelope::from_result("node_type", state.service.get_node_type(&node_id).await)
}

#[cfg(test)]
mod tests {
    use crate::neo4j::mock::MockGraphStore;
    use crate::neo4j::models::NodeType;
    use crate::test_helpers::{body_json, get, post_json, test_router};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    async fn store() -> MockGraphStore {
        MockGraphStore::new()
            .with_user("alice")
            .await
            .with_user("bob")
            .await
            .with_group("crew", &["alice", "bob"])
            .await
    }

    #[tokio::test]
    async fn test_post_then_get_messages() {
        let app = test_router(store().await);

        let resp = app
            .clone()
            .oneshot(post_json(
                "/messages",
                json!({"from": "alice", "to": "bob", "text": "Ce soir ?"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert!(body.get("err").is_none());
        assert_eq!(body["message"]["from"], "alice");
        assert_eq!(body["message"]["text"], "Ce soir ?");

        let resp = app.oneshot(get("/messages/bob/alice")).await.unwrap();
        let body = body_json(resp).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["to"], "bob");
    }

    #[tokio::test]
    async fn test_post_message_error_in_envelope() {
        let app = test_router(store().await);
        let resp = app
            .oneshot(post_json(
                "/messages",
                json!({"from": "alice", "to": "bob", "text": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert!(body["message"].is_null());
        assert_eq!(body["err"], "invalid input: message text is empty");
    }

    #[tokio::test]
    async fn test_get_conversations() {
        let app = test_router(store().await);
        let _ = app
            .clone()
            .oneshot(post_json(
                "/messages",
                json!({"from": "bob", "to": "crew", "text": "on y va"}),
            ))
            .await
            .unwrap();

        let resp = app.oneshot(get("/conversations/alice")).await.unwrap();
        let body = body_json(resp).await;
        let conversations = body["conversations"].as_array().unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0]["recipient_id"], "crew");
        assert_eq!(conversations[0]["recipient_type"], "group");
        assert_eq!(conversations[0]["message_count"], 1);
    }

    #[tokio::test]
    async fn test_get_node_type() {
        let app = test_router(store().await);
        let resp = app.clone().oneshot(get("/node_type/crew")).await.unwrap();
        assert_eq!(body_json(resp).await["node_type"], "group");

        let resp = app.oneshot(get("/node_type/ghost")).await.unwrap();
        let body = body_json(resp).await;
        assert!(body["node_type"].is_null());
        assert_eq!(body["err"], "node ghost not found");
    }

    #[tokio::test]
    async fn test_get_node_type_unmodelled_label() {
        let store = store()
            .await
            .with_node("s1", NodeType::Other("Soiree".into()))
            .await;
        let app = test_router(store);
        let resp = app.oneshot(get("/node_type/s1")).await.unwrap();
        let body = body_json(resp).await;
        assert!(body.get("err").is_none());
        assert_eq!(body["node_type"], json!({"other": "Soiree"}));
    }
}
