//! Neo4j client for the soiree graph
//!
//! Every operation follows the same sequence: take a connection slot,
//! build one parameterized query, execute it, map the rows, release the
//! slot (by drop, also on error).

use super::error::{StoreError, StoreResult};
use super::models::*;
use super::pool::ConnectionGate;
use anyhow::{Context, Result};
use neo4rs::{query, ConfigBuilder, Graph, Node, Query, Row};
use std::sync::Arc;
use std::time::Duration;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
    gate: ConnectionGate,
}

/// Order properties read before its lines are attached
struct OrderHeader {
    id: String,
    user_id: String,
    establishment_id: String,
    status: OrderStatus,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(
        uri: &str,
        user: &str,
        password: &str,
        max_connections: usize,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .max_connections(max_connections)
            .build()
            .context("Invalid Neo4j configuration")?;

        let graph = Graph::connect(config)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
            gate: ConnectionGate::new(max_connections, acquire_timeout),
        };

        // Initialize schema
        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with constraints and indexes
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT user_id IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
            "CREATE CONSTRAINT group_id IF NOT EXISTS FOR (g:Group) REQUIRE g.id IS UNIQUE",
            "CREATE CONSTRAINT establishment_id IF NOT EXISTS FOR (e:Establishment) REQUIRE e.id IS UNIQUE",
            "CREATE CONSTRAINT establishment_type_id IF NOT EXISTS FOR (t:EstablishmentType) REQUIRE t.id IS UNIQUE",
            "CREATE CONSTRAINT conso_id IF NOT EXISTS FOR (c:Conso) REQUIRE c.id IS UNIQUE",
            "CREATE CONSTRAINT order_id IF NOT EXISTS FOR (o:Order) REQUIRE o.id IS UNIQUE",
            "CREATE CONSTRAINT message_id IF NOT EXISTS FOR (m:Message) REQUIRE m.id IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX message_date IF NOT EXISTS FOR (m:Message) ON (m.date)",
            "CREATE INDEX order_created_at IF NOT EXISTS FOR (o:Order) ON (o.created_at)",
            "CREATE INDEX conso_name IF NOT EXISTS FOR (c:Conso) ON (c.name)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        Ok(())
    }

    // ========================================================================
    // Query-and-map plumbing
    // ========================================================================

    /// Execute a query and map every row, stopping at the first failing row
    async fn fetch_all<T>(
        &self,
        op: &'static str,
        q: Query,
        map: impl Fn(&Row) -> StoreResult<T>,
    ) -> StoreResult<Vec<T>> {
        tracing::debug!(op, "waiting for connection slot");
        let _slot = self.gate.acquire().await?;

        tracing::debug!(op, "executing query");
        let mut result = self.graph.execute(q).await.map_err(|e| {
            tracing::warn!(op, "query failed: {}", e);
            StoreError::from(e)
        })?;

        let mut items = Vec::new();
        while let Some(row) = result.next().await? {
            items.push(map(&row)?);
        }

        tracing::debug!(op, rows = items.len(), "rows mapped");
        Ok(items)
    }

    /// Execute a query and map its first row, if any
    async fn fetch_one<T>(
        &self,
        op: &'static str,
        q: Query,
        map: impl Fn(&Row) -> StoreResult<T>,
    ) -> StoreResult<Option<T>> {
        tracing::debug!(op, "waiting for connection slot");
        let _slot = self.gate.acquire().await?;

        tracing::debug!(op, "executing query");
        let mut result = self.graph.execute(q).await.map_err(|e| {
            tracing::warn!(op, "query failed: {}", e);
            StoreError::from(e)
        })?;

        let item = match result.next().await? {
            Some(row) => Some(map(&row)?),
            None => None,
        };

        tracing::debug!(op, found = item.is_some(), "row mapped");
        Ok(item)
    }

    /// Execute a write query that returns nothing
    async fn run(&self, op: &'static str, q: Query) -> StoreResult<()> {
        tracing::debug!(op, "waiting for connection slot");
        let _slot = self.gate.acquire().await?;

        tracing::debug!(op, "running query");
        self.graph.run(q).await.map_err(|e| {
            tracing::warn!(op, "query failed: {}", e);
            StoreError::from(e)
        })
    }

    // ========================================================================
    // Health / node lookup
    // ========================================================================

    /// Check connectivity to the database
    pub async fn health_check(&self) -> StoreResult<bool> {
        let ok = self
            .fetch_one("health_check", query("RETURN 1 AS ok"), |row| {
                Ok(row.get::<i64>("ok")? == 1)
            })
            .await?;
        Ok(ok.unwrap_or(false))
    }

    /// Resolve the type of a node from its labels
    pub async fn get_node_type(&self, id: &str) -> StoreResult<NodeType> {
        let q = query(
            r#"
            MATCH (n {id: $id})
            RETURN labels(n) AS labels
            LIMIT 1
            "#,
        )
        .param("id", id);

        let labels = self
            .fetch_one("get_node_type", q, |row| Ok(row.get::<Vec<String>>("labels")?))
            .await?
            .ok_or_else(|| StoreError::not_found("node", id))?;

        NodeType::from_labels(&labels)
            .ok_or_else(|| StoreError::Decode(format!("node {} has no labels", id)))
    }

    // ========================================================================
    // Message operations
    // ========================================================================

    /// Create a message with its FROM and TO edges
    pub async fn create_message(&self, message: &MessageNode) -> StoreResult<MessageNode> {
        let q = query(
            r#"
            MATCH (s:User {id: $from}), (r {id: $to})
            WHERE r:User OR r:Group
            CREATE (m:Message {
                id: $id,
                text: $text,
                date: $date
            })
            CREATE (m)-[:FROM]->(s)
            CREATE (m)-[:TO]->(r)
            RETURN m, s.id AS sender_id, r.id AS recipient_id
            "#,
        )
        .param("id", message.id.clone())
        .param("from", message.from.clone())
        .param("to", message.to.clone())
        .param("text", message.text.clone())
        .param("date", format_timestamp(&message.date));

        self.fetch_one("create_message", q, Self::row_to_message)
            .await?
            .ok_or_else(|| {
                StoreError::not_found(
                    "sender or recipient",
                    format!("{} -> {}", message.from, message.to),
                )
            })
    }

    /// Messages between two users in either direction, or sent to group `b`
    pub async fn get_messages(&self, a: &str, b: &str) -> StoreResult<Vec<MessageNode>> {
        let q = query(
            r#"
            MATCH (s)<-[:FROM]-(m:Message)-[:TO]->(r)
            WHERE (s.id = $a AND r.id = $b)
               OR (s.id = $b AND r.id = $a)
               OR (r:Group AND r.id = $b)
            RETURN m, s.id AS sender_id, r.id AS recipient_id
            ORDER BY m.date ASC
            "#,
        )
        .param("a", a)
        .param("b", b);

        self.fetch_all("get_messages", q, Self::row_to_message)
            .await
    }

    /// Conversations of a user, grouped per counterpart.
    ///
    /// Counts messages the user sent, messages the user received, and
    /// messages sent to groups the user is a member of. The counterpart's
    /// type is resolved afterwards with one node-type lookup per row.
    pub async fn get_conversations(&self, user_id: &str) -> StoreResult<Vec<ConversationNode>> {
        let q = query(
            r#"
            MATCH (u:User {id: $user_id})
            CALL {
                WITH u
                MATCH (u)<-[:FROM]-(m:Message)-[:TO]->(other)
                RETURN other, m
                UNION
                WITH u
                MATCH (u)<-[:TO]-(m:Message)-[:FROM]->(other:User)
                RETURN other, m
                UNION
                WITH u
                MATCH (u)-[:MEMBER_OF]->(other:Group)<-[:TO]-(m:Message)
                RETURN other, m
            }
            RETURN other.id AS recipient_id,
                   count(DISTINCT m) AS message_count,
                   max(m.date) AS last_date
            ORDER BY last_date DESC
            "#,
        )
        .param("user_id", user_id);

        let rows = self
            .fetch_all("get_conversations", q, |row| {
                let recipient_id: String = row.get("recipient_id")?;
                let message_count: i64 = row.get("message_count")?;
                let last_date = row
                    .get::<String>("last_date")
                    .ok()
                    .and_then(|s| parse_timestamp(&s));
                Ok((recipient_id, message_count, last_date))
            })
            .await?;

        let mut conversations = Vec::with_capacity(rows.len());
        for (recipient_id, message_count, last_message_at) in rows {
            let node_type = match self.get_node_type(&recipient_id).await {
                Ok(node_type) => node_type,
                Err(e @ (StoreError::Decode(_) | StoreError::NotFound { .. })) => {
                    tracing::warn!(
                        "Skipping conversation of {} with {}: {}",
                        user_id,
                        recipient_id,
                        e
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            let Some(kind) = RecipientKind::from_node_type(&node_type) else {
                tracing::warn!(
                    "Skipping conversation of {} with {} node {}",
                    user_id,
                    node_type,
                    recipient_id
                );
                continue;
            };
            conversations.push(ConversationNode {
                id: conversation_id(user_id, &recipient_id, kind),
                message_count,
                recipient_id,
                recipient_type: kind,
                last_message_at,
            });
        }

        Ok(conversations)
    }

    /// Helper to convert a `m, sender_id, recipient_id` row to MessageNode
    fn row_to_message(row: &Row) -> StoreResult<MessageNode> {
        let node: Node = row.get("m")?;
        let id: String = node.get("id")?;
        let raw_date: String = node.get("date")?;
        let date = parse_timestamp(&raw_date).ok_or_else(|| {
            StoreError::Decode(format!("message {} has invalid date '{}'", id, raw_date))
        })?;

        Ok(MessageNode {
            id,
            from: row.get("sender_id")?,
            to: row.get("recipient_id")?,
            date,
            text: node.get("text")?,
        })
    }

    // ========================================================================
    // Conso operations
    // ========================================================================

    /// Get a conso by ID
    pub async fn get_conso(&self, id: &str) -> StoreResult<ConsoNode> {
        let q = query(
            r#"
            MATCH (c:Conso {id: $id})
            RETURN c
            "#,
        )
        .param("id", id);

        self.fetch_one("get_conso", q, |row| {
            let node: Node = row.get("c")?;
            Self::node_to_conso(&node)
        })
        .await?
        .ok_or_else(|| StoreError::not_found("conso", id))
    }

    /// Consos sold by an establishment
    pub async fn list_establishment_consos(
        &self,
        establishment_id: &str,
    ) -> StoreResult<Vec<ConsoNode>> {
        let q = query(
            r#"
            MATCH (:Establishment {id: $id})-[:SELLS]->(c:Conso)
            RETURN c
            ORDER BY c.name
            "#,
        )
        .param("id", establishment_id);

        self.fetch_all("list_establishment_consos", q, |row| {
            let node: Node = row.get("c")?;
            Self::node_to_conso(&node)
        })
        .await
    }

    /// Consos contained in an order, with quantities
    pub async fn get_order_consos(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        let q = query(
            r#"
            MATCH (:Order {id: $id})-[r:CONTAINS]->(c:Conso)
            RETURN c, r.quantity AS quantity
            ORDER BY c.name
            "#,
        )
        .param("id", order_id);

        self.fetch_all("get_order_consos", q, |row| {
            let node: Node = row.get("c")?;
            Ok(OrderLine {
                conso: Self::node_to_conso(&node)?,
                quantity: row.get("quantity")?,
            })
        })
        .await
    }

    /// Helper to convert Neo4j node to ConsoNode
    fn node_to_conso(node: &Node) -> StoreResult<ConsoNode> {
        Ok(ConsoNode {
            id: node.get("id")?,
            name: node.get("name")?,
            price: node.get("price")?,
            description: node.get("description").ok(),
            picture: node.get("picture").ok(),
        })
    }

    // ========================================================================
    // Preference operations
    // ========================================================================

    /// All establishment types
    pub async fn list_preferences(&self) -> StoreResult<Vec<PreferenceNode>> {
        let q = query(
            r#"
            MATCH (t:EstablishmentType)
            RETURN t
            ORDER BY t.name
            "#,
        );

        self.fetch_all("list_preferences", q, Self::row_to_preference)
            .await
    }

    /// Establishment types a user likes
    pub async fn get_user_preferences(&self, user_id: &str) -> StoreResult<Vec<PreferenceNode>> {
        let q = query(
            r#"
            MATCH (:User {id: $id})-[:LIKES]->(t:EstablishmentType)
            RETURN t
            ORDER BY t.name
            "#,
        )
        .param("id", user_id);

        self.fetch_all("get_user_preferences", q, Self::row_to_preference)
            .await
    }

    /// Remove every LIKES edge of a user
    pub async fn delete_user_preferences(&self, user_id: &str) -> StoreResult<()> {
        let q = query(
            r#"
            MATCH (:User {id: $id})-[l:LIKES]->(:EstablishmentType)
            DELETE l
            "#,
        )
        .param("id", user_id);

        self.run("delete_user_preferences", q).await
    }

    /// Link a user to establishment types; unknown type ids are ignored
    pub async fn add_user_preferences(
        &self,
        user_id: &str,
        preference_ids: &[String],
    ) -> StoreResult<()> {
        if preference_ids.is_empty() {
            return Ok(());
        }

        let q = query(
            r#"
            MATCH (u:User {id: $id})
            UNWIND $preference_ids AS type_id
            MATCH (t:EstablishmentType {id: type_id})
            MERGE (u)-[:LIKES]->(t)
            "#,
        )
        .param("id", user_id)
        .param("preference_ids", preference_ids.to_vec());

        self.run("add_user_preferences", q).await
    }

    fn row_to_preference(row: &Row) -> StoreResult<PreferenceNode> {
        let node: Node = row.get("t")?;
        Ok(PreferenceNode {
            id: node.get("id")?,
            name: node.get("name")?,
        })
    }

    // ========================================================================
    // Order operations
    // ========================================================================

    /// Create an order with one CONTAINS edge per item.
    ///
    /// Items whose conso is not sold by the establishment get no edge.
    pub async fn create_order(&self, order: &NewOrder) -> StoreResult<()> {
        let conso_ids: Vec<String> = order.items.iter().map(|i| i.conso_id.clone()).collect();
        let quantities: Vec<i64> = order.items.iter().map(|i| i.quantity).collect();

        let q = query(
            r#"
            MATCH (u:User {id: $user_id}), (e:Establishment {id: $establishment_id})
            CREATE (o:Order {
                id: $id,
                status: $status,
                created_at: $created_at
            })
            CREATE (u)-[:ORDERED]->(o)
            CREATE (o)-[:AT]->(e)
            WITH o, e
            UNWIND range(0, size($conso_ids) - 1) AS i
            OPTIONAL MATCH (e)-[:SELLS]->(c:Conso {id: $conso_ids[i]})
            FOREACH (_ IN CASE WHEN c IS NULL THEN [] ELSE [1] END |
                CREATE (o)-[:CONTAINS {quantity: $quantities[i]}]->(c)
            )
            RETURN o.id AS id, count(c) AS lines
            "#,
        )
        .param("id", order.id.clone())
        .param("user_id", order.user_id.clone())
        .param("establishment_id", order.establishment_id.clone())
        .param("status", OrderStatus::Pending.as_str())
        .param("created_at", format_timestamp(&order.created_at))
        .param("conso_ids", conso_ids)
        .param("quantities", quantities);

        let lines = self
            .fetch_one("create_order", q, |row| Ok(row.get::<i64>("lines")?))
            .await?
            .ok_or_else(|| {
                StoreError::not_found(
                    "user or establishment",
                    format!("{} @ {}", order.user_id, order.establishment_id),
                )
            })?;

        if lines as usize != order.items.len() {
            tracing::warn!(
                "Order {} written with {} of {} lines",
                order.id,
                lines,
                order.items.len()
            );
        }

        Ok(())
    }

    /// Get an order with its lines
    pub async fn get_order(&self, id: &str) -> StoreResult<OrderNode> {
        let q = query(
            r#"
            MATCH (u:User)-[:ORDERED]->(o:Order {id: $id})-[:AT]->(e:Establishment)
            RETURN o, u.id AS user_id, e.id AS establishment_id
            "#,
        )
        .param("id", id);

        let header = self
            .fetch_one("get_order", q, Self::row_to_order_header)
            .await?
            .ok_or_else(|| StoreError::not_found("order", id))?;

        self.attach_lines(header).await
    }

    /// Orders placed by a user, most recent first
    pub async fn get_user_orders(&self, user_id: &str) -> StoreResult<Vec<OrderNode>> {
        let q = query(
            r#"
            MATCH (u:User {id: $user_id})-[:ORDERED]->(o:Order)-[:AT]->(e:Establishment)
            RETURN o, u.id AS user_id, e.id AS establishment_id
            ORDER BY o.created_at DESC
            "#,
        )
        .param("user_id", user_id);

        let headers = self
            .fetch_all("get_user_orders", q, Self::row_to_order_header)
            .await?;

        let mut orders = Vec::with_capacity(headers.len());
        for header in headers {
            orders.push(self.attach_lines(header).await?);
        }
        Ok(orders)
    }

    async fn attach_lines(&self, header: OrderHeader) -> StoreResult<OrderNode> {
        let lines = self.get_order_consos(&header.id).await?;
        let total_price = OrderNode::compute_total(&lines);
        Ok(OrderNode {
            id: header.id,
            user_id: header.user_id,
            establishment_id: header.establishment_id,
            status: header.status,
            created_at: header.created_at,
            lines,
            total_price,
        })
    }

    fn row_to_order_header(row: &Row) -> StoreResult<OrderHeader> {
        let node: Node = row.get("o")?;
        let id: String = node.get("id")?;
        let raw_created: String = node.get("created_at")?;
        let created_at = parse_timestamp(&raw_created).ok_or_else(|| {
            StoreError::Decode(format!("order {} has invalid created_at '{}'", id, raw_created))
        })?;

        Ok(OrderHeader {
            id,
            user_id: row.get("user_id")?,
            establishment_id: row.get("establishment_id")?,
            status: node
                .get::<String>("status")
                .map(|s| OrderStatus::parse(&s))
                .unwrap_or_default(),
            created_at,
        })
    }
}
