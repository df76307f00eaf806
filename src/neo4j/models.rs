//! Neo4j graph models for messages, menus, preferences and orders

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Node types
// ============================================================================

/// Kind of a graph node, resolved from its labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    User,
    Group,
    Establishment,
    EstablishmentType,
    Conso,
    Order,
    Message,
    /// A label this service does not model
    Other(String),
}

impl NodeType {
    /// Resolve a node type from a label list.
    ///
    /// The first known label wins; if none is known the first label is kept
    /// verbatim as `Other`. Returns `None` for a node without labels.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Option<Self> {
        labels
            .iter()
            .find_map(|l| Self::from_label(l.as_ref()))
            .or_else(|| labels.first().map(|l| Self::Other(l.as_ref().to_string())))
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "User" => Some(Self::User),
            "Group" => Some(Self::Group),
            "Establishment" => Some(Self::Establishment),
            "EstablishmentType" => Some(Self::EstablishmentType),
            "Conso" => Some(Self::Conso),
            "Order" => Some(Self::Order),
            "Message" => Some(Self::Message),
            _ => None,
        }
    }

    /// The graph label for this node type
    pub fn label(&self) -> &str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
            Self::Establishment => "Establishment",
            Self::EstablishmentType => "EstablishmentType",
            Self::Conso => "Conso",
            Self::Order => "Order",
            Self::Message => "Message",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Conso (menu item)
// ============================================================================

/// A purchasable item sold by an establishment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoNode {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Picture URL
    #[serde(default)]
    pub picture: Option<String>,
}

// ============================================================================
// Messaging
// ============================================================================

/// A message, attached to its sender by FROM and its recipient by TO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageNode {
    pub id: String,
    pub from: String,
    pub to: String,
    pub date: DateTime<Utc>,
    pub text: String,
}

/// Format a timestamp the way it is stored on message and order nodes
pub fn format_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp (RFC 3339)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Who a conversation is held with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    User,
    Group,
}

impl RecipientKind {
    /// Only users and groups can be on the other side of a conversation
    pub fn from_node_type(node_type: &NodeType) -> Option<Self> {
        match node_type {
            NodeType::User => Some(Self::User),
            NodeType::Group => Some(Self::Group),
            _ => None,
        }
    }
}

/// A conversation as seen by one user, derived from the messages graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationNode {
    pub id: String,
    pub message_count: i64,
    pub recipient_id: String,
    pub recipient_type: RecipientKind,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Conversation id for a user/recipient pair.
///
/// Direct conversations are keyed by both user ids in sorted order so both
/// participants see the same id. Group conversations are keyed by the group.
pub fn conversation_id(user_id: &str, recipient_id: &str, kind: RecipientKind) -> String {
    match kind {
        RecipientKind::Group => recipient_id.to_string(),
        RecipientKind::User => {
            if user_id <= recipient_id {
                format!("{}:{}", user_id, recipient_id)
            } else {
                format!("{}:{}", recipient_id, user_id)
            }
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// An establishment type a user can like (bar, club, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceNode {
    pub id: String,
    pub name: String,
}

// ============================================================================
// Orders
// ============================================================================

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Served => "served",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Unknown values fall back to `Pending`
    pub fn parse(raw: &str) -> Self {
        match raw {
            "served" => Self::Served,
            "paid" => Self::Paid,
            "cancelled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

/// One conso in an order, with its quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub conso: ConsoNode,
    pub quantity: i64,
}

/// An order placed by a user at an establishment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNode {
    pub id: String,
    pub user_id: String,
    pub establishment_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    pub total_price: f64,
}

impl OrderNode {
    /// Sum of price × quantity over the lines
    pub fn compute_total(lines: &[OrderLine]) -> f64 {
        lines
            .iter()
            .map(|l| l.conso.price * l.quantity as f64)
            .sum()
    }
}

/// Requested line of a new order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub conso_id: String,
    pub quantity: i64,
}

/// Order header as written to the graph, before lines are attached
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub id: String,
    pub user_id: String,
    pub establishment_id: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}
