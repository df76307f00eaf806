//! Soiree Graph - CLI Tool
//!
//! Command-line interface over the HTTP API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use soiree_graph::client::SoireeClient;
use soiree_graph::neo4j::models::OrderItem;
use soiree_graph::service::{CreateMessageRequest, CreateOrderRequest};

#[derive(Parser)]
#[command(name = "soiree")]
#[command(about = "CLI for the soiree graph server")]
struct Cli {
    /// Server URL
    #[arg(long, env = "SOIREE_URL", default_value = "http://localhost:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Message operations
    Message {
        #[command(subcommand)]
        action: MessageAction,
    },

    /// Conso operations
    Conso {
        #[command(subcommand)]
        action: ConsoAction,
    },

    /// Preference operations
    Preference {
        #[command(subcommand)]
        action: PreferenceAction,
    },

    /// Order operations
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// Type of a node
    NodeType {
        /// Node ID
        id: String,
    },

    /// Check server health
    Health,
}

#[derive(Subcommand)]
enum MessageAction {
    /// Send a message to a user or group
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Message text
        text: String,
    },
    /// Messages between two users, or posted to a group
    List {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Conversations of a user
    Conversations {
        /// User ID
        user: String,
    },
}

#[derive(Subcommand)]
enum ConsoAction {
    /// Get a conso by ID
    Get { id: String },
    /// Consos sold by an establishment
    Menu {
        /// Establishment ID
        establishment: String,
    },
    /// Consos of an order
    Order {
        /// Order ID
        order: String,
    },
}

#[derive(Subcommand)]
enum PreferenceAction {
    /// All establishment types
    List,
    /// Preferences of a user
    Get { user: String },
    /// Replace the preferences of a user
    Set {
        user: String,
        /// Establishment type IDs (none clears the list)
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Place an order
    Create {
        #[arg(long)]
        user: String,
        #[arg(long)]
        establishment: String,
        /// Items as CONSO_ID=QUANTITY
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Orders of a user
    List { user: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let client = SoireeClient::new(cli.server);

    match cli.command {
        Commands::Message { action } => handle_message(&client, action).await,
        Commands::Conso { action } => handle_conso(&client, action).await,
        Commands::Preference { action } => handle_preference(&client, action).await,
        Commands::Order { action } => handle_order(&client, action).await,
        Commands::NodeType { id } => {
            let node_type = client.get_node_type(&id).await?;
            println!("{}", node_type);
            Ok(())
        }
        Commands::Health => {
            if client.health().await? {
                println!("ok");
            } else {
                anyhow::bail!("server at {} is unhealthy", client.base_url());
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn handle_message(client: &SoireeClient, action: MessageAction) -> Result<()> {
    match action {
        MessageAction::Send { from, to, text } => {
            let message = client
                .create_message(&CreateMessageRequest { from, to, text })
                .await?;
            println!("Sent message: {}", message.id);
        }
        MessageAction::List { from, to } => {
            let messages = client.get_messages(&from, &to).await?;
            for m in messages {
                println!(
                    "[{}] {} -> {}: {}",
                    soiree_graph::neo4j::models::format_timestamp(&m.date),
                    m.from,
                    m.to,
                    m.text
                );
            }
        }
        MessageAction::Conversations { user } => {
            let conversations = client.get_conversations(&user).await?;
            println!("{:<24} {:<8} {:>6}", "WITH", "TYPE", "MSGS");
            println!("{}", "-".repeat(40));
            for c in conversations {
                let kind = match c.recipient_type {
                    soiree_graph::neo4j::models::RecipientKind::User => "user",
                    soiree_graph::neo4j::models::RecipientKind::Group => "group",
                };
                println!("{:<24} {:<8} {:>6}", c.recipient_id, kind, c.message_count);
            }
        }
    }
    Ok(())
}

async fn handle_conso(client: &SoireeClient, action: ConsoAction) -> Result<()> {
    match action {
        ConsoAction::Get { id } => print_json(&client.get_conso(&id).await?)?,
        ConsoAction::Menu { establishment } => {
            let consos = client.list_establishment_consos(&establishment).await?;
            println!("{:<36} {:>8} {}", "ID", "PRICE", "NAME");
            println!("{}", "-".repeat(60));
            for c in consos {
                println!("{:<36} {:>8.2} {}", c.id, c.price, c.name);
            }
        }
        ConsoAction::Order { order } => print_json(&client.get_order_consos(&order).await?)?,
    }
    Ok(())
}

async fn handle_preference(client: &SoireeClient, action: PreferenceAction) -> Result<()> {
    match action {
        PreferenceAction::List => print_json(&client.list_preferences().await?)?,
        PreferenceAction::Get { user } => print_json(&client.get_user_preferences(&user).await?)?,
        PreferenceAction::Set { user, ids } => {
            let updated = client.update_user_preferences(&user, ids).await?;
            println!("{} now likes {} establishment type(s)", user, updated.len());
        }
    }
    Ok(())
}

fn parse_item(raw: &str) -> Result<OrderItem> {
    let (conso_id, quantity) = raw
        .split_once('=')
        .with_context(|| format!("expected CONSO_ID=QUANTITY, got {:?}", raw))?;
    let quantity = quantity
        .parse()
        .with_context(|| format!("invalid quantity in {:?}", raw))?;
    Ok(OrderItem {
        conso_id: conso_id.to_string(),
        quantity,
    })
}

async fn handle_order(client: &SoireeClient, action: OrderAction) -> Result<()> {
    match action {
        OrderAction::Create {
            user,
            establishment,
            items,
        } => {
            let items = items
                .iter()
                .map(|raw| parse_item(raw))
                .collect::<Result<Vec<_>>>()?;
            let order = client
                .create_order(&CreateOrderRequest {
                    user_id: user,
                    establishment_id: establishment,
                    items,
                })
                .await?;
            println!("Created order: {} ({:.2})", order.id, order.total_price);
        }
        OrderAction::List { user } => {
            let orders = client.get_user_orders(&user).await?;
            println!("{:<36} {:<10} {:>8}", "ID", "STATUS", "TOTAL");
            println!("{}", "-".repeat(56));
            for o in orders {
                println!(
                    "{:<36} {:<10} {:>8.2}",
                    o.id,
                    o.status.as_str(),
                    o.total_price
                );
            }
        }
    }
    Ok(())
}
