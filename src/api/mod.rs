//! HTTP API

pub mod conso_handlers;
pub mod envelope;
pub mod handlers;
pub mod message_handlers;
pub mod order_handlers;
pub mod preference_handlers;
pub mod routes;

pub use envelope::Envelope;
pub use handlers::{ServerState, SoireeState};
pub use routes::create_router;
