//! Domain operations on top of the graph store

pub mod manager;
pub mod models;

pub use manager::SoireeService;
pub use models::*;
