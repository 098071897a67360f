// WebSocket subscription handling

pub mod manager;
pub mod protocol;

pub use manager::ConnectionManager;
pub use protocol::{decode_fields, decode_world};
