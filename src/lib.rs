// World state engine: entities, subscribers, fan-out
pub mod state;

// WebSocket subscription handling
pub mod subscription;

// HTTP and WebSocket APIs
pub mod api;

// Static and runtime configuration
pub mod config;
