//! Inbound HTTP surface of the Fable relay.
mod cors;
mod endpoints;
mod server;
mod types;


pub use cors::{build_cors_layer, is_allowed_origin};
pub use server::{build_relay_router, run_relay_server, RelayServerState};
