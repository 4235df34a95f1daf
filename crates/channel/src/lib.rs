//! Socket.IO client plumbing for the browser installation.
//!
//! This crate is transport-agnostic: it turns text frames into typed packets,
//! tracks the Engine.IO/Socket.IO session, and decides reconnect delays. The
//! wasm app owns the actual WebSocket and timers.

pub mod backoff;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod packet;
pub mod session;
pub mod subscriptions;

pub use backoff::*;
pub use config::*;
pub use endpoint::*;
pub use error::*;
pub use packet::*;
pub use session::*;
pub use subscriptions::*;
