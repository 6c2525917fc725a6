//! # netmap gateway
//!
//! Persistence for the topology editor.
//!
//! - [`RemoteStore`]: one async request/response call per table operation
//! - [`RestStore`]: the hosted PostgREST implementation
//! - [`MemoryStore`]: an in-process implementation for offline use and tests
//! - [`Gateway`]: the contract callers use (create/read swallow failures,
//!   update/delete propagate them)
//!

pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod rest;
pub mod store;

pub use config::StoreConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use memory::{MemoryStore, Operation};
pub use rest::RestStore;
pub use store::{RemoteSnapshot, RemoteStore, Table};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
