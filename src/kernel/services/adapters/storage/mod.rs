//! StorageGateway implementations: local disk (tokio::fs) and in-memory.

mod local;
mod memory;

pub use local::LocalStorageGateway;
pub use memory::{GatewayCall, GatewayOp, MemoryStorageGateway};
