//! Service ports: traits + data contracts.

pub mod config;
pub mod storage;

pub use config::NavigatorConfig;
pub use storage::{
    EntryKind, GatewayFuture, StorageEntry, StorageError, StorageGateway, StorageResult,
};
