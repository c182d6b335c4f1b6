//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod executor;
pub mod runtime;
pub mod settings;
pub mod storage;

pub use executor::execute;
pub use runtime::build_runtime;
pub use settings::{ensure_log_dir, get_log_dir, get_settings_path, load_config, load_config_from};
pub use storage::{GatewayCall, GatewayOp, LocalStorageGateway, MemoryStorageGateway};
