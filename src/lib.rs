//! newton - 笔记工作区树模型
//!
//! 模块结构：
//! - models: 数据模型（NoteTree, 路径工具）
//! - kernel: 状态/动作/副作用，Store 与异步会话
//! - kernel::services: 端口（StorageGateway, NavigatorConfig）与适配器

pub mod kernel;
pub mod models;
