//! 工具模块 - 日志与金额

pub mod logger;
pub mod money;

pub use logger::{cleanup_old_logs, init_logger, init_logger_with_file};
