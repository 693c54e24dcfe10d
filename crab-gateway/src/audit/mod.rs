//! 审计日志模块
//!
//! ```text
//! 主变更提交 (conditional write 成功)
//!   └─ AuditService::record()
//!        ├─ audit_log! → logs/audit/
//!        └─ AuditSink::append() → audit_logs 表 (失败仅记录，不影响主流程)
//! ```

pub mod service;
pub mod types;

pub use service::AuditService;
pub use types::{AuditAction, AuditEntry, AuditRecord};
