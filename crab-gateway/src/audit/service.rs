//! 审计日志服务
//!
//! 主变更提交之后调用，尽力而为：写入失败只记录日志，不回滚、不影响响应。

use std::sync::Arc;

use super::types::AuditEntry;
use crate::audit_log;
use crate::db::AuditSink;

#[derive(Clone)]
pub struct AuditService {
    sink: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService").finish_non_exhaustive()
    }
}

impl AuditService {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Record a committed transition
    ///
    /// Returns whether the entry was persisted. The audit log line is always
    /// emitted, even when the sink fails.
    pub async fn record(&self, entry: AuditEntry) -> bool {
        let resource = format!("{}:{}", entry.entity_type.as_str(), entry.entity_id);
        let transition = format!(
            "{}->{}",
            entry.before_status.as_deref().unwrap_or("-"),
            entry.after_status.as_deref().unwrap_or("-")
        );
        audit_log!(entry.actor_id, entry.action, resource, transition);

        match self.sink.append(&entry).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    action = %entry.action,
                    resource = %resource,
                    error = %e,
                    "Failed to persist audit entry"
                );
                false
            }
        }
    }
}
