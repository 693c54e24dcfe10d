//! 审计日志类型定义

use serde::{Deserialize, Serialize};
use shared::request::EntityKind;

/// 审计操作类型（枚举，非自由文本）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ 订单 ═══
    OrderAccepted,
    OrderRejected,
    OrderHeld,
    OrderResumed,
    OrderVoided,
    OrderItemVoided,
    /// 订单完成结账
    OrderPaid,
    OrderRefunded,

    // ═══ 班次 ═══
    ShiftOpened,
    ShiftClosed,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderAccepted => "order_accepted",
            Self::OrderRejected => "order_rejected",
            Self::OrderHeld => "order_held",
            Self::OrderResumed => "order_resumed",
            Self::OrderVoided => "order_voided",
            Self::OrderItemVoided => "order_item_voided",
            Self::OrderPaid => "order_paid",
            Self::OrderRefunded => "order_refunded",
            Self::ShiftOpened => "shift_opened",
            Self::ShiftClosed => "shift_closed",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审计日志条目（追加写入，不可修改）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// 操作人 ID
    pub actor_id: String,
    pub action: AuditAction,
    pub entity_type: EntityKind,
    pub entity_id: i64,
    pub restaurant_id: Option<i64>,
    pub branch_id: Option<i64>,
    /// 变更前状态
    pub before_status: Option<String>,
    /// 变更后状态
    pub after_status: Option<String>,
    /// 结构化详情（JSON）
    pub details: serde_json::Value,
    /// 时间戳（Unix 毫秒）
    pub created_at: i64,
}

impl AuditEntry {
    pub fn new(actor_id: impl Into<String>, action: AuditAction, entity_type: EntityKind, entity_id: i64) -> Self {
        Self {
            actor_id: actor_id.into(),
            action,
            entity_type,
            entity_id,
            restaurant_id: None,
            branch_id: None,
            before_status: None,
            after_status: None,
            details: serde_json::Value::Object(Default::default()),
            created_at: shared::util::now_millis(),
        }
    }

    pub fn scope(mut self, restaurant_id: i64, branch_id: i64) -> Self {
        self.restaurant_id = Some(restaurant_id);
        self.branch_id = Some(branch_id);
        self
    }

    pub fn statuses(mut self, before: Option<&str>, after: Option<&str>) -> Self {
        self.before_status = before.map(str::to_string);
        self.after_status = after.map(str::to_string);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// 已持久化的审计记录
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i64,
    pub actor_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub restaurant_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub before_status: Option<String>,
    pub after_status: Option<String>,
    pub details: String,
    pub created_at: i64,
}
