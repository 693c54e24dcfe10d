//! 下游通知总线
//!
//! ```text
//! Gateway (提交成功) ──▶ DownstreamBus::publish() ──▶ broadcast ──▶ 厨房显示 / 库存扣减
//! ```
//!
//! 尽力而为：没有订阅者不是错误，发布失败不影响已提交的变更。

use serde::Serialize;
use shared::models::Restaurant;
use tokio::sync::broadcast;

use crate::actions::{ActionDescriptor, ActionId, SideEffect};

/// Downstream effect of a committed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownstreamEvent {
    pub effect: SideEffect,
    pub action: ActionId,
    pub restaurant_id: i64,
    pub branch_id: i64,
    pub order_id: i64,
    /// Unix millis
    pub at: i64,
}

#[derive(Debug, Clone)]
pub struct DownstreamBus {
    tx: broadcast::Sender<DownstreamEvent>,
}

impl DownstreamBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DownstreamEvent> {
        self.tx.subscribe()
    }

    /// Publish the descriptor's downstream effects for a committed order change
    ///
    /// Effects whose module is disabled for the restaurant are skipped.
    /// Returns the number of events published.
    pub fn publish_effects(
        &self,
        descriptor: &ActionDescriptor,
        restaurant: &Restaurant,
        branch_id: i64,
        order_id: i64,
    ) -> usize {
        let at = shared::util::now_millis();
        let mut published = 0;
        for effect in descriptor.side_effects {
            let enabled = match effect {
                SideEffect::Audit => continue,
                SideEffect::KitchenDisplay => restaurant.kitchen_display_enabled,
                SideEffect::InventoryDeduction => restaurant.inventory_enabled,
            };
            if !enabled {
                tracing::debug!(effect = ?effect, order_id, "Module disabled, effect skipped");
                continue;
            }
            let event = DownstreamEvent {
                effect: *effect,
                action: descriptor.id,
                restaurant_id: restaurant.id,
                branch_id,
                order_id,
                at,
            };
            // Err only means nobody is listening
            if self.tx.send(event).is_err() {
                tracing::debug!(effect = ?effect, order_id, "No downstream subscribers");
            }
            published += 1;
        }
        published
    }
}
