//! Request bodies for gateway actions
//!
//! Every body carries `targetEntityId` and may carry `entityType`; a declared
//! type that does not match the action's target is rejected as a validation
//! error.

use crate::models::PaymentMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of entity an action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    Shift,
    Branch,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Shift => "shift",
            Self::Branch => "branch",
        }
    }
}

/// Common accessors for targeted request bodies
pub trait TargetedRequest {
    fn target_entity_id(&self) -> i64;
    fn entity_type(&self) -> Option<EntityKind>;
}

macro_rules! impl_targeted {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TargetedRequest for $ty {
                fn target_entity_id(&self) -> i64 {
                    self.target_entity_id
                }

                fn entity_type(&self) -> Option<EntityKind> {
                    self.entity_type
                }
            }
        )+
    };
}

/// Accept / hold / resume
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderActionRequest {
    pub target_entity_id: i64,
    #[serde(default)]
    pub entity_type: Option<EntityKind>,
}

/// Reject / void, reason required
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRequest {
    pub target_entity_id: i64,
    #[serde(default)]
    pub entity_type: Option<EntityKind>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidItemRequest {
    pub target_entity_id: i64,
    #[serde(default)]
    pub entity_type: Option<EntityKind>,
    pub item_id: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// One tendered payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderInput {
    pub method: PaymentMethod,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentRequest {
    pub target_entity_id: i64,
    #[serde(default)]
    pub entity_type: Option<EntityKind>,
    pub payments: Vec<TenderInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub target_entity_id: i64,
    #[serde(default)]
    pub entity_type: Option<EntityKind>,
    pub amount: Decimal,
    pub reason: String,
}

/// Open a shift; the target is the branch the drawer belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftRequest {
    pub target_entity_id: i64,
    #[serde(default)]
    pub entity_type: Option<EntityKind>,
    #[serde(default)]
    pub opening_cash: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseShiftRequest {
    pub target_entity_id: i64,
    #[serde(default)]
    pub entity_type: Option<EntityKind>,
    pub closing_cash: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

impl_targeted!(
    OrderActionRequest,
    ReasonRequest,
    VoidItemRequest,
    CompletePaymentRequest,
    RefundRequest,
    OpenShiftRequest,
    CloseShiftRequest,
);
