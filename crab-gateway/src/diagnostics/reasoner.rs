//! Failure explanation
//!
//! Re-evaluates an action's related invariants against a reported context
//! and ranks what fails: blocking findings in descriptor order, then
//! warnings. Confidence reflects how well the re-evaluation matches what
//! the caller reported.

use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;

use crate::actions::{self, ActionId};
use crate::invariants::{self, Invariant, InvariantCategory, InvariantContext, Severity};

/// Confidence when the re-evaluation reproduces the reported invariant
const CONFIRMED: f32 = 1.0;
/// A blocking invariant was found and nothing was reported
const INFERRED: f32 = 0.8;
/// A blocking invariant was found but not the one reported
const DIFFERENT: f32 = 0.6;
/// Nothing fails now; the reported invariant applies to the action
const STALE: f32 = 0.3;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRequest {
    pub action: ActionId,
    #[serde(default)]
    pub context: InvariantContext,
    #[serde(default)]
    pub reported_code: Option<ErrorCode>,
    #[serde(default)]
    pub reported_invariant: Option<String>,
}

/// One failed invariant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub invariant_id: &'static str,
    pub category: InvariantCategory,
    pub severity: Severity,
    pub rule: &'static str,
    pub remediation: &'static str,
}

impl From<&'static Invariant> for Finding {
    fn from(inv: &'static Invariant) -> Self {
        Self {
            invariant_id: inv.id,
            category: inv.category,
            severity: inv.severity,
            rule: inv.rule,
            remediation: inv.remediation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub action: ActionId,
    /// First blocking invariant, always one related to `action`
    pub blocking: Option<Finding>,
    pub confidence: f32,
    /// Blocking failures in descriptor order, then warnings
    pub findings: Vec<Finding>,
    pub explanation: String,
}

/// Explain the outcome of `request.action` against `request.context`
///
/// Only invariants listed for the action in the descriptor table are
/// evaluated, so the reasoner can never name a rule the gateway would not
/// have applied.
pub fn explain(request: &DiagnosticRequest) -> Diagnosis {
    let descriptor = actions::resolve(request.action);
    let mut ctx = request.context.clone();
    ctx.action = Some(request.action);

    let evaluation = invariants::evaluate_all(descriptor.related_invariants, &ctx);
    let findings: Vec<Finding> = evaluation
        .blocking
        .iter()
        .chain(evaluation.warnings.iter())
        .map(|inv| Finding::from(*inv))
        .collect();

    let reported = request.reported_invariant.as_deref();
    let reported_related = reported.is_some_and(|id| descriptor.relates_to(id));

    if let Some(inv) = evaluation.first_blocking() {
        let confidence = match reported {
            Some(id) if id == inv.id => CONFIRMED,
            Some(_) => DIFFERENT,
            None => INFERRED,
        };
        let explanation = format!("{} {}", inv.rule, inv.remediation);
        return Diagnosis {
            action: request.action,
            blocking: Some(Finding::from(inv)),
            confidence,
            findings,
            explanation,
        };
    }

    let (confidence, explanation) = match (reported, reported_related) {
        (Some(id), true) => {
            let text = invariants::get(id)
                .map(|inv| {
                    format!(
                        "\"{}\" no longer fails for this snapshot; the record may have changed since the error. {}",
                        inv.rule, inv.remediation
                    )
                })
                .unwrap_or_default();
            (STALE, text)
        }
        (Some(id), false) => (
            0.0,
            format!("Invariant {id} does not apply to {}", request.action),
        ),
        (None, _) => (0.0, explain_code(request.reported_code)),
    };

    Diagnosis {
        action: request.action,
        blocking: None,
        confidence,
        findings,
        explanation,
    }
}

fn explain_code(code: Option<ErrorCode>) -> String {
    match code {
        Some(ErrorCode::Conflict) => {
            "Another terminal changed this record first. Reload it and decide again.".to_string()
        }
        Some(ErrorCode::Forbidden) => {
            "Your role or branch does not allow this action, or the restaurant is not active."
                .to_string()
        }
        Some(ErrorCode::Unauthenticated) => "Sign in again; the session is missing or expired.".to_string(),
        Some(ErrorCode::NotFound) => "The record no longer exists or the identifier is wrong.".to_string(),
        Some(ErrorCode::ValidationError) => {
            "The request was malformed; check the amounts and identifiers sent.".to_string()
        }
        Some(ErrorCode::InternalError) => "A server error occurred; try again shortly.".to_string(),
        Some(ErrorCode::InvariantBlocked) | None => {
            "No rule blocks this action for the given snapshot.".to_string()
        }
    }
}
