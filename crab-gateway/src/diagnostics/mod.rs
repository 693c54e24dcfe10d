//! Diagnostic Reasoner
//!
//! Read-only and advisory: explains why an action was (or would be) rejected
//! by re-evaluating the same registry and descriptor table the gateway uses.
//! It never touches stored records and performs no authorization.

mod reasoner;

pub use reasoner::{Diagnosis, DiagnosticRequest, Finding, explain};
