//! Payment Split Calculator
//!
//! Pure computation over an order total and the tendered payments. Nothing
//! here reads or writes persisted state.

mod split;

pub use split::{PaymentSplit, SplitError, Tender, calculate};
