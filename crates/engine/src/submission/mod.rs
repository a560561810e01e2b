//! The evidence submission workflow
//!
//! Split into a pure state machine ([`state`]) and an async driver
//! ([`driver`]) that performs the side effects at each state and feeds the
//! results back as events.

mod driver;
mod state;

pub use driver::{SubmissionOrchestrator, SubmissionOutcome};
pub use state::{transition, SubmissionEvent, SubmissionState};
