//! In-memory record of guard outcomes.
//!
//! - `GuardEvent`: one guard decision or sink failure
//! - `GuardTrail`: thread-safe recorder shared by the routes
//!
//! Events hold the input digest, never the input.

mod event;
mod trail;

pub use event::{GuardEvent, GuardOutcome};
pub use trail::GuardTrail;
