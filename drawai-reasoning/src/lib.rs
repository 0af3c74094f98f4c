//! Reasoning services for DrawAI.
//!
//! - [`HeuristicReasoner`]: keyword rules plus a small composition catalogue,
//!   no network needed
//! - [`MockReasoner`]: scripted answers and failures for tests

pub mod compose;
pub mod heuristic;
pub mod mock;

pub use compose::{Mention, Subject, compose, mentions};
pub use heuristic::{CLARIFYING_QUESTION, HeuristicReasoner};
pub use mock::{MockOp, MockReasoner};
