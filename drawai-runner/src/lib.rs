//! # drawai-runner
//!
//! Entry service for DrawAI: submit a request, resume a suspended run with a
//! clarification, or cancel a run in flight.

mod error;
mod outcome;
mod service;

pub use error::{Result, RunnerError};
pub use outcome::RunOutcome;
pub use service::{DrawingService, DrawingServiceConfig, RunHandle};
