//! # drawai-telemetry
//!
//! Structured logging for DrawAI built on `tracing`, plus the sinks that
//! receive per-transition span records from the engine.
//!
//! ```rust
//! use drawai_telemetry::{init_telemetry, info};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("drawai")?;
//!     info!("ready");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod sink;
pub mod spans;

pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{init_json_telemetry, init_telemetry};
pub use sink::{FanoutTraceSink, LogTraceSink, MemoryTraceSink, Score};
pub use spans::*;
