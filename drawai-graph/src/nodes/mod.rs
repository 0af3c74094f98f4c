//! Implementations of the node roles

mod analyze;
mod execute;
mod select;

pub(crate) use analyze::analyze;
pub(crate) use execute::{execute_one_go, execute_tool_call};
pub(crate) use select::{select_backend, select_strategy};
