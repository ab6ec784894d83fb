//! Process-wide `tracing` subscriber with a filter that can be swapped once
//! settings are loaded. `bin/logger_demo.rs` shows the reload in action.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
