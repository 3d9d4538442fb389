//! Process-wide tracing setup. The filter starts at `info` and is swapped
//! for the configured one once settings are loaded.
//! See `bin/logger_demo.rs` for a manual check.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
