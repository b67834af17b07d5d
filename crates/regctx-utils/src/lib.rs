//! # regctx Utilities
//!
//! Shared utilities for the regctx workspace, currently the logging setup
//! built on `tracing`.

pub mod logging;

// Re-export commonly used logging items for convenience
pub use logging::{init_logging, init_logging_with, LogFormat, LogLevel, LoggingConfig, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
