//! Logging utilities.
//!
//! Everything in the workspace logs through the `log` facade; this module only
//! decides how the `env_logger` backend is installed.

mod init;

pub use init::{LoggingConfig, init_logging};
