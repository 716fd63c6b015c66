//! Shared pieces used by every netprofile binary.

pub mod logging;

pub use logging::{init_cli_logging, init_logging, LogFormat};
