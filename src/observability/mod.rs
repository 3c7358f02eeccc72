//! Observability for the switcher
//!
//! Structured logging only; the switcher runs on demand and has nothing to
//! expose as metrics or health endpoints.

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
