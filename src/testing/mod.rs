//! Testing utilities and mock implementations
//!
//! Lets the launcher-facing flows run in tests without touching real
//! processes.

pub mod mocks;

pub use mocks::*;
