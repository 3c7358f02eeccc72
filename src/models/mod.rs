//! Data types persisted by the switcher

pub mod session;

pub use session::{now_timestamp, LoginSession};
