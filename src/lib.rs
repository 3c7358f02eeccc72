//! Epic Switcher
//!
//! Keeps a library of Epic Games Launcher logins and swaps between them by
//! rewriting the launcher's "remember me" session file.
//!
//! # Overview
//!
//! - Detecting the launcher's current login and storing it as a session
//! - Switching accounts by restarting the launcher with another token
//! - Recovering display names from the launcher's own logs
//! - A content-addressed avatar library with thumbnails
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use epic_switcher::{AuthService, SwitcherConfig, SyncOutcome};
//!
//! let config = SwitcherConfig::default();
//! let auth = AuthService::new(&config)?;
//! match auth.sync_current_login_session()? {
//!     SyncOutcome::Added(session) => println!("stored {}", session.display_name()),
//!     other => println!("{}: {}", other.label(), other.session().user_id),
//! }
//! # Ok::<(), epic_switcher::SwitcherError>(())
//! ```

pub mod auth;
pub mod avatar;
pub mod config;
pub mod error;
pub mod launcher;
pub mod logreader;
pub mod models;
pub mod observability;
pub mod store;
pub mod switch;
pub mod system;
pub mod testing;

pub use auth::{AuthService, SyncOutcome};
pub use avatar::AvatarService;
pub use config::{ConfigError, SwitcherConfig};
pub use error::{SwitcherError, SwitcherResult};
pub use launcher::{LauncherControl, SystemLauncher};
pub use logreader::LogReaderService;
pub use models::LoginSession;
pub use store::{IgnoreListStore, SessionStore};
pub use switch::SwitchService;
