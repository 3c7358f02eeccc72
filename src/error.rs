//! Error types for the account switcher
//!
//! Every fallible operation in the crate returns [`SwitcherResult`]. Messages
//! that reach the user go through [`sanitize_error_message`] first so a login
//! token never ends up on screen or in a bug report.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Main error type for switcher operations
#[derive(Debug, Error)]
pub enum SwitcherError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Path unavailable: {what}")]
    PathUnavailable { what: String },

    #[error("Not logged in: {message}")]
    NotLoggedIn { message: String },

    #[error("Cannot resolve user ID: {message}")]
    UserIdUnavailable { message: String },

    #[error("Session not found: {user_id}")]
    SessionNotFound { user_id: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Launcher error: {message}")]
    Launcher { message: String },

    #[error("Timed out after {waited_ms}ms waiting for the launcher to close")]
    LauncherShutdownTimeout { waited_ms: u64 },

    #[error("Avatar error: {message}")]
    Avatar { message: String },

    #[error("Store file {path} is corrupt: {message}")]
    CorruptStore { path: String, message: String },
}

impl SwitcherError {
    /// Create path unavailable error
    pub fn path_unavailable<S: Into<String>>(what: S) -> Self {
        Self::PathUnavailable { what: what.into() }
    }

    /// Create not logged in error
    pub fn not_logged_in<S: Into<String>>(message: S) -> Self {
        Self::NotLoggedIn {
            message: message.into(),
        }
    }

    /// Create user ID resolution error
    pub fn user_id_unavailable<S: Into<String>>(message: S) -> Self {
        Self::UserIdUnavailable {
            message: message.into(),
        }
    }

    /// Create session not found error
    pub fn session_not_found<S: Into<String>>(user_id: S) -> Self {
        Self::SessionNotFound {
            user_id: user_id.into(),
        }
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create launcher error
    pub fn launcher<S: Into<String>>(message: S) -> Self {
        Self::Launcher {
            message: message.into(),
        }
    }

    /// Create avatar error
    pub fn avatar<S: Into<String>>(message: S) -> Self {
        Self::Avatar {
            message: message.into(),
        }
    }

    /// True when the error only means nobody is signed in to the launcher
    pub fn is_logged_out(&self) -> bool {
        matches!(self, Self::NotLoggedIn { .. })
    }

    /// Render the error for display with secrets removed
    pub fn to_user_message(&self) -> String {
        sanitize_error_message(&self.to_string())
    }
}

/// Result type for switcher operations
pub type SwitcherResult<T> = Result<T, SwitcherError>;

static DATA_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(data|token)([=:]\s*)\S+").expect("valid regex"));

// Login tokens are long base64 runs. SHA-256 avatar names (64 chars) stay readable.
static TOKEN_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9+/=_\-]{128,}").expect("valid regex"));

const MAX_MESSAGE_LEN: usize = 500;

/// Sanitize error messages so login tokens never leak
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = DATA_LINE.replace_all(message, "${1}${2}***").to_string();
    sanitized = TOKEN_RUN.replace_all(&sanitized, "***").to_string();

    if sanitized.len() > MAX_MESSAGE_LEN {
        let truncate_suffix = "...[truncated]";
        let mut cut = MAX_MESSAGE_LEN - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized = format!("{}{}", &sanitized[..cut], truncate_suffix);
    }

    sanitized
}

/// Shorten a token for log output: first eight characters and the length
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}…({} chars)", token.chars().count())
}
