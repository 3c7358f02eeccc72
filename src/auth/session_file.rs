//! Reading and writing the launcher's `GameUserSettings.ini`
//!
//! Only the `[RememberMe]` section matters: its `Data=` line carries the
//! login token. A logged-out launcher keeps the line but with a short
//! placeholder value, so tokens below [`MIN_TOKEN_LEN`] mean "no session".

use crate::error::{SwitcherError, SwitcherResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest value accepted as a real login token
pub const MIN_TOKEN_LEN: usize = 1000;

/// Header written in front of the token when switching accounts
pub const REMEMBER_ME_PREFIX: &str = "[RememberMe]\nEnable=True\nData=";

static DATA_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Data=([^\r\n]+)").expect("valid regex"));

/// Pull the login token out of the INI file contents
pub fn extract_login_token(content: &str) -> SwitcherResult<String> {
    let token = DATA_LINE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .ok_or_else(|| SwitcherError::not_logged_in("no token found"))?;

    if token.len() < MIN_TOKEN_LEN {
        return Err(SwitcherError::not_logged_in(
            "no valid login token found (user likely logged out)",
        ));
    }
    Ok(token)
}

/// INI contents that make the launcher sign in with `token`
pub fn render_remember_me(token: &str) -> String {
    format!("{REMEMBER_ME_PREFIX}{token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_token() -> String {
        "x".repeat(MIN_TOKEN_LEN)
    }

    #[test]
    fn test_extracts_token_from_remember_me_section() {
        let token = long_token();
        let content = format!("[RememberMe]\r\nEnable=True\r\nData={token}\r\n[Other]\r\nKey=1\r\n");
        assert_eq!(extract_login_token(&content).unwrap(), token);
    }

    #[test]
    fn test_token_is_trimmed() {
        let token = long_token();
        let content = format!("Data=  {token}   \n");
        assert_eq!(extract_login_token(&content).unwrap(), token);
    }

    #[test]
    fn test_first_data_line_wins() {
        let first = "a".repeat(MIN_TOKEN_LEN);
        let second = "b".repeat(MIN_TOKEN_LEN);
        let content = format!("Data={first}\nData={second}\n");
        assert_eq!(extract_login_token(&content).unwrap(), first);
    }

    #[test]
    fn test_missing_data_line() {
        let err = extract_login_token("[RememberMe]\nEnable=False\n").unwrap_err();
        assert!(err.is_logged_out());
        assert!(err.to_string().contains("no token found"));
    }

    #[test]
    fn test_short_token_means_logged_out() {
        let content = format!("Data={}", "x".repeat(MIN_TOKEN_LEN - 1));
        let err = extract_login_token(&content).unwrap_err();
        assert!(err.is_logged_out());
        assert!(err.to_string().contains("logged out"));
    }

    #[test]
    fn test_render_round_trips() {
        let token = long_token();
        let content = render_remember_me(&token);
        assert!(content.starts_with("[RememberMe]\nEnable=True\nData="));
        assert_eq!(extract_login_token(&content).unwrap(), token);
    }
}
