//! Stored launcher login sessions

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

/// One launcher account the switcher has seen
///
/// Field names on the wire match `login_sessions.json` as written by earlier
/// releases, so existing stores keep loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginSession {
    #[serde(default)]
    pub username: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(default)]
    pub alias: String,
    #[serde(rename = "loginToken", default)]
    pub login_token: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(
        rename = "avatarImage",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub avatar_image: String,
    #[serde(
        rename = "avatarColor",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub avatar_color: String,
}

impl LoginSession {
    /// A freshly detected session: only the ID and token are known
    pub fn detected(user_id: impl Into<String>, login_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            login_token: login_token.into(),
            ..Default::default()
        }
    }

    /// Alias, then username, then user ID
    pub fn display_name(&self) -> &str {
        if !self.alias.is_empty() {
            &self.alias
        } else if !self.username.is_empty() {
            &self.username
        } else {
            &self.user_id
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

/// Current local time as RFC 3339 with second precision
pub fn now_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_matches_store_file() {
        let session = LoginSession {
            username: "moka".to_string(),
            user_id: "abc123".to_string(),
            alias: "Main".to_string(),
            login_token: "tok".to_string(),
            created_at: "2024-01-01T12:00:00+01:00".to_string(),
            updated_at: "2024-01-02T12:00:00+01:00".to_string(),
            ..Default::default()
        };

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["userId"], "abc123");
        assert_eq!(value["loginToken"], "tok");
        assert_eq!(value["created_at"], "2024-01-01T12:00:00+01:00");
        assert!(value.get("avatarImage").is_none());
        assert!(value.get("avatarColor").is_none());
    }

    #[test]
    fn test_old_records_without_avatar_fields_load() {
        let json = r#"{"username":"","userId":"u1","alias":"","loginToken":"t","created_at":"","updated_at":""}"#;
        let session: LoginSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.user_id, "u1");
        assert!(session.avatar_image.is_empty());
    }

    #[test]
    fn test_display_name_precedence() {
        let mut session = LoginSession::detected("u1", "t");
        assert_eq!(session.display_name(), "u1");

        session.username = "player".to_string();
        assert_eq!(session.display_name(), "player");

        session.alias = "Alt".to_string();
        assert_eq!(session.display_name(), "Alt");
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = now_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
