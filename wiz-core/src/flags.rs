use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BoxError, CoreError};

/// Identifies one browser. Local flags are scoped to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        let valid = !raw.is_empty()
            && raw.len() <= 64
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CoreError::ValidationError(format!("invalid client id: {:?}", raw)));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    Theme,
    /// Privileged-session override. Grants admin access on its own.
    AdminSession,
    /// Operator's locally edited copy of the inventory (JSON)
    CachedRooms,
}

impl FlagKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKey::Theme => "theme",
            FlagKey::AdminSession => "wiz_admin_session",
            FlagKey::CachedRooms => "wiz_rooms",
        }
    }
}

/// Durable per-browser key/value flags. Values survive restarts and have no
/// expiry; they disappear only when cleared.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn get_flag(&self, client: &ClientId, key: FlagKey) -> Result<Option<String>, BoxError>;

    async fn set_flag(&self, client: &ClientId, key: FlagKey, value: &str) -> Result<(), BoxError>;

    async fn clear_flag(&self, client: &ClientId, key: FlagKey) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Unknown stored values fall back to the default theme.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_validation() {
        assert!(ClientId::parse("browser-42_a").is_ok());
        assert!(ClientId::parse("").is_err());
        assert!(ClientId::parse("has space").is_err());
        assert!(ClientId::parse(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_theme_defaults_to_dark() {
        assert_eq!(Theme::from_flag(None), Theme::Dark);
        assert_eq!(Theme::from_flag(Some("light")), Theme::Light);
        assert_eq!(Theme::from_flag(Some("sepia")), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
