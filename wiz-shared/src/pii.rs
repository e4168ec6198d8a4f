use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for guest contact details (email, phone) that must not leak into
/// log output. Serialization still yields the real value so API responses and
/// stored documents are unaffected.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl From<String> for Masked<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value_in_logs() {
        let email = Masked::new("guest@example.com".to_string());
        assert_eq!(format!("{:?}", email), "********");
        assert_eq!(format!("{}", email), "********");
    }

    #[test]
    fn test_masked_serializes_real_value() {
        let phone = Masked::new("+233200000000".to_string());
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+233200000000\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expose(), "+233200000000");
    }
}
