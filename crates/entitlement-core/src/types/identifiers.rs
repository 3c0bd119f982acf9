//! Principal identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, stable user identifier issued by the identity provider.
///
/// All persisted state is keyed by this value; records for one id are never
/// readable under another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank ids cannot key a record.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_ids_detected() {
        assert!(UserId::from("").is_blank());
        assert!(UserId::from("   ").is_blank());
        assert!(!UserId::from("u-1").is_blank());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::from("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }
}
