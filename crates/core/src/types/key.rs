//! User identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`UserKey`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum KeyError {
    /// The input string is empty.
    #[error("user key cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("user key must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace.
    #[error("user key cannot contain whitespace")]
    ContainsWhitespace,
}

/// A user identifier: an email address or a short username.
///
/// The directory is unique by this key, and reservation entries reference
/// their owner by it. Matching is exact (case-preserved), which mirrors how
/// the booking documents store the owner reference.
///
/// ## Constraints
///
/// - Length: 1-254 characters
/// - No whitespace
///
/// ## Examples
///
/// ```
/// use maison_core::UserKey;
///
/// assert!(UserKey::parse("marie@example.com").is_ok());
/// assert!(UserKey::parse("marie").is_ok());
///
/// assert!(UserKey::parse("").is_err());
/// assert!(UserKey::parse("aunt marie").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    /// Maximum length of a user key.
    pub const MAX_LENGTH: usize = 254;

    /// Parse a `UserKey` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// or contains whitespace.
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        if s.is_empty() {
            return Err(KeyError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(KeyError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(KeyError::ContainsWhitespace);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `UserKey` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for UserKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_keys() {
        assert!(UserKey::parse("marie@example.com").is_ok());
        assert!(UserKey::parse("marie").is_ok());
        assert!(UserKey::parse("uncle-jean").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(UserKey::parse(""), Err(KeyError::Empty)));
    }

    #[test]
    fn test_parse_whitespace() {
        assert!(matches!(
            UserKey::parse("aunt marie"),
            Err(KeyError::ContainsWhitespace)
        ));
        assert!(matches!(
            UserKey::parse("marie\t"),
            Err(KeyError::ContainsWhitespace)
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(255);
        assert!(matches!(
            UserKey::parse(&long),
            Err(KeyError::TooLong { .. })
        ));
    }

    #[test]
    fn test_matching_is_exact() {
        let a = UserKey::parse("Marie").unwrap();
        let b = UserKey::parse("marie").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_roundtrip() {
        let key = UserKey::parse("marie@example.com").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"marie@example.com\"");

        let parsed: UserKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_from_str() {
        let key: UserKey = "marie".parse().unwrap();
        assert_eq!(key.as_str(), "marie");
    }
}
