//! Validated identifier newtypes for Muster entities.
//!
//! User and group identifiers are opaque strings issued by the surrounding
//! platform, but they are embedded in document paths, so they are validated
//! at the boundary:
//!
//! - Non-empty, at most 128 characters
//! - No control characters
//! - No path separators
//!
//! Device tokens and join codes are opaque too but never appear in paths,
//! so they only reject empty strings and control characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const MAX_ID_LEN: usize = 128;
const MAX_TOKEN_LEN: usize = 4096;

fn validate_path_id(raw: &str, what: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(Error::invalid_argument(format!("{what} cannot be empty")));
    }
    if raw.len() > MAX_ID_LEN {
        return Err(Error::invalid_argument(format!(
            "{what} is too long (maximum {MAX_ID_LEN} bytes)"
        )));
    }
    if raw.contains('/') || raw.contains('\\') {
        return Err(Error::invalid_argument(format!(
            "{what} cannot contain path separators"
        )));
    }
    if raw.chars().any(char::is_control) {
        return Err(Error::invalid_argument(format!(
            "{what} cannot contain control characters"
        )));
    }
    Ok(())
}

fn validate_opaque(raw: &str, what: &str, max_len: usize) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(Error::invalid_argument(format!("{what} cannot be empty")));
    }
    if raw.len() > max_len {
        return Err(Error::invalid_argument(format!(
            "{what} is too long (maximum {max_len} bytes)"
        )));
    }
    if raw.chars().any(char::is_control) {
        return Err(Error::invalid_argument(format!(
            "{what} cannot contain control characters"
        )));
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $what:literal, $validate:path) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier after validating the format.
            ///
            /// # Errors
            ///
            /// Returns `Error::InvalidArgument` if the value is empty or
            /// contains forbidden characters.
            pub fn new(raw: impl Into<String>) -> Result<Self> {
                let raw = raw.into();
                $validate(&raw, $what)?;
                Ok(Self(raw))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// An opaque user identifier issued by the surrounding platform.
    UserId,
    "user id",
    validate_path_id
);

string_id!(
    /// An opaque group identifier issued by the surrounding platform.
    GroupId,
    "group id",
    validate_path_id
);

fn validate_token(raw: &str, what: &str) -> Result<()> {
    validate_opaque(raw, what, MAX_TOKEN_LEN)
}

string_id!(
    /// An opaque push-transport device token.
    ///
    /// At most one user owns a given token at any time; the token registry
    /// enforces this on attach.
    DeviceToken,
    "device token",
    validate_token
);

fn validate_join_code(raw: &str, what: &str) -> Result<()> {
    validate_opaque(raw, what, MAX_ID_LEN)
}

string_id!(
    /// A short human-shareable code identifying a group for self-service
    /// membership.
    JoinCode,
    "join code",
    validate_join_code
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        assert!(UserId::new("u-123").is_ok());
        assert!(GroupId::new("G42").is_ok());
        assert!(DeviceToken::new("fGzk3:APA91b...").is_ok());
        assert!(JoinCode::new("PARTY24").is_ok());
    }

    #[test]
    fn empty_ids_are_rejected() {
        assert!(UserId::new("").is_err());
        assert!(GroupId::new("").is_err());
        assert!(DeviceToken::new("").is_err());
        assert!(DeviceToken::new("   ").is_err());
        assert!(JoinCode::new("").is_err());
    }

    #[test]
    fn path_separators_are_rejected_in_path_ids() {
        assert!(UserId::new("a/b").is_err());
        assert!(GroupId::new("..\\up").is_err());
        // Tokens never land in paths, so slashes are fine there.
        assert!(DeviceToken::new("a/b").is_ok());
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(UserId::new("a\nb").is_err());
        assert!(DeviceToken::new("t\0").is_err());
        assert!(JoinCode::new("c\rd").is_err());
    }

    #[test]
    fn id_roundtrips_through_display_and_fromstr() {
        let id = UserId::new("u-9").unwrap();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
