//! Document paths and document snapshots.
//!
//! The persisted layout this subsystem reads and writes:
//!
//! ```text
//! users/{userId}                  activeTokens, pushToken (legacy), groupId, role
//! groups/{groupId}                members, joinCode
//! groups/{groupId}/stats/storage  storageUsedBytes, storageQuotaBytes
//! app/config                      storageBytesQuotaDefault
//! ```
//!
//! [`DocPath`] constructors are the only way paths into this layout are
//! built; ad-hoc string formatting of document paths is not used anywhere
//! else in the workspace.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Error, Result};
use crate::id::{GroupId, UserId};

/// Top-level collection names in the persisted layout.
pub mod collections {
    /// The `users/{userId}` collection.
    pub const USERS: &str = "users";
    /// The `groups/{groupId}` collection.
    pub const GROUPS: &str = "groups";
}

/// A typed path to a document in the external store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(String);

impl DocPath {
    /// Path to a user document.
    #[must_use]
    pub fn user(user: &UserId) -> Self {
        Self(format!("{}/{}", collections::USERS, user.as_str()))
    }

    /// Path to a group document.
    #[must_use]
    pub fn group(group: &GroupId) -> Self {
        Self(format!("{}/{}", collections::GROUPS, group.as_str()))
    }

    /// Path to a group's storage stats sub-document.
    #[must_use]
    pub fn group_storage_stats(group: &GroupId) -> Self {
        Self(format!(
            "{}/{}/stats/storage",
            collections::GROUPS,
            group.as_str()
        ))
    }

    /// Path to the process-wide application config document.
    #[must_use]
    pub fn app_config() -> Self {
        Self("app/config".to_string())
    }

    /// Rebuilds a path from its stored string form.
    ///
    /// Paths only enter a store through the typed constructors, so the raw
    /// form is already validated.
    pub(crate) fn from_raw(raw: &str) -> Self {
        Self(raw.to_string())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the collection segment (the first path segment).
    #[must_use]
    pub fn collection(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }

    /// Returns the document id (the last path segment).
    #[must_use]
    pub fn doc_id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A snapshot of a stored document.
///
/// The `version` token is opaque and backend-specific; it exists solely to
/// drive conditional writes (see [`crate::store::WritePrecondition`]).
#[derive(Debug, Clone)]
pub struct Document {
    /// The path this document was read from.
    pub path: DocPath,
    /// The document's fields.
    pub fields: Map<String, Value>,
    /// Version token for conditional writes.
    pub version: String,
}

impl Document {
    /// Returns a string field, or `None` when absent or not a string.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Returns an unsigned integer field, or `None` when absent or not a
    /// non-negative integer.
    #[must_use]
    pub fn u64_field(&self, name: &str) -> Option<u64> {
        self.fields.get(name).and_then(Value::as_u64)
    }

    /// Returns the string elements of an array field.
    ///
    /// Absent fields, non-array fields, and non-string elements all yield
    /// nothing; stored documents are external input and are read
    /// defensively.
    #[must_use]
    pub fn string_array_field(&self, name: &str) -> Vec<String> {
        self.fields
            .get(name)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Decodes the document fields into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if the fields do not match the record
    /// shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            Error::serialization(format!("failed to decode document {}: {e}", self.path))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(fields: Value) -> Document {
        let Value::Object(fields) = fields else {
            panic!("fields must be an object");
        };
        Document {
            path: DocPath::user(&UserId::new("u1").unwrap()),
            fields,
            version: "1".to_string(),
        }
    }

    #[test]
    fn doc_path_layout() {
        let user = UserId::new("u1").unwrap();
        let group = GroupId::new("g1").unwrap();
        assert_eq!(DocPath::user(&user).as_str(), "users/u1");
        assert_eq!(DocPath::group(&group).as_str(), "groups/g1");
        assert_eq!(
            DocPath::group_storage_stats(&group).as_str(),
            "groups/g1/stats/storage"
        );
        assert_eq!(DocPath::app_config().as_str(), "app/config");
    }

    #[test]
    fn doc_path_segments() {
        let group = GroupId::new("g1").unwrap();
        let path = DocPath::group_storage_stats(&group);
        assert_eq!(path.collection(), "groups");
        assert_eq!(path.doc_id(), "storage");
        assert_eq!(DocPath::group(&group).doc_id(), "g1");
    }

    #[test]
    fn field_accessors_read_defensively() {
        let d = doc(json!({
            "role": "honoree",
            "count": 7,
            "activeTokens": ["t1", 42, "t2"],
            "negative": -1,
        }));
        assert_eq!(d.str_field("role"), Some("honoree"));
        assert_eq!(d.u64_field("count"), Some(7));
        assert_eq!(d.u64_field("negative"), None);
        assert_eq!(d.str_field("missing"), None);
        assert_eq!(d.string_array_field("activeTokens"), vec!["t1", "t2"]);
        assert!(d.string_array_field("role").is_empty());
    }
}
