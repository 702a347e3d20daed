//! Typed contracts for the persisted document layout.
//!
//! These records decode the documents this subsystem reads. Every field is
//! optional or defaulted: the documents are written by multiple producers
//! (including legacy clients) and are read defensively.

use serde::{Deserialize, Serialize};

use crate::id::GroupId;

/// Raw field names in the persisted layout, for use in write operations.
pub mod fields {
    /// `users/{userId}.activeTokens` — the active push-token array.
    pub const ACTIVE_TOKENS: &str = "activeTokens";
    /// `users/{userId}.pushToken` — legacy single-token field, cleared on
    /// sight and never written.
    pub const LEGACY_PUSH_TOKEN: &str = "pushToken";
    /// `users/{userId}.groupId`.
    pub const GROUP_ID: &str = "groupId";
    /// `users/{userId}.role`.
    pub const ROLE: &str = "role";
    /// `groups/{groupId}.members`.
    pub const MEMBERS: &str = "members";
    /// `groups/{groupId}.joinCode`.
    pub const JOIN_CODE: &str = "joinCode";
    /// `groups/{groupId}/stats/storage.storageUsedBytes`.
    pub const STORAGE_USED_BYTES: &str = "storageUsedBytes";
    /// `groups/{groupId}/stats/storage.storageQuotaBytes`.
    pub const STORAGE_QUOTA_BYTES: &str = "storageQuotaBytes";
    /// `groups/{groupId}/stats/storage.createdAt`.
    pub const CREATED_AT: &str = "createdAt";
    /// `app/config.storageBytesQuotaDefault`.
    pub const STORAGE_QUOTA_DEFAULT: &str = "storageBytesQuotaDefault";
}

/// A user's role within their group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Ordinary group member.
    Member,
    /// The member the event is organized around. Excluded from chat
    /// notifications of their own group; the sole target of group alerts.
    Honoree,
}

impl Role {
    /// Parses a stored role string.
    ///
    /// The comparison is case-insensitive and any unrecognized value maps
    /// to [`Role::Member`]: only an explicit honoree marker changes
    /// notification targeting.
    #[must_use]
    pub fn from_str_loose(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("honoree") {
            Self::Honoree
        } else {
            Self::Member
        }
    }
}

/// A `users/{userId}` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    /// Active push tokens for this user's devices.
    pub active_tokens: Vec<String>,
    /// Legacy single-token field; cleared whenever it is seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    /// The group this user belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// The user's role within their group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserRecord {
    /// Returns the parsed role; absent roles are members.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role.as_deref().map_or(Role::Member, Role::from_str_loose)
    }

    /// Returns true when this user is the honoree of `group`.
    ///
    /// The role only counts within the user's own group: an honoree of a
    /// different group is an ordinary recipient here.
    #[must_use]
    pub fn is_honoree_of(&self, group: &GroupId) -> bool {
        self.group_id.as_deref() == Some(group.as_str()) && self.role() == Role::Honoree
    }
}

/// A `groups/{groupId}` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupRecord {
    /// User ids of the group's members.
    pub members: Vec<String>,
    /// The group's join code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_code: Option<String>,
}

/// A `groups/{groupId}/stats/storage` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageStatsRecord {
    /// Bytes currently used by the group's uploads.
    pub storage_used_bytes: u64,
    /// The group's storage quota in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_quota_bytes: Option<u64>,
}

/// The `app/config` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfigRecord {
    /// Default storage quota applied to newly created groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_bytes_quota_default: Option<u64>,
}

/// A chat message document, read-only input to the notification path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatMessageRecord {
    /// The sending user's id.
    pub sender_id: String,
    /// The message text.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_parsing_is_case_insensitive_and_loose() {
        assert_eq!(Role::from_str_loose("honoree"), Role::Honoree);
        assert_eq!(Role::from_str_loose("HONOREE"), Role::Honoree);
        assert_eq!(Role::from_str_loose("Honoree"), Role::Honoree);
        assert_eq!(Role::from_str_loose("member"), Role::Member);
        assert_eq!(Role::from_str_loose("organizer"), Role::Member);
        assert_eq!(Role::from_str_loose(""), Role::Member);
    }

    #[test]
    fn honoree_scoping_requires_matching_group() {
        let group = GroupId::new("g1").unwrap();
        let other = GroupId::new("g2").unwrap();
        let user = UserRecord {
            group_id: Some("g1".to_string()),
            role: Some("Honoree".to_string()),
            ..UserRecord::default()
        };
        assert!(user.is_honoree_of(&group));
        assert!(!user.is_honoree_of(&other));

        let no_group = UserRecord {
            role: Some("honoree".to_string()),
            ..UserRecord::default()
        };
        assert!(!no_group.is_honoree_of(&group));
    }

    #[test]
    fn user_record_decodes_with_missing_fields() {
        let user: UserRecord = serde_json::from_value(json!({})).unwrap();
        assert!(user.active_tokens.is_empty());
        assert!(user.push_token.is_none());
        assert_eq!(user.role(), Role::Member);

        let user: UserRecord = serde_json::from_value(json!({
            "activeTokens": ["t1"],
            "pushToken": "legacy",
            "groupId": "g1",
            "role": "honoree",
        }))
        .unwrap();
        assert_eq!(user.active_tokens, vec!["t1"]);
        assert_eq!(user.push_token.as_deref(), Some("legacy"));
        assert_eq!(user.role(), Role::Honoree);
    }

    #[test]
    fn stats_record_decodes_partial_documents() {
        let stats: StorageStatsRecord =
            serde_json::from_value(json!({"storageUsedBytes": 100})).unwrap();
        assert_eq!(stats.storage_used_bytes, 100);
        assert!(stats.storage_quota_bytes.is_none());
    }
}
