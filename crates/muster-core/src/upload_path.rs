//! Parser for group upload object paths.
//!
//! Grammar: `uploads/groups/<groupId>/<rest...>`. The storage quota ledger
//! only reacts to objects matching this grammar; everything else in the
//! bucket is ignored.

use crate::id::GroupId;

/// Prefix under which group uploads live in the blob store.
pub const UPLOADS_PREFIX: &str = "uploads/";

const GROUPS_SEGMENT: &str = "groups";

/// A parsed group upload path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPath {
    group_id: GroupId,
}

impl UploadPath {
    /// Parses an object path against the upload grammar.
    ///
    /// Returns `None` (not matched) when the path lacks the `uploads/`
    /// prefix, the literal `groups` segment is absent or last, or the
    /// group segment is not a valid group id.
    #[must_use]
    pub fn parse(object_path: &str) -> Option<Self> {
        let rest = object_path.strip_prefix(UPLOADS_PREFIX)?;
        let mut segments = rest.split('/');
        segments.by_ref().find(|s| *s == GROUPS_SEGMENT)?;
        let group_id = GroupId::new(segments.next()?).ok()?;
        Some(Self { group_id })
    }

    /// The group this object belongs to.
    #[must_use]
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }
}
