use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{PageId, VersionId};
use crate::page::Page;

/// Author recorded when the caller's identity cannot be resolved.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Diff text recorded for the first version of a page.
pub const NEW_PAGE_MARKER: &str = "[NEW]";

/// Immutable snapshot of a page taken at mutation time.
///
/// `diff` describes the change against the immediately preceding version of
/// the same page, or is the `[NEW]` marker for the first one.
///
/// The page snapshot is stored under its own `page` key rather than spread
/// over the record: both the version and the page carry an `id`, and the
/// version's own keys (`author`, `diff`, ...) must not shadow caller-defined
/// page fields of the same name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: VersionId,
    pub page_id: PageId,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub diff: Vec<DiffSegment>,
    /// Full page fields as they were when the version was taken.
    pub page: Page,
}

impl Version {
    /// Whether this is the first version recorded for its page.
    pub fn is_initial(&self) -> bool {
        matches!(self.diff.as_slice(), [only] if only.kind == ChangeKind::Added && only.text == NEW_PAGE_MARKER)
    }
}

/// Direction of a changed diff segment. Unchanged text is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Removed,
}

/// A run of consecutive added or removed lines.
///
/// Persisted as `{ "text": ..., "added": true }` or
/// `{ "text": ..., "removed": true }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SegmentRecord", try_from = "SegmentRecord")]
pub struct DiffSegment {
    pub text: String,
    pub kind: ChangeKind,
}

impl DiffSegment {
    pub fn added(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ChangeKind::Added,
        }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ChangeKind::Removed,
        }
    }

    /// The marker segment for a page's first version.
    pub fn new_page() -> Self {
        Self::added(NEW_PAGE_MARKER)
    }

    pub fn is_added(&self) -> bool {
        self.kind == ChangeKind::Added
    }

    pub fn is_removed(&self) -> bool {
        self.kind == ChangeKind::Removed
    }
}

#[derive(Serialize, Deserialize)]
struct SegmentRecord {
    text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    added: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    removed: bool,
}

impl From<DiffSegment> for SegmentRecord {
    fn from(segment: DiffSegment) -> Self {
        Self {
            added: segment.is_added(),
            removed: segment.is_removed(),
            text: segment.text,
        }
    }
}

impl TryFrom<SegmentRecord> for DiffSegment {
    type Error = String;

    fn try_from(record: SegmentRecord) -> Result<Self, Self::Error> {
        match (record.added, record.removed) {
            (true, false) => Ok(Self::added(record.text)),
            (false, true) => Ok(Self::removed(record.text)),
            _ => Err("diff segment must be exactly one of added or removed".into()),
        }
    }
}
