//! Section snapshots
//!
//! Every row in the `sections` table is one observation of a section's tags
//! at `created_at`. Sections sharing a name are successive versions of the
//! same logical section.

use serde::{Deserialize, Serialize};

use crate::catalog::ProgressTag;
use crate::resolver::{parse_percent, TagMap, TagResolver};

/// One section's recorded state at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Identifier of the physical section record
    pub ws_section_id: i64,
    /// Display name; the logical section grouping key
    pub name: Option<String>,
    pub ws_project_id: i64,
    /// Timestamp as stored; parsed with [`crate::time::parse_timestamp`]
    pub created_at: String,
    #[serde(default)]
    pub tags: Option<TagMap>,
}

impl RawSnapshot {
    /// Name used for grouping; absent names group as the empty string
    pub fn section_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// A snapshot with its progress tag resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSnapshot {
    #[serde(flatten)]
    pub raw: RawSnapshot,
    /// Winning catalog tag, if any catalog tag was present
    pub tag: Option<ProgressTag>,
    /// Numeric value of `tag`; `None` when no tag matched or its label is malformed
    pub progress: Option<u8>,
}

impl ResolvedSnapshot {
    pub fn resolve(raw: RawSnapshot, resolver: &TagResolver) -> Self {
        let tag = resolver.resolve(raw.tags.as_ref());
        let progress = tag.as_ref().and_then(|t| parse_percent(&t.title));
        Self { raw, tag, progress }
    }

    /// Progress this snapshot contributes to its date.
    ///
    /// A snapshot without any catalog tag reports 0%. A catalog tag with a
    /// malformed label reports nothing, so the date falls back to whatever
    /// came before it.
    pub fn observed_progress(&self) -> Option<u8> {
        match (&self.tag, self.progress) {
            (None, _) => Some(0),
            (Some(_), progress) => progress,
        }
    }
}

/// Resolve every snapshot of a project
pub fn resolve_all(
    snapshots: impl IntoIterator<Item = RawSnapshot>,
    resolver: &TagResolver,
) -> Vec<ResolvedSnapshot> {
    snapshots
        .into_iter()
        .map(|raw| ResolvedSnapshot::resolve(raw, resolver))
        .collect()
}
