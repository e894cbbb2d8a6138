//! Tag priority resolution
//!
//! A section snapshot carries an unordered map of tag id to label. The
//! resolver picks the single catalog tag that represents the section's
//! progress.
//!
//! Priority is the label compared as text, highest first. Labels are
//! percentage strings, so this is NOT a numeric ordering: `"90%"` outranks
//! `"100%"`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::catalog::{ProgressTag, TagCatalog};

/// Raw tag map as stored on a section: tag id to label
pub type TagMap = BTreeMap<String, Value>;

/// Resolves a snapshot's tags against an injected catalog
#[derive(Debug, Clone, Default)]
pub struct TagResolver {
    catalog: TagCatalog,
}

impl TagResolver {
    pub fn new(catalog: TagCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    /// Pick the highest-priority catalog tag, or `None` if no catalog tag is present.
    ///
    /// Entries with non-string labels are skipped. On equal labels the
    /// smallest tag id wins.
    pub fn resolve(&self, tags: Option<&TagMap>) -> Option<ProgressTag> {
        let tags = tags?;
        let mut best: Option<(&str, &str)> = None;

        for (id, label) in tags {
            if !self.catalog.contains(id) {
                continue;
            }
            let Some(title) = label.as_str() else {
                continue;
            };
            if best.map_or(true, |(_, current)| title > current) {
                best = Some((id.as_str(), title));
            }
        }

        best.map(|(id, title)| ProgressTag::new(id, title))
    }
}

/// Convert a percentage label such as `"35%"` to an integer.
///
/// The trailing `%` is optional (`"40"` reads as 40). Only plain decimal
/// digits are accepted: signs, fractions and values above 100 give `None`.
pub fn parse_percent(title: &str) -> Option<u8> {
    let trimmed = title.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u8 = digits.parse().ok()?;
    (value <= 100).then_some(value)
}
