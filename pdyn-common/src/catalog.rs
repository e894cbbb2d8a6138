//! Progress tag catalog
//!
//! The catalog is the closed set of tag ids that carry a progress percentage.
//! Tags outside the catalog are ignored when resolving a section's progress.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Version of the built-in catalog returned by [`TagCatalog::standard`]
pub const STANDARD_CATALOG_VERSION: u32 = 1;

/// Built-in progress tags, ordered 0% to 100% in steps of 5
const STANDARD_TAGS: [(&str, &str); 21] = [
    ("200867", "0%"),
    ("201071", "5%"),
    ("200870", "10%"),
    ("201074", "15%"),
    ("200879", "20%"),
    ("201080", "25%"),
    ("200882", "30%"),
    ("201083", "35%"),
    ("200885", "40%"),
    ("201086", "45%"),
    ("200888", "50%"),
    ("201089", "55%"),
    ("200891", "60%"),
    ("201092", "65%"),
    ("200894", "70%"),
    ("201095", "75%"),
    ("200897", "80%"),
    ("201098", "85%"),
    ("200876", "90%"),
    ("201101", "95%"),
    ("200873", "100%"),
];

/// A single catalog entry: tag id and its percentage label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressTag {
    pub id: String,
    pub title: String,
}

impl ProgressTag {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Immutable, versioned table of progress tags
///
/// Ids and titles are unique within a catalog; [`TagCatalog::new`] rejects
/// tables that break either rule.
#[derive(Debug, Clone)]
pub struct TagCatalog {
    version: u32,
    tags: Vec<ProgressTag>,
    ids: HashSet<String>,
}

impl TagCatalog {
    /// Build a catalog from an ordered list of tags
    pub fn new(version: u32, tags: Vec<ProgressTag>) -> Result<Self> {
        let mut ids = HashSet::with_capacity(tags.len());
        let mut titles = HashSet::with_capacity(tags.len());

        for tag in &tags {
            if tag.id.trim().is_empty() {
                return Err(Error::Config("Progress tag with empty id".to_string()));
            }
            if !ids.insert(tag.id.clone()) {
                return Err(Error::Config(format!("Duplicate progress tag id: {}", tag.id)));
            }
            if !titles.insert(tag.title.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate progress tag title: {}",
                    tag.title
                )));
            }
        }

        Ok(Self { version, tags, ids })
    }

    /// The built-in 21-entry catalog (0%, 5%, ..., 100%)
    pub fn standard() -> Self {
        let tags: Vec<ProgressTag> = STANDARD_TAGS
            .iter()
            .map(|(id, title)| ProgressTag::new(*id, *title))
            .collect();
        let ids = tags.iter().map(|t| t.id.clone()).collect();

        Self {
            version: STANDARD_CATALOG_VERSION,
            tags,
            ids,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Catalog entries in their configured order
    pub fn tags(&self) -> &[ProgressTag] {
        &self.tags
    }

    /// Whether `id` is a recognized progress tag id
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Catalog title for a tag id
    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.title.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TagCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
