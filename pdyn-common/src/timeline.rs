//! Progress timeline reconstruction
//!
//! Turns the irregular snapshot history of one project into a grid: one
//! column per distinct snapshot date, one row per logical section, plus an
//! average row.
//!
//! # Algorithm
//!
//! 1. Date axis: distinct calendar dates (reporting timezone) of all
//!    snapshots with a parseable timestamp, ascending.
//! 2. Group snapshots by section name, dropping names rejected by the
//!    [`SectionFilter`].
//! 3. Within a group, order snapshots by timestamp and record the progress
//!    observed on each date (last snapshot of the day wins).
//! 4. Walk the axis: observed value if present, `"-"` before the section's
//!    first snapshot, otherwise the last observed value carried forward.
//! 5. Colour sections from [`SECTION_PALETTE`] in collated name order.
//! 6. Average the concrete values per date (rounded half up).
//! 7. Trim leading dates whose average is `"-"` or `"0%"`.
//!
//! Reconstruction is pure: no I/O, no caching, identical input gives an
//! identical timeline.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::resolver::parse_percent;
use crate::snapshot::ResolvedSnapshot;
use crate::time::parse_timestamp;

/// Chart palette, cycled by section position
pub const SECTION_PALETTE: [&str; 20] = [
    "#40916C", // Green
    "#406987", // Blue
    "#D29F5D", // Orange
    "#D27C5D", // Coral
    "#3F6D58", // Dark Green
    "#3D5565", // Dark Blue
    "#9D815B", // Brown
    "#9D6D5B", // Rust
    "#155E3D", // Forest Green
    "#153C57", // Navy
    "#885A1E", // Amber
    "#883B1E", // Brick
    "#74C8A2", // Mint
    "#76A3C3", // Sky Blue
    "#E8BE87", // Sand
    "#E8A187", // Peach
    "#791B39", // Burgundy
    "#5D3A9B", // Purple
    "#2D93AD", // Teal
    "#AD2D2D", // Red
];

/// Display name of the average series unless configured otherwise
pub const DEFAULT_AVERAGE_LABEL: &str = "Average";

/// Colour of the average series
pub const AVERAGE_COLOR: &str = "#791B39";

/// Marker characters that flag administrative sections by default
pub const DEFAULT_RESERVED_MARKERS: [&str; 1] = ["#"];

/// Value of one series at one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressValue {
    /// Concrete percentage, 0 to 100
    Percent(u8),
    /// Section did not exist yet (rendered as `"-"`)
    NotYet,
}

impl ProgressValue {
    pub fn percent(self) -> Option<u8> {
        match self {
            ProgressValue::Percent(p) => Some(p),
            ProgressValue::NotYet => None,
        }
    }

    pub fn is_concrete(self) -> bool {
        matches!(self, ProgressValue::Percent(_))
    }
}

impl fmt::Display for ProgressValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressValue::Percent(p) => write!(f, "{}%", p),
            ProgressValue::NotYet => f.write_str("-"),
        }
    }
}

impl FromStr for ProgressValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "-" {
            return Ok(ProgressValue::NotYet);
        }
        parse_percent(s)
            .map(ProgressValue::Percent)
            .ok_or_else(|| format!("Invalid progress value: {}", s))
    }
}

impl Serialize for ProgressValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decides which section names take part in a timeline
pub trait SectionFilter {
    fn admits(&self, name: &str) -> bool;
}

/// Rejects empty names and names containing any reserved marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedMarkers {
    markers: Vec<String>,
}

impl ReservedMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for ReservedMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_MARKERS)
    }
}

impl SectionFilter for ReservedMarkers {
    fn admits(&self, name: &str) -> bool {
        !name.trim().is_empty() && !self.markers.iter().any(|m| name.contains(m.as_str()))
    }
}

/// One logical section aligned to the date axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionTimeline {
    pub name: String,
    pub color: String,
    pub progress_by_date: Vec<(NaiveDate, ProgressValue)>,
}

impl SectionTimeline {
    /// Values without their dates
    pub fn values(&self) -> impl Iterator<Item = ProgressValue> + '_ {
        self.progress_by_date.iter().map(|(_, v)| *v)
    }
}

/// Untrimmed reconstruction over the full date axis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimelineGrid {
    pub dates: Vec<NaiveDate>,
    pub sections: Vec<SectionTimeline>,
    pub average: Vec<ProgressValue>,
}

impl TimelineGrid {
    /// Index of the first date whose average is concrete and non-zero
    pub fn first_progress_index(&self) -> Option<usize> {
        self.average
            .iter()
            .position(|v| matches!(v, ProgressValue::Percent(p) if *p != 0))
    }

    /// Drop leading dates before the first non-zero average.
    ///
    /// Nothing is dropped when no such date exists.
    pub fn trim_leading(self) -> ProjectTimeline {
        let start = self.first_progress_index().unwrap_or(0);

        let sections = self
            .sections
            .iter()
            .map(|s| SectionTimeline {
                name: s.name.clone(),
                color: s.color.clone(),
                progress_by_date: s.progress_by_date[start..].to_vec(),
            })
            .collect();

        ProjectTimeline {
            dates: self.dates[start..].to_vec(),
            sections,
            average: self.average[start..].to_vec(),
            trimmed_leading: start,
            untrimmed: self,
        }
    }
}

/// Reconstructed timeline as presented to charts and tables
///
/// `dates`, every section series and `average` share the same length. The
/// untrimmed grid stays available for translating presented column
/// indexes back to the full axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectTimeline {
    pub dates: Vec<NaiveDate>,
    pub sections: Vec<SectionTimeline>,
    pub average: Vec<ProgressValue>,
    /// Number of leading dates removed from the full axis
    pub trimmed_leading: usize,
    #[serde(skip)]
    untrimmed: TimelineGrid,
}

impl ProjectTimeline {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn untrimmed(&self) -> &TimelineGrid {
        &self.untrimmed
    }

    /// Full-axis index of a presented column
    pub fn full_index(&self, presented: usize) -> usize {
        presented + self.trimmed_leading
    }

    pub fn section(&self, name: &str) -> Option<&SectionTimeline> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Builds project timelines from resolved snapshots
#[derive(Debug, Clone)]
pub struct TimelineReconstructor<F = ReservedMarkers> {
    offset: FixedOffset,
    filter: F,
}

impl TimelineReconstructor<ReservedMarkers> {
    /// Reconstructor for the given reporting timezone with the default marker filter
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            filter: ReservedMarkers::default(),
        }
    }
}

impl<F: SectionFilter> TimelineReconstructor<F> {
    /// Swap the section name filter
    pub fn with_filter<G: SectionFilter>(self, filter: G) -> TimelineReconstructor<G> {
        TimelineReconstructor {
            offset: self.offset,
            filter,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Reconstruct and trim leading empty columns
    pub fn reconstruct(&self, snapshots: &[ResolvedSnapshot]) -> ProjectTimeline {
        self.reconstruct_untrimmed(snapshots).trim_leading()
    }

    /// Reconstruct over the full date axis
    pub fn reconstruct_untrimmed(&self, snapshots: &[ResolvedSnapshot]) -> TimelineGrid {
        let dated: Vec<(DateTime<FixedOffset>, &ResolvedSnapshot)> = snapshots
            .iter()
            .filter_map(|snapshot| {
                let parsed = parse_timestamp(&snapshot.raw.created_at, self.offset);
                if parsed.is_none() {
                    debug!(
                        "Skipping section {} with unparseable created_at {:?}",
                        snapshot.raw.ws_section_id, snapshot.raw.created_at
                    );
                }
                parsed.map(|ts| (ts, snapshot))
            })
            .collect();

        let dates: Vec<NaiveDate> = dated
            .iter()
            .map(|(ts, _)| ts.date_naive())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if dates.is_empty() {
            return TimelineGrid::default();
        }

        let mut groups: BTreeMap<&str, Vec<(DateTime<FixedOffset>, &ResolvedSnapshot)>> =
            BTreeMap::new();
        for (ts, snapshot) in &dated {
            let name = snapshot.raw.section_name();
            if !self.filter.admits(name) {
                continue;
            }
            groups.entry(name).or_default().push((*ts, *snapshot));
        }

        let mut groups: Vec<_> = groups.into_iter().collect();
        sort_by_collation(&mut groups);

        let sections: Vec<SectionTimeline> = groups
            .into_iter()
            .enumerate()
            .map(|(index, (name, group))| SectionTimeline {
                name: name.to_string(),
                color: SECTION_PALETTE[index % SECTION_PALETTE.len()].to_string(),
                progress_by_date: fill_series(&dates, group),
            })
            .collect();

        let average = (0..dates.len())
            .map(|i| average_at(&sections, i))
            .collect();

        debug!(
            "Reconstructed timeline: {} dates, {} sections from {} snapshots",
            dates.len(),
            sections.len(),
            snapshots.len()
        );

        TimelineGrid {
            dates,
            sections,
            average,
        }
    }
}

/// Order groups by section name the way people read them
///
/// Root collation at tertiary strength: letters before case, so `apex`
/// precedes `S00`, lowercase precedes uppercase of the same word, and `Е`
/// precedes `Ё`. Names the collator considers equal keep code point order.
fn sort_by_collation<T>(groups: &mut [(&str, T)]) {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);

    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => groups.sort_by(|(a, _), (b, _)| collator.compare(a, b)),
        Err(e) => warn!("Section collation unavailable, using code point order: {}", e),
    }
}

/// Align one logical section to the axis
fn fill_series(
    dates: &[NaiveDate],
    mut group: Vec<(DateTime<FixedOffset>, &ResolvedSnapshot)>,
) -> Vec<(NaiveDate, ProgressValue)> {
    group.sort_by_key(|(ts, _)| *ts);

    let Some(earliest) = group.first().map(|(ts, _)| ts.date_naive()) else {
        return dates.iter().map(|d| (*d, ProgressValue::NotYet)).collect();
    };

    let mut observed: BTreeMap<NaiveDate, u8> = BTreeMap::new();
    for (ts, snapshot) in &group {
        if let Some(progress) = snapshot.observed_progress() {
            observed.insert(ts.date_naive(), progress);
        }
    }

    dates
        .iter()
        .map(|&date| {
            let value = if let Some(&p) = observed.get(&date) {
                ProgressValue::Percent(p)
            } else if date < earliest {
                ProgressValue::NotYet
            } else {
                observed
                    .range(..=date)
                    .next_back()
                    .map_or(ProgressValue::NotYet, |(_, &p)| ProgressValue::Percent(p))
            };
            (date, value)
        })
        .collect()
}

/// Mean of the concrete values at one column, rounded half up
fn average_at(sections: &[SectionTimeline], index: usize) -> ProgressValue {
    let (sum, count) = sections
        .iter()
        .filter_map(|s| s.progress_by_date.get(index).and_then(|(_, v)| v.percent()))
        .fold((0u32, 0u32), |(sum, count), p| (sum + u32::from(p), count + 1));

    if count == 0 {
        return ProgressValue::NotYet;
    }
    let rounded = (2 * sum + count) / (2 * count);
    ProgressValue::Percent(rounded.min(100) as u8)
}
