//! Record sorting
//!
//! Orders the flattened record list by one of four named policies and pins
//! the toolbar folder to the front. The whole list is sorted as one sequence;
//! reconstruction regroups records under their parents afterwards.

use crate::error::ApiError;
use crate::tree::FlatRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Sort policy, addressed by its external name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortPolicy {
    /// Newest first (`dateAdded`)
    #[serde(rename = "dateAdded")]
    DateAdded,
    /// Oldest first (`dateAddedOrder`)
    #[serde(rename = "dateAddedOrder")]
    DateAddedOrder,
    /// Title ascending (`title`)
    #[serde(rename = "title")]
    Title,
    /// Title descending (`titleOrder`)
    #[serde(rename = "titleOrder")]
    TitleOrder,
}

impl SortPolicy {
    pub const ALL: [SortPolicy; 4] = [
        SortPolicy::DateAdded,
        SortPolicy::DateAddedOrder,
        SortPolicy::Title,
        SortPolicy::TitleOrder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SortPolicy::DateAdded => "dateAdded",
            SortPolicy::DateAddedOrder => "dateAddedOrder",
            SortPolicy::Title => "title",
            SortPolicy::TitleOrder => "titleOrder",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SortPolicy::DateAdded => "date added, newest first",
            SortPolicy::DateAddedOrder => "date added, oldest first",
            SortPolicy::Title => "title, A to Z",
            SortPolicy::TitleOrder => "title, Z to A",
        }
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortPolicy {
    type Err = ApiError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        SortPolicy::ALL
            .into_iter()
            .find(|policy| policy.name() == name)
            .ok_or_else(|| {
                ApiError::InvalidArgument(format!(
                    "unknown sort policy '{}' (expected one of: dateAdded, dateAddedOrder, title, titleOrder)",
                    name
                ))
            })
    }
}

/// Collation key approximating a locale-aware comparison: compatibility
/// decomposition, combining marks dropped, case folded.
pub fn collation_key(title: &str) -> String {
    title
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Return `records` reordered by `policy`. Missing timestamps count as 0.
pub fn sort_records(records: &[FlatRecord], policy: SortPolicy) -> Vec<FlatRecord> {
    let mut sorted = records.to_vec();
    match policy {
        SortPolicy::DateAdded => sorted.sort_by_key(|r| Reverse(r.date_added.unwrap_or(0))),
        SortPolicy::DateAddedOrder => sorted.sort_by_key(|r| r.date_added.unwrap_or(0)),
        SortPolicy::Title => {
            sorted.sort_by_cached_key(|r| (collation_key(&r.title), r.title.clone()))
        }
        SortPolicy::TitleOrder => {
            sorted.sort_by_cached_key(|r| Reverse((collation_key(&r.title), r.title.clone())))
        }
    }
    sorted
}

/// Sort by policy name; unknown names fail with `InvalidArgument`.
pub fn sort_by_name(records: &[FlatRecord], policy: &str) -> Result<Vec<FlatRecord>, ApiError> {
    let policy: SortPolicy = policy.parse()?;
    Ok(sort_records(records, policy))
}

/// Move the first record titled exactly `anchor_title` to the front.
///
/// Everything else keeps its relative order. Returns `MissingAnchor` and
/// leaves `records` untouched when no such record exists.
pub fn pin_anchor(records: &mut Vec<FlatRecord>, anchor_title: &str) -> Result<(), ApiError> {
    let position = records
        .iter()
        .position(|r| r.title == anchor_title)
        .ok_or_else(|| ApiError::MissingAnchor(anchor_title.to_string()))?;
    let anchor = records.remove(position);
    records.insert(0, anchor);
    Ok(())
}
