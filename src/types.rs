//! Core types shared across the bookmark sorter.

/// NodeId: opaque, store-assigned bookmark identity
pub type NodeId = String;

/// Timestamp: milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Reserved identity of the synthetic root node.
///
/// No real store node below the root may carry this identity.
pub const ROOT_ID: &str = "0";

/// Title given to the synthetic root built during reconstruction.
pub const ROOT_TITLE: &str = "root";

/// Title of the toolbar folder pinned to the front of every sort.
pub const DEFAULT_ANCHOR_TITLE: &str = "Bookmarks bar";

/// Current wall-clock time as a [`Timestamp`].
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
