//! Bookmark Sorter: reorder a bookmark tree and push the new order to a store
//!
//! A snapshot of the tree is flattened, sorted globally by date or title,
//! rebuilt with the toolbar folder pinned first, and reconciled against a
//! [`store::BookmarkStore`] with move and create calls.

pub mod config;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod service;
pub mod sort;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use error::{ApiError, StoreError};
pub use service::{ApplyReport, ApplyTarget, SortOptions, SortPlan, SortService};
pub use sort::SortPolicy;
pub use store::{BookmarkStore, MemoryBookmarkStore, SledBookmarkStore};
pub use tree::BookmarkNode;
