//! Bookmark trees: snapshot nodes, flattening and reconstruction.

pub mod flatten;
pub mod node;
pub mod reconstruct;
pub mod snapshot;

pub use flatten::{flatten, FlatRecord};
pub use node::{BookmarkNode, NodeKind};
pub use reconstruct::{reconstruct, reconstruct_root, ReconstructedNode};
pub use snapshot::{snapshot_from_json, snapshot_to_json, validate_snapshot};
