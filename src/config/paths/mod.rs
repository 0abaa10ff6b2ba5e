//! Filesystem locations used by the sorter.

pub mod xdg_root;
