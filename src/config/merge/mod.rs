//! Config composition: default layer and source ordering.

pub mod merge_policy;
pub mod service;
