//! Integration tests for the bookmark sorter

mod reconcile_scenarios;
mod round_trip;
mod sled_store;
mod sort_properties;
mod support;
