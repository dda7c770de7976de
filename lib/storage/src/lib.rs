//! # tastevec Storage
//!
//! Snapshot persistence for the tastevec recipe index: a flat, bincode-encoded
//! list of index entries plus the embedding dimensionality, written
//! atomically. A save/load cycle is a faithful round trip: search results
//! over the restored index are identical to the saved one.

pub mod snapshot;

pub use snapshot::{load_index, save_index, IndexSnapshot};
