//! Article loading, chunking, and a flat vector index persisted as one snapshot file.

pub mod document;
pub mod index;
pub mod snapshot;

pub use index::{IndexEntry, IndexError, Neighbor, VectorIndex};
pub use snapshot::SnapshotError;
