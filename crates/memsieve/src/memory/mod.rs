//! Memory regions and snapshots.
//!
//! - [`MemoryRegion`]: the byte-addressable contract supplied by the host
//! - [`BufferRegion`]: owned Vec-backed region (custom regions, dumps)
//! - [`Snapshot`]: immutable copy used as a comparison anchor
//! - [`RegionRegistry`]: named regions behind generation-checked handles

mod pattern;
mod region;
mod registry;
mod snapshot;

pub use pattern::{format_pattern, parse_pattern};
pub use region::{BufferRegion, MemoryRegion};
pub use registry::RegionRegistry;
pub use snapshot::{Snapshot, SnapshotMeta};
