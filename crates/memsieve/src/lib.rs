//! # memsieve
//!
//! Memory search engine for emulator hacking workbenches.
//!
//! This crate provides:
//! - Byte-addressable memory regions and immutable snapshots
//! - Generation-checked handles for long-lived region references
//! - Candidate address sets with cheap complements and set algebra
//! - Comparison scans over regions, against constants or other regions
//! - A scan session that narrows candidates over successive scans
//!
//! The host (UI, scripting layer) supplies regions and consumes sets;
//! discovering regions, rendering and input handling live outside.

pub mod config;
pub mod error;
pub mod handle;
pub mod memory;
pub mod scan;
pub mod set;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{Error, Result};
pub use handle::{Handle, HandleAllocator};
pub use memory::{
    BufferRegion, MemoryRegion, RegionRegistry, Snapshot, SnapshotMeta, format_pattern,
    parse_pattern,
};
pub use scan::{
    Endianness, Operand, OperandSpec, ScanFilter, ScanOperator, ScanSession, ScanStep, Width,
    decode_at, filter,
};
pub use set::{CandidateSet, Elements, load_set, save_set};
