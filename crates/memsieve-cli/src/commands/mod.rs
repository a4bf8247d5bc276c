//! CLI command implementations.
//!
//! Each subcommand works on raw memory dump files; a dump is mapped to a
//! base address and treated as one region.

pub mod find;
pub mod hex_utils;
pub mod hexdump;
pub mod scan;
pub mod set;
pub mod show;
pub mod snapshot;

use anyhow::{Context, Result};
use memsieve::BufferRegion;
use tracing::debug;

use crate::RegionArgs;
use hex_utils::parse_hex_address;

/// Load the dump named by `args` as a read-only region
pub fn open_region(args: &RegionArgs) -> Result<BufferRegion> {
    let base = parse_hex_address(&args.base)?;
    let region = BufferRegion::from_file(&args.region, base)
        .with_context(|| format!("Failed to read dump {}", args.region.display()))?
        .with_readonly(true);
    debug!(
        "Opened {} at 0x{:X} ({} bytes)",
        args.region.display(),
        base,
        memsieve::MemoryRegion::size(&region)
    );
    Ok(region)
}
