//! Find command implementation.

use anyhow::Result;
use memsieve::{MemoryRegion, format_pattern, parse_pattern};
use owo_colors::OwoColorize;

use super::hex_utils::{format_hex_address, parse_hex_address};
use super::open_region;
use crate::RegionArgs;

/// Run the find command
pub fn run(args: &RegionArgs, pattern: &str, start: Option<&str>, limit: usize) -> Result<()> {
    let region = open_region(args)?;
    let bytes = parse_pattern(pattern)?;
    let start = match start {
        Some(s) => parse_hex_address(s)?,
        None => region.base(),
    };

    println!(
        "Searching {} for pattern: {} ({} bytes)",
        region.name(),
        format_pattern(&bytes),
        bytes.len()
    );

    let found = find_all(&region, start, &bytes, limit)?;
    if found.is_empty() {
        println!("No matches found");
        return Ok(());
    }

    println!("Found {} match(es):", found.len());
    for address in found {
        println!("  {}", format_hex_address(address).green());
    }
    Ok(())
}

/// Collect up to `limit` occurrences of `pattern` from `start` onwards
pub fn find_all(
    region: &dyn MemoryRegion,
    start: u64,
    pattern: &[u8],
    limit: usize,
) -> Result<Vec<u64>> {
    let mut found = Vec::new();
    let mut cursor = start;
    while found.len() < limit
        && let Some(address) = region.find(cursor, pattern)?
    {
        found.push(address);
        cursor = address + 1;
    }
    Ok(found)
}
