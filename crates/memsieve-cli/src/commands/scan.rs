//! Scan command implementation.
//!
//! Compares every address of a dump against a constant or against a second
//! dump (raw file or saved snapshot), optionally narrowing a saved set.

use std::path::PathBuf;

use anyhow::{Result, bail};
use memsieve::{
    BufferRegion, CandidateSet, MemoryRegion, Operand, OperandSpec, ScanConfig, ScanFilter,
    ScanOperator, Snapshot, decode_at, load_set, save_set,
};
use owo_colors::OwoColorize;
use tracing::info;

use super::hex_utils::{format_hex_address, parse_value};
use super::open_region;
use crate::RegionArgs;

/// Everything the scan subcommand takes besides the region
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub op: String,
    pub value: Option<String>,
    pub against: Option<PathBuf>,
    pub spec: Option<String>,
    pub within: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Run the scan command
pub fn run(config: &ScanConfig, args: &RegionArgs, request: ScanRequest) -> Result<()> {
    let region = open_region(args)?;
    let spec: OperandSpec = match &request.spec {
        Some(s) => s.parse()?,
        None => config.default_spec,
    };
    let filter = ScanFilter::new(ScanOperator::parse(&request.op)?, spec);

    let other: Option<Box<dyn MemoryRegion>> = match &request.against {
        Some(path) if Snapshot::exists(path) => Some(Box::new(Snapshot::load(path)?)),
        Some(path) => Some(Box::new(BufferRegion::from_file(path, region.base())?)),
        None => None,
    };

    let operand = match (&request.value, &other) {
        (Some(value), _) => Operand::Constant(parse_value(value)?),
        (None, Some(other)) => Operand::Region(other.as_ref()),
        (None, None) => bail!("Nothing to compare against. Use --value or --against"),
    };

    println!(
        "Scanning {} (0x{:X}+0x{:X}) for {} {} as {}",
        region.name(),
        region.base(),
        region.size(),
        filter.operator,
        describe(&operand),
        filter.spec
    );

    let mut matches = filter.scan(&region, operand)?;
    if let Some(path) = &request.within {
        let previous = load_set(path)?;
        info!("Narrowing within {}", path.display());
        matches = matches.intersection(&previous);
    }

    print_matches(&region, &matches, &spec, config.display_limit)?;

    if let Some(path) = &request.output {
        save_set(path, &matches)?;
        println!("Candidate set saved to: {}", path.display());
    }

    Ok(())
}

fn describe(operand: &Operand<'_>) -> String {
    match operand {
        Operand::Constant(value) => format!("0x{:X}", value),
        Operand::Region(region) => region.name().to_string(),
    }
}

/// Print up to `limit` matches with their current value
pub fn print_matches(
    region: &dyn MemoryRegion,
    matches: &CandidateSet,
    spec: &OperandSpec,
    limit: usize,
) -> Result<()> {
    let total = matches.elements_in(region.base(), region.size()).count();
    println!();
    println!("Found {} candidate(s)", total.bold());

    for address in matches
        .elements_in(region.base(), region.size())
        .take(limit)
    {
        let raw = decode_at(region, address, spec)?;
        if spec.signed {
            println!(
                "  {}: {} (0x{:X})",
                format_hex_address(address).green(),
                spec.sign_extend(raw),
                raw
            );
        } else {
            println!(
                "  {}: {} (0x{:X})",
                format_hex_address(address).green(),
                raw,
                raw
            );
        }
    }

    if total > limit {
        println!("  ... and {} more", total - limit);
    }

    Ok(())
}
