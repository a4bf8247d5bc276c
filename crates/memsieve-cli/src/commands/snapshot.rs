//! Snapshot command implementation.

use std::fs;
use std::path::Path;

use anyhow::Result;
use memsieve::{MemoryRegion, ScanConfig, Snapshot};

use super::open_region;
use crate::RegionArgs;

/// Run the snapshot command
pub fn run(config: &ScanConfig, args: &RegionArgs, output: Option<&Path>) -> Result<()> {
    let region = open_region(args)?;
    let snapshot = region.snapshot()?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            fs::create_dir_all(&config.session_dir)?;
            let stem = args
                .region
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "region".to_string());
            config.session_path(&format!(
                "{}-{}.snap",
                stem,
                snapshot.created_at().format("%Y%m%d%H%M%S")
            ))
        }
    };

    snapshot.save(&path)?;
    println!(
        "Snapshot of {} (0x{:X}+0x{:X}) saved to: {}",
        region.name(),
        snapshot.base(),
        snapshot.size(),
        path.display()
    );
    println!("Compare later with: memsieve scan --against {}", path.display());
    Ok(())
}
