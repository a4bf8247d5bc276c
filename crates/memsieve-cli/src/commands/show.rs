//! Show command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use memsieve::load_set;
use owo_colors::OwoColorize;

use super::hex_utils::{format_hex_address, parse_hex_address};

/// Run the show command
pub fn run(path: &Path, base: Option<&str>, size: Option<&str>, limit: usize) -> Result<()> {
    let mut set = load_set(path)?;
    if let (Some(base), Some(size)) = (base, size) {
        set = set.restrict(parse_hex_address(base)?, parse_hex_address(size)?);
    } else if set.is_complemented() {
        bail!(
            "{} excludes {} address(es) from the whole address space; pass --base and --size to list a range",
            path.display(),
            set.explicit().len()
        );
    }

    let total = set.explicit().len();
    println!("{}: {} address(es)", path.display(), total.bold());
    for address in set.elements().take(limit) {
        println!("  {}", format_hex_address(address).green());
    }
    if total > limit {
        println!("  ... and {} more", total - limit);
    }
    Ok(())
}
