//! Hexdump command implementation.
//!
//! ```text
//! 0xC010: 01 2C 00 00 00 00 00 00  00 00 00 00 00 00 00 00  |.,..............|
//! ```

use anyhow::Result;
use memsieve::MemoryRegion;

use super::hex_utils::parse_hex_address;
use super::open_region;
use crate::RegionArgs;

/// Run the hexdump command
pub fn run(args: &RegionArgs, address: &str, size: usize, ascii: bool) -> Result<()> {
    let region = open_region(args)?;
    let address = parse_hex_address(address)?;
    let available = (region.base() + region.size()).saturating_sub(address);
    let size = size.min(available as usize);
    let bytes = region.read_bytes(address, size)?;

    println!("Hexdump of {} at 0x{:X} ({} bytes):", region.name(), address, size);
    println!();
    print!("{}", render(address, &bytes, ascii));

    Ok(())
}

/// Format `bytes` as hexdump lines labelled with absolute addresses
pub fn render(address: u64, bytes: &[u8], ascii: bool) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        out.push_str(&format!("0x{:X}: ", address + (i * 16) as u64));

        for j in 0..16 {
            if j == 8 {
                out.push(' ');
            }
            match chunk.get(j) {
                Some(byte) => out.push_str(&format!("{:02X} ", byte)),
                None => out.push_str("   "),
            }
        }

        if ascii {
            out.push_str(" |");
            for byte in chunk {
                if (0x20..0x7F).contains(byte) {
                    out.push(*byte as char);
                } else {
                    out.push('.');
                }
            }
            for _ in chunk.len()..16 {
                out.push(' ');
            }
            out.push('|');
        }

        out.push('\n');
    }
    out
}
