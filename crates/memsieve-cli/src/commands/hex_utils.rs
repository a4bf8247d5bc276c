//! Hex address and value parsing utilities.

use anyhow::{Result, bail};

/// Parse a hex address string (with or without 0x prefix).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_hex_address("0x1000").unwrap(), 0x1000);
/// assert_eq!(parse_hex_address("C010").unwrap(), 0xC010);
/// ```
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(s, 16).map_err(|e| anyhow::anyhow!("Invalid hex address: {}", e))
}

/// Format an address as a hex string with 0x prefix.
pub fn format_hex_address(addr: u64) -> String {
    format!("0x{:X}", addr)
}

/// Parse a scan constant: decimal, `0x` hex, or negative decimal.
///
/// Negative values are returned as their two's complement bit pattern;
/// the scan truncates them to the operand width.
pub fn parse_value(s: &str) -> Result<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map_err(|e| anyhow::anyhow!("Invalid hex value '{}': {}", s, e));
    }
    if s.starts_with('-') {
        let value: i64 = s
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value '{}': {}", s, e))?;
        return Ok(value as u64);
    }
    if s.is_empty() {
        bail!("Empty value");
    }
    s.parse()
        .map_err(|e| anyhow::anyhow!("Invalid value '{}': {}", s, e))
}
