//! Byte pattern strings for `find`.

use crate::error::{Error, Result};

/// Parse a whitespace-separated hex byte string such as `"05 00 10"`.
///
/// Tokens may carry a `0x` prefix.
pub fn parse_pattern(pattern: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        let digits = token.trim_start_matches("0x").trim_start_matches("0X");
        let value = u8::from_str_radix(digits, 16)
            .map_err(|e| Error::InvalidPattern(format!("Invalid byte token '{}': {}", token, e)))?;
        bytes.push(value);
    }

    if bytes.is_empty() {
        return Err(Error::InvalidPattern("Pattern is empty".to_string()));
    }

    Ok(bytes)
}

pub fn format_pattern(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
