//! Operand decoding.
//!
//! [`decode_at`] assembles a value from individually read bytes.
//! [`RollingWindow`] keeps the decoded value of a sliding window so that
//! moving from `a` to `a + 1` costs one byte read instead of `width`.

use crate::error::Result;
use crate::memory::MemoryRegion;
use crate::scan::{Endianness, OperandSpec};

/// Byte reader over a region, using its contiguous bytes when it has them.
pub(crate) struct ByteSource<'a> {
    region: &'a dyn MemoryRegion,
    bytes: Option<&'a [u8]>,
    base: u64,
}

impl<'a> ByteSource<'a> {
    pub(crate) fn new(region: &'a dyn MemoryRegion) -> Self {
        Self {
            region,
            bytes: region.as_bytes(),
            base: region.base(),
        }
    }

    #[inline]
    pub(crate) fn byte(&self, address: u64) -> Result<u8> {
        match self.bytes {
            Some(bytes) => match bytes.get(address.wrapping_sub(self.base) as usize) {
                Some(&b) => Ok(b),
                None => self.region.peek(address),
            },
            None => self.region.peek(address),
        }
    }
}

/// Decode the raw `width`-byte pattern starting at `address`.
///
/// Little-endian puts byte 0 in the least significant position, big-endian
/// in the most significant one. Signedness is applied at comparison time.
pub fn decode_at(region: &dyn MemoryRegion, address: u64, spec: &OperandSpec) -> Result<u64> {
    decode_from(&ByteSource::new(region), address, spec)
}

fn decode_from(source: &ByteSource<'_>, address: u64, spec: &OperandSpec) -> Result<u64> {
    let width = spec.width_bytes() as u64;
    let mut value = 0u64;
    for i in 0..width {
        let byte = source.byte(address + i)? as u64;
        match spec.endianness {
            Endianness::Little => value |= byte << (8 * i),
            Endianness::Big => value = (value << 8) | byte,
        }
    }
    Ok(value)
}

/// Decoded value of a window sliding one byte at a time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RollingWindow {
    value: u64,
    spec: OperandSpec,
}

impl RollingWindow {
    /// Decode the first window at `address`.
    pub(crate) fn prime(source: &ByteSource<'_>, address: u64, spec: OperandSpec) -> Result<Self> {
        Ok(Self {
            value: decode_from(source, address, &spec)?,
            spec,
        })
    }

    #[inline]
    pub(crate) fn value(&self) -> u64 {
        self.value
    }

    /// Slide one byte forward, admitting `incoming` (the byte just past the
    /// current window).
    ///
    /// Little-endian: the oldest byte is the least significant, so shift
    /// right and place `incoming` at the top. Big-endian: the oldest byte is
    /// the most significant, so shift left and place `incoming` at the
    /// bottom.
    #[inline]
    pub(crate) fn advance(&mut self, incoming: u8) {
        let incoming = incoming as u64;
        self.value = match self.spec.endianness {
            Endianness::Little => {
                (self.value >> 8) | (incoming << (self.spec.width.bits() - 8))
            }
            Endianness::Big => ((self.value << 8) | incoming) & self.spec.width.mask(),
        };
    }
}
