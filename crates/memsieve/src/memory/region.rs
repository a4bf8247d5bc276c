use std::fs;
use std::path::Path;

use memchr::memmem;

use crate::error::{Error, Result};
use crate::memory::Snapshot;

/// Byte-addressable memory supplied by the host (core RAM, save RAM, a
/// custom region, or a [`Snapshot`]).
///
/// An address is valid iff `address - base < size`.
pub trait MemoryRegion {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn base(&self) -> u64;
    fn size(&self) -> u64;
    fn readonly(&self) -> bool;

    fn peek(&self, address: u64) -> Result<u8>;
    fn poke(&mut self, address: u64, value: u8) -> Result<()>;

    /// Contiguous backing bytes, when the region has them.
    ///
    /// Scanning and searching use this to skip per-byte `peek` calls.
    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }

    fn contains_address(&self, address: u64) -> bool {
        address.wrapping_sub(self.base()) < self.size()
    }

    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let last = address.wrapping_add(len as u64 - 1);
        if !self.contains_address(address) || !self.contains_address(last) || last < address {
            return Err(Error::AddressOutOfRange {
                address,
                base: self.base(),
                size: self.size(),
            });
        }

        if let Some(bytes) = self.as_bytes() {
            let start = (address - self.base()) as usize;
            return Ok(bytes[start..start + len].to_vec());
        }

        (0..len as u64).map(|i| self.peek(address + i)).collect()
    }

    /// Find the first occurrence of `pattern` at or after `start`.
    ///
    /// A `start` below the base is clamped to the base.
    fn find(&self, start: u64, pattern: &[u8]) -> Result<Option<u64>> {
        if pattern.is_empty() {
            return Err(Error::InvalidPattern("Pattern is empty".to_string()));
        }

        let base = self.base();
        let offset = start.saturating_sub(base);
        let size = self.size();
        if offset >= size || size - offset < pattern.len() as u64 {
            return Ok(None);
        }

        if let Some(bytes) = self.as_bytes() {
            let from = offset as usize;
            return Ok(memmem::find(&bytes[from..], pattern).map(|pos| base + offset + pos as u64));
        }

        let last = size - pattern.len() as u64;
        'outer: for candidate in offset..=last {
            for (i, &expected) in pattern.iter().enumerate() {
                if self.peek(base + candidate + i as u64)? != expected {
                    continue 'outer;
                }
            }
            return Ok(Some(base + candidate));
        }

        Ok(None)
    }

    /// Copy the current contents into an immutable [`Snapshot`].
    fn snapshot(&self) -> Result<Snapshot> {
        Snapshot::capture(self)
    }
}

/// Owned, Vec-backed region: a user-registered custom region or a memory
/// dump loaded from disk.
#[derive(Debug, Clone)]
pub struct BufferRegion {
    id: String,
    name: String,
    base: u64,
    data: Vec<u8>,
    readonly: bool,
}

impl BufferRegion {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base: u64, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base,
            data,
            readonly: false,
        }
    }

    /// Zero-filled region of `size` bytes
    pub fn zeroed(id: impl Into<String>, name: impl Into<String>, base: u64, size: usize) -> Self {
        Self::new(id, name, base, vec![0; size])
    }

    /// Load a raw memory dump, mapping its first byte to `base`.
    pub fn from_file<P: AsRef<Path>>(path: P, base: u64) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(path.display().to_string(), name, base, data))
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Overwrite a run of bytes starting at `address`, ignoring the
    /// read-only flag (used by the host to mirror live memory).
    pub fn write_bytes(&mut self, address: u64, bytes: &[u8]) -> Result<()> {
        let offset = self.offset_of(address)?;
        let end = offset + bytes.len();
        if end > self.data.len() {
            return Err(Error::AddressOutOfRange {
                address: address + bytes.len() as u64 - 1,
                base: self.base,
                size: self.data.len() as u64,
            });
        }
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn offset_of(&self, address: u64) -> Result<usize> {
        if self.contains_address(address) {
            Ok((address - self.base) as usize)
        } else {
            Err(Error::AddressOutOfRange {
                address,
                base: self.base,
                size: self.data.len() as u64,
            })
        }
    }
}

impl MemoryRegion for BufferRegion {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> u64 {
        self.base
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn readonly(&self) -> bool {
        self.readonly
    }

    fn peek(&self, address: u64) -> Result<u8> {
        let offset = self.offset_of(address)?;
        Ok(self.data[offset])
    }

    fn poke(&mut self, address: u64, value: u8) -> Result<()> {
        if self.readonly {
            return Err(Error::ReadOnlyRegion(self.id.clone()));
        }
        let offset = self.offset_of(address)?;
        self.data[offset] = value;
        Ok(())
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        Some(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Region without contiguous bytes, to exercise the `peek` fallbacks
    struct PeekOnly(BufferRegion);

    impl MemoryRegion for PeekOnly {
        fn id(&self) -> &str {
            self.0.id()
        }
        fn name(&self) -> &str {
            self.0.name()
        }
        fn base(&self) -> u64 {
            self.0.base()
        }
        fn size(&self) -> u64 {
            self.0.size()
        }
        fn readonly(&self) -> bool {
            self.0.readonly()
        }
        fn peek(&self, address: u64) -> Result<u8> {
            self.0.peek(address)
        }
        fn poke(&mut self, address: u64, value: u8) -> Result<()> {
            self.0.poke(address, value)
        }
    }

    fn wram() -> BufferRegion {
        BufferRegion::new("wram", "Work RAM", 0x1000, vec![0x05, 0x00, 0x10, 0x00, 0x05, 0x00])
    }

    #[test]
    fn test_peek_and_poke() {
        let mut region = wram();
        assert_eq!(region.peek(0x1000).unwrap(), 0x05);
        region.poke(0x1001, 0xAA).unwrap();
        assert_eq!(region.peek(0x1001).unwrap(), 0xAA);
    }

    #[test]
    fn test_peek_out_of_range() {
        let region = wram();
        assert!(matches!(
            region.peek(0x0FFF),
            Err(Error::AddressOutOfRange { address: 0x0FFF, .. })
        ));
        assert!(region.peek(0x1006).is_err());
    }

    #[test]
    fn test_readonly_rejects_poke() {
        let mut region = wram().with_readonly(true);
        assert!(matches!(region.poke(0x1000, 1), Err(Error::ReadOnlyRegion(_))));
        assert_eq!(region.peek(0x1000).unwrap(), 0x05);
    }

    #[test]
    fn test_read_bytes() {
        let region = wram();
        assert_eq!(region.read_bytes(0x1002, 2).unwrap(), vec![0x10, 0x00]);
        assert!(region.read_bytes(0x1004, 4).is_err());
        assert!(region.read_bytes(0x1000, 0).unwrap().is_empty());

        let slow = PeekOnly(wram());
        assert_eq!(slow.read_bytes(0x1002, 2).unwrap(), vec![0x10, 0x00]);
    }

    #[test]
    fn test_find() {
        let region = wram();
        assert_eq!(region.find(0x1000, &[0x05, 0x00]).unwrap(), Some(0x1000));
        assert_eq!(region.find(0x1001, &[0x05, 0x00]).unwrap(), Some(0x1004));
        assert_eq!(region.find(0x1005, &[0x05, 0x00]).unwrap(), None);
        assert_eq!(region.find(0, &[0x10]).unwrap(), Some(0x1002));
        assert_eq!(region.find(0x2000, &[0x10]).unwrap(), None);
        assert!(region.find(0x1000, &[]).is_err());
    }

    #[test]
    fn test_find_without_contiguous_bytes() {
        let region = PeekOnly(wram());
        assert_eq!(region.find(0x1001, &[0x05, 0x00]).unwrap(), Some(0x1004));
        assert_eq!(region.find(0x1000, &[0x10, 0x00, 0x05]).unwrap(), Some(0x1002));
        assert_eq!(region.find(0x1000, &[0xFF]).unwrap(), None);
    }

    #[test]
    fn test_write_bytes_bounds() {
        let mut region = wram();
        region.write_bytes(0x1004, &[1, 2]).unwrap();
        assert_eq!(region.peek(0x1005).unwrap(), 2);
        assert!(region.write_bytes(0x1005, &[1, 2]).is_err());
    }

    #[test]
    fn test_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), [1u8, 2, 3]).unwrap();

        let region = BufferRegion::from_file(file.path(), 0x8000).unwrap();
        assert_eq!(region.base(), 0x8000);
        assert_eq!(region.size(), 3);
        assert_eq!(region.peek(0x8002).unwrap(), 3);
    }
}
