//! Immutable copies of memory regions.
//!
//! A snapshot is the "previous value" anchor for changed/unchanged scans.
//! It is itself a read-only [`MemoryRegion`], so it can be scanned directly
//! or passed as the comparison operand against the live region.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::memory::MemoryRegion;

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

/// Metadata written next to a saved snapshot image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub name: String,
    pub source_id: String,
    pub base: u64,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    serial: u64,
    id: String,
    name: String,
    source_id: String,
    base: u64,
    created_at: DateTime<Utc>,
    data: Vec<u8>,
}

impl Snapshot {
    /// Copy every byte of `region` via `peek` (or its contiguous bytes, when
    /// available).
    pub fn capture<R: MemoryRegion + ?Sized>(region: &R) -> Result<Self> {
        let base = region.base();
        let size = region.size();

        let data = match region.as_bytes() {
            Some(bytes) => bytes.to_vec(),
            None => {
                let mut data = Vec::with_capacity(size as usize);
                for offset in 0..size {
                    data.push(region.peek(base + offset)?);
                }
                data
            }
        };

        let created_at = Utc::now();
        let name = format!(
            "{} @ {}",
            region.name(),
            created_at.format("%Y-%m-%d %H:%M:%S%.3f")
        );
        let snapshot = Self::from_parts(name, region.id().to_string(), base, created_at, data);
        debug!(
            "Captured {} ({} bytes at 0x{:X}) from {}",
            snapshot.id,
            snapshot.data.len(),
            base,
            snapshot.source_id
        );
        Ok(snapshot)
    }

    fn from_parts(
        name: String,
        source_id: String,
        base: u64,
        created_at: DateTime<Utc>,
        data: Vec<u8>,
    ) -> Self {
        let serial = NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            serial,
            id: format!("snapshot-{}", serial),
            name,
            source_id,
            base,
            created_at,
            data,
        }
    }

    /// Process-unique serial number
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Id of the region this snapshot was taken from
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn meta(&self) -> SnapshotMeta {
        SnapshotMeta {
            name: self.name.clone(),
            source_id: self.source_id.clone(),
            base: self.base,
            size: self.data.len() as u64,
            created_at: self.created_at,
        }
    }

    /// Write the raw image to `path` and its metadata to `path` with a
    /// `.json` extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, &self.data)?;
        let content = serde_json::to_string_pretty(&self.meta())?;
        fs::write(meta_path(path), content)?;
        info!("Saved {} to {}", self.name, path.display());
        Ok(())
    }

    /// Load a snapshot written by [`Snapshot::save`]. The loaded snapshot
    /// gets a fresh id.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(meta_path(path))?;
        let meta: SnapshotMeta = serde_json::from_str(&content)?;
        let data = fs::read(path)?;

        if data.len() as u64 != meta.size {
            return Err(Error::Config(format!(
                "Snapshot image {} has {} bytes, metadata says {}",
                path.display(),
                data.len(),
                meta.size
            )));
        }

        Ok(Self::from_parts(
            meta.name,
            meta.source_id,
            meta.base,
            meta.created_at,
            data,
        ))
    }

    /// Whether a saved snapshot exists at `path` (image plus metadata)
    pub fn exists<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        path.is_file() && meta_path(path).is_file()
    }
}

fn meta_path(path: &Path) -> PathBuf {
    let mut meta = path.as_os_str().to_owned();
    meta.push(".json");
    PathBuf::from(meta)
}

impl MemoryRegion for Snapshot {
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
        true
    }

    /// Out-of-range reads yield 0.
    fn peek(&self, address: u64) -> Result<u8> {
        let offset = address.wrapping_sub(self.base);
        Ok(usize::try_from(offset)
            .ok()
            .and_then(|i| self.data.get(i).copied())
            .unwrap_or(0))
    }

    /// Snapshots never change; writes are ignored.
    fn poke(&mut self, _address: u64, _value: u8) -> Result<()> {
        Ok(())
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        Some(&self.data)
    }
}
