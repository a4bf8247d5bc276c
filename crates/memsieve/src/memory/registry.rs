use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::handle::{Handle, HandleAllocator};
use crate::memory::MemoryRegion;

/// Named regions exposed by the host, addressed through [`Handle`]s.
///
/// UI and script state hold handles; once a region is unregistered (or
/// everything is cleared on core unload) those handles resolve to `None`
/// instead of dangling.
#[derive(Default)]
pub struct RegionRegistry {
    regions: HandleAllocator<Box<dyn MemoryRegion>>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, region: Box<dyn MemoryRegion>) -> Handle {
        debug!(
            "Registering region {} ({}, 0x{:X}+0x{:X})",
            region.id(),
            region.name(),
            region.base(),
            region.size()
        );
        self.regions.allocate(region)
    }

    /// Remove a region, returning it if the handle was still live.
    pub fn unregister(&mut self, handle: Handle) -> Option<Box<dyn MemoryRegion>> {
        let region = self.regions.free(handle)?;
        debug!("Unregistered region {}", region.id());
        Some(region)
    }

    pub fn get(&self, handle: Handle) -> Option<&dyn MemoryRegion> {
        self.regions.translate(handle).map(|r| &**r)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut (dyn MemoryRegion + 'static)> {
        self.regions.translate_mut(handle).map(|r| &mut **r)
    }

    /// Like [`RegionRegistry::get`], for callers that report staleness as an
    /// error (script entry points).
    pub fn require(&self, handle: Handle) -> Result<&dyn MemoryRegion> {
        self.get(handle).ok_or(Error::StaleHandle)
    }

    pub fn require_mut(&mut self, handle: Handle) -> Result<&mut (dyn MemoryRegion + 'static)> {
        self.get_mut(handle).ok_or(Error::StaleHandle)
    }

    pub fn find_by_id(&self, id: &str) -> Option<Handle> {
        self.regions
            .iter()
            .find(|(_, region)| region.id() == id)
            .map(|(handle, _)| handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &dyn MemoryRegion)> {
        self.regions
            .iter()
            .map(|(handle, region)| (handle, &**region))
    }

    /// Drop every region and invalidate all outstanding handles.
    pub fn clear(&mut self) {
        info!("Tearing down {} memory region(s)", self.regions.len());
        self.regions.reset();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BufferRegion;

    fn registry() -> (RegionRegistry, Handle, Handle) {
        let mut registry = RegionRegistry::new();
        let wram = registry.register(Box::new(BufferRegion::zeroed("wram", "Work RAM", 0, 16)));
        let sram = registry.register(Box::new(BufferRegion::zeroed(
            "sram", "Save RAM", 0x6000, 8,
        )));
        (registry, wram, sram)
    }

    #[test]
    fn test_register_and_lookup() {
        let (registry, wram, sram) = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(wram).unwrap().name(), "Work RAM");
        assert_eq!(registry.find_by_id("sram"), Some(sram));
        assert_eq!(registry.find_by_id("vram"), None);
    }

    #[test]
    fn test_get_mut_pokes_through_handle() {
        let (mut registry, wram, _) = registry();
        registry.get_mut(wram).unwrap().poke(3, 0x42).unwrap();
        assert_eq!(registry.get(wram).unwrap().peek(3).unwrap(), 0x42);
    }

    #[test]
    fn test_unregister_makes_handle_stale() {
        let (mut registry, wram, sram) = registry();
        let removed = registry.unregister(wram).unwrap();
        assert_eq!(removed.id(), "wram");
        assert!(registry.get(wram).is_none());
        assert!(registry.unregister(wram).is_none());
        assert!(matches!(registry.require(wram), Err(Error::StaleHandle)));
        assert!(registry.require_mut(sram).is_ok());
        assert!(registry.get(sram).is_some());
    }

    #[test]
    fn test_clear_invalidates_all_handles() {
        let (mut registry, wram, sram) = registry();
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get(wram).is_none());
        assert!(registry.get(sram).is_none());

        let vram = registry.register(Box::new(BufferRegion::zeroed("vram", "Video RAM", 0, 4)));
        assert!(registry.get(wram).is_none());
        assert_eq!(registry.get(vram).unwrap().id(), "vram");
        assert_eq!(registry.iter().count(), 1);
    }
}
