//! # External Frame Memory
//!
//! Frame buffers are too big for on-chip RAM, so they live in slow
//! external memory. Callers never compute uncached addresses themselves:
//! they ask an [`ExternalMemory`] for an uncached region and get back a
//! [`PixelRegion`] that already points at the right alias.
//!
//! ## Allocators
//!
//! - [`PsramWindow`]: bump allocator over a fixed PSRAM window (target)
//! - [`HeapMemory`]: zeroed allocations on the Rust heap (host, tests)

mod psram;
mod region;

pub use psram::{PsramWindow, PRESTO_PSRAM_BASE, PRESTO_PSRAM_SIZE, PRESTO_UNCACHED_ALIAS};
pub use region::PixelRegion;

use crate::error::AllocError;

/// Source of frame buffer memory
pub trait ExternalMemory {
    /// Allocate room for `pixels` 16-bit pixels, addressed so that
    /// accesses bypass any local cache.
    fn allocate_uncached(&mut self, pixels: usize) -> Result<PixelRegion, AllocError>;

    /// Total size of the backing store in bytes, when known
    fn capacity(&self) -> Option<usize> {
        None
    }
}

/// Heap-backed stand-in for external RAM. There is no cache to bypass,
/// so every allocation is trivially "uncached".
#[derive(Debug, Default)]
pub struct HeapMemory {
    allocated: usize,
}

impl HeapMemory {
    pub const fn new() -> Self {
        Self { allocated: 0 }
    }

    /// Bytes handed out so far
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}

impl ExternalMemory for HeapMemory {
    fn allocate_uncached(&mut self, pixels: usize) -> Result<PixelRegion, AllocError> {
        if pixels == 0 {
            return Err(AllocError::InvalidSize);
        }
        let bytes = pixels
            .checked_mul(core::mem::size_of::<u16>())
            .ok_or(AllocError::Overflow)?;
        let region = PixelRegion::zeroed_on_heap(pixels).ok_or(AllocError::OutOfMemory)?;
        self.allocated += bytes;
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_memory_tracks_bytes() {
        let mut mem = HeapMemory::new();
        let region = mem.allocate_uncached(100).unwrap();
        assert_eq!(region.len(), 100);
        assert_eq!(mem.allocated(), 200);
        assert_eq!(mem.allocate_uncached(0).err(), Some(AllocError::InvalidSize));
        assert_eq!(mem.capacity(), None);
    }
}
