use core::ptr::NonNull;

use super::{ExternalMemory, PixelRegion};
use crate::error::AllocError;

/// PSRAM base on the reference board (cached alias)
pub const PRESTO_PSRAM_BASE: usize = 0x1100_0000;
/// PSRAM fitted on the reference board
pub const PRESTO_PSRAM_SIZE: usize = 8 * 1024 * 1024;
/// Byte distance from the cached alias to the uncached one
pub const PRESTO_UNCACHED_ALIAS: usize = 0x0400_0000;

const PIXEL_ALIGN: usize = 4;

#[inline]
pub(crate) const fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}

pub(crate) fn validate_window(start: usize, size: usize) -> Result<(), AllocError> {
    if start == 0 {
        return Err(AllocError::InvalidAddress);
    }
    if size == 0 {
        return Err(AllocError::InvalidSize);
    }
    start.checked_add(size).ok_or(AllocError::Overflow)?;
    Ok(())
}

/// Bump allocator over a fixed external-RAM window.
///
/// Frame buffers are allocated once at boot and live forever, so nothing
/// is ever freed. Every region handed out is addressed through the
/// uncached alias: application writes reach RAM directly and the scan
/// engine reads what was written without any cache maintenance.
pub struct PsramWindow {
    start: usize,
    end: usize,
    next: usize,
    uncached_alias: usize,
}

impl PsramWindow {
    /// # Safety
    /// - `[start, start + size)` must be RAM nobody else allocates from
    /// - `[start + uncached_alias, start + uncached_alias + size)` must
    ///   address that same RAM
    pub unsafe fn new(start: usize, size: usize, uncached_alias: usize) -> Result<Self, AllocError> {
        validate_window(start, size)?;
        start
            .checked_add(size)
            .and_then(|end| end.checked_add(uncached_alias))
            .ok_or(AllocError::Overflow)?;

        Ok(Self {
            start,
            end: start + size,
            next: start,
            uncached_alias,
        })
    }

    /// The window fitted on the reference board
    ///
    /// # Safety
    /// PSRAM must already be initialized and not used by anything else.
    pub unsafe fn presto() -> Result<Self, AllocError> {
        Self::new(PRESTO_PSRAM_BASE, PRESTO_PSRAM_SIZE, PRESTO_UNCACHED_ALIAS)
    }

    pub fn used(&self) -> usize {
        self.next - self.start
    }

    pub fn remaining(&self) -> usize {
        self.end - self.next
    }
}

impl ExternalMemory for PsramWindow {
    fn allocate_uncached(&mut self, pixels: usize) -> Result<PixelRegion, AllocError> {
        if pixels == 0 {
            return Err(AllocError::InvalidSize);
        }
        let bytes = pixels
            .checked_mul(core::mem::size_of::<u16>())
            .ok_or(AllocError::Overflow)?;
        let aligned = align_up(self.next, PIXEL_ALIGN);
        let new_next = aligned.checked_add(bytes).ok_or(AllocError::Overflow)?;
        if new_next > self.end {
            return Err(AllocError::OutOfMemory);
        }

        let uncached = aligned + self.uncached_alias;
        let base = NonNull::new(uncached as *mut u16).ok_or(AllocError::InvalidAddress)?;
        self.next = new_next;

        // SAFETY: [aligned, new_next) lies inside the window and was never
        // handed out before; the constructor's contract makes the alias valid.
        Ok(unsafe { PixelRegion::from_raw_parts(base, pixels) })
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.end - self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn regions_are_offset_into_uncached_alias() {
        let mut window = unsafe { PsramWindow::presto() }.unwrap();
        let a = window.allocate_uncached(480 * 480).unwrap();
        let b = window.allocate_uncached(480 * 480).unwrap();

        assert_eq!(a.base_addr(), PRESTO_PSRAM_BASE + PRESTO_UNCACHED_ALIAS);
        assert_eq!(b.base_addr(), a.base_addr() + 480 * 480 * 2);
        assert_eq!(window.used(), 2 * 480 * 480 * 2);
    }

    #[test]
    fn exhausting_the_window_fails() {
        let mut window = unsafe { PsramWindow::new(0x1000, 100, 0) }.unwrap();
        assert!(window.allocate_uncached(40).is_ok());
        assert_eq!(window.allocate_uncached(40).err(), Some(AllocError::OutOfMemory));
        assert_eq!(window.allocate_uncached(0).err(), Some(AllocError::InvalidSize));
    }

    #[test]
    fn window_validation() {
        assert_eq!(unsafe { PsramWindow::new(0, 16, 0) }.err(), Some(AllocError::InvalidAddress));
        assert_eq!(unsafe { PsramWindow::new(16, 0, 0) }.err(), Some(AllocError::InvalidSize));
        assert_eq!(
            unsafe { PsramWindow::new(usize::MAX - 4, 16, 0) }.err(),
            Some(AllocError::Overflow)
        );
    }

    #[test]
    fn window_over_real_memory_is_usable() {
        let mut backing = vec![0u16; 64];
        let start = backing.as_mut_ptr() as usize;
        let mut window = unsafe { PsramWindow::new(start, 128, 0) }.unwrap();

        let region = window.allocate_uncached(32).unwrap();
        region.fill(0, 32, 0xBEEF);
        drop(region);
        assert!(backing[..32].iter().all(|&p| p == 0xBEEF));
        assert_eq!(window.remaining(), 64);
    }
}
