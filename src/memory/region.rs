use alloc::alloc::{dealloc, Layout};
use core::ptr::{self, NonNull};

/// Who gives the memory back when the region goes away
#[derive(Debug)]
enum Backing {
    /// Host heap; freed on drop
    Heap(Layout),
    /// Carved out of an external-RAM window; never freed
    Window,
}

/// A contiguous run of 16-bit pixels in (possibly uncached) external memory.
///
/// All access goes through volatile loads and stores so the compiler
/// never elides or reorders writes the scan-out hardware has to see.
/// Accesses past the end are truncated, never performed.
#[derive(Debug)]
pub struct PixelRegion {
    base: NonNull<u16>,
    len: usize,
    backing: Backing,
}

// SAFETY: the region is plain memory. Which side (application or scan
// engine) may touch it at a given moment is decided by the buffer role
// protocol in `framebuffer::buffer`, not by the type system.
unsafe impl Send for PixelRegion {}
unsafe impl Sync for PixelRegion {}

impl PixelRegion {
    /// Wrap memory that lives outside the Rust heap.
    ///
    /// # Safety
    /// - `base` must be valid for reads and writes of `len` `u16`s
    /// - the memory must stay valid for the life of the region
    /// - nothing outside this crate may write it concurrently
    pub unsafe fn from_raw_parts(base: NonNull<u16>, len: usize) -> Self {
        Self {
            base,
            len,
            backing: Backing::Window,
        }
    }

    /// Zeroed region on the host heap
    pub(crate) fn zeroed_on_heap(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let layout = Layout::array::<u16>(len).ok()?;
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc::alloc_zeroed(layout) };
        let base = NonNull::new(raw.cast::<u16>())?;
        Some(Self {
            base,
            len,
            backing: Backing::Heap(layout),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    pub fn read(&self, index: usize) -> Option<u16> {
        if index >= self.len {
            return None;
        }
        // SAFETY: index checked above.
        Some(unsafe { ptr::read_volatile(self.base.as_ptr().add(index)) })
    }

    pub fn write(&self, index: usize, value: u16) {
        if index < self.len {
            // SAFETY: index checked above.
            unsafe { ptr::write_volatile(self.base.as_ptr().add(index), value) }
        }
    }

    /// Store `value` into `count` consecutive pixels starting at `start`
    pub fn fill(&self, start: usize, count: usize, value: u16) {
        let end = start.saturating_add(count).min(self.len);
        let mut p = start;
        while p < end {
            // SAFETY: start <= p < end <= len.
            unsafe { ptr::write_volatile(self.base.as_ptr().add(p), value) }
            p += 1;
        }
    }

    /// Copy pixels starting at `start` into `out`; returns how many were copied
    pub fn read_into(&self, start: usize, out: &mut [u16]) -> usize {
        let available = self.len.saturating_sub(start);
        let n = out.len().min(available);
        for (i, slot) in out[..n].iter_mut().enumerate() {
            // SAFETY: start + i < start + available == len.
            *slot = unsafe { ptr::read_volatile(self.base.as_ptr().add(start + i)) };
        }
        n
    }
}

impl Drop for PixelRegion {
    fn drop(&mut self) {
        if let Backing::Heap(layout) = self.backing {
            // SAFETY: allocated in `zeroed_on_heap` with exactly this layout.
            unsafe { dealloc(self.base.as_ptr().cast::<u8>(), layout) }
        }
    }
}
