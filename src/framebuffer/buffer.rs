//! Frame buffers and the role each one currently plays
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU8, Ordering};

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::color::Pen;
use crate::error::AllocError;
use crate::memory::PixelRegion;

pub type BufferId = usize;

/// Who owns a buffer right now.
///
/// The application may only write a `Writable` buffer. `Pending` means it
/// was handed to the streamer and takes over at the next vsync;
/// `Streaming` means the scan engine is reading it out to the panel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    Writable = 0,
    Pending = 1,
    Streaming = 2,
}

impl BufferRole {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => BufferRole::Pending,
            2 => BufferRole::Streaming,
            _ => BufferRole::Writable,
        }
    }
}

#[derive(Debug)]
struct Shared {
    region: PixelRegion,
    role: AtomicU8,
}

/// One full-screen RGB565 image in row-major order.
///
/// The application holds the only public handle; the scan engine keeps a
/// crate-private second handle to the same memory for reading it out.
#[derive(Debug)]
pub struct FrameBuffer {
    id: BufferId,
    width: u32,
    height: u32,
    shared: Arc<Shared>,
}

impl FrameBuffer {
    pub fn new(id: BufferId, width: u32, height: u32, region: PixelRegion) -> Result<Self, AllocError> {
        let needed = (width as usize)
            .checked_mul(height as usize)
            .ok_or(AllocError::Overflow)?;
        if needed == 0 || region.len() < needed {
            return Err(AllocError::InvalidSize);
        }
        Ok(Self {
            id,
            width,
            height,
            shared: Arc::new(Shared {
                region,
                role: AtomicU8::new(BufferRole::Writable as u8),
            }),
        })
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn base_addr(&self) -> usize {
        self.shared.region.base_addr()
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(self.width, self.height))
    }

    pub fn role(&self) -> BufferRole {
        BufferRole::from_u8(self.shared.role.load(Ordering::Acquire))
    }

    pub(crate) fn set_role(&self, role: BufferRole) {
        self.shared.role.store(role as u8, Ordering::Release);
    }

    /// Second handle onto the same memory, for the scan engine
    pub(crate) fn share(&self) -> Self {
        Self {
            id: self.id,
            width: self.width,
            height: self.height,
            shared: Arc::clone(&self.shared),
        }
    }

    pub(crate) fn same_memory(&self, other: &FrameBuffer) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    #[inline]
    pub(crate) fn assert_writable(&self) {
        debug_assert!(
            self.role() == BufferRole::Writable,
            "write into frame buffer {} while it is {:?}",
            self.id,
            self.role()
        );
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Pen> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.shared.region.read(idx).map(Pen::from_raw)
    }

    /// Plot one pixel; coordinates outside the buffer are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, pen: Pen) {
        self.assert_writable();
        self.put(x, y, pen);
    }

    #[inline]
    pub(crate) fn put(&mut self, x: i32, y: i32, pen: Pen) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.shared.region.write(idx, pen.raw());
    }

    /// Overwrite every pixel. This is the bulk "memset" path.
    pub fn fill(&mut self, pen: Pen) {
        self.assert_writable();
        let pixels = self.width as usize * self.height as usize;
        self.shared.region.fill(0, pixels, pen.raw());
    }

    /// Fill `area` clipped to the buffer
    pub fn fill_rect(&mut self, area: &Rectangle, pen: Pen) {
        self.assert_writable();
        self.fill_clipped(area, pen);
    }

    pub(crate) fn fill_clipped(&mut self, area: &Rectangle, pen: Pen) {
        let clipped = area.intersection(&self.bounds());
        if clipped.size.width == 0 || clipped.size.height == 0 {
            return;
        }
        let x0 = clipped.top_left.x as usize;
        let y0 = clipped.top_left.y as usize;
        let w = clipped.size.width as usize;
        let stride = self.width as usize;
        for row in y0..y0 + clipped.size.height as usize {
            self.shared.region.fill(row * stride + x0, w, pen.raw());
        }
    }

    /// Copy whole rows starting at `first_row` into `out`.
    /// Returns the number of rows copied.
    pub fn read_rows(&self, first_row: u32, out: &mut [u16]) -> usize {
        if first_row >= self.height {
            return 0;
        }
        let stride = self.width as usize;
        let rows_left = (self.height - first_row) as usize;
        let rows = (out.len() / stride).min(rows_left);
        self.shared
            .region
            .read_into(first_row as usize * stride, &mut out[..rows * stride]);
        rows
    }

    /// Copy of the whole image, row-major
    pub fn snapshot(&self) -> Vec<u16> {
        let mut out = alloc::vec![0u16; self.width as usize * self.height as usize];
        self.shared.region.read_into(0, &mut out);
        out
    }

    pub fn is_uniform(&self, pen: Pen) -> bool {
        let pixels = self.width as usize * self.height as usize;
        (0..pixels).all(|i| self.shared.region.read(i) == Some(pen.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ExternalMemory, HeapMemory};

    fn buffer(w: u32, h: u32) -> FrameBuffer {
        let mut mem = HeapMemory::new();
        let region = mem.allocate_uncached((w * h) as usize).unwrap();
        FrameBuffer::new(0, w, h, region).unwrap()
    }

    #[test]
    fn region_must_cover_the_frame() {
        let mut mem = HeapMemory::new();
        let region = mem.allocate_uncached(10).unwrap();
        assert_eq!(FrameBuffer::new(0, 4, 4, region).err(), Some(AllocError::InvalidSize));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut fb = buffer(8, 8);
        fb.fill_rect(&Rectangle::new(Point::new(-2, 6), Size::new(4, 4)), Pen::WHITE);

        let expected = |x: u32, y: u32| x < 2 && y >= 6;
        for y in 0..8 {
            for x in 0..8 {
                let want = if expected(x, y) { Pen::WHITE } else { Pen::BLACK };
                assert_eq!(fb.pixel(x, y), Some(want), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn read_rows_copies_whole_rows() {
        let mut fb = buffer(4, 3);
        fb.set_pixel(0, 2, Pen::from_raw(7));
        let mut out = [0u16; 12];
        assert_eq!(fb.read_rows(1, &mut out), 2);
        assert_eq!(out[4], 7);
        assert_eq!(fb.read_rows(3, &mut out), 0);
    }

    #[test]
    fn shared_handle_sees_writes() {
        let mut fb = buffer(4, 4);
        let reader = fb.share();
        fb.fill(Pen::WHITE);
        assert!(reader.is_uniform(Pen::WHITE));
        assert!(reader.same_memory(&fb));
    }

    #[test]
    #[should_panic(expected = "while it is Streaming")]
    #[cfg(debug_assertions)]
    fn writing_a_streaming_buffer_trips_the_assertion() {
        let mut fb = buffer(4, 4);
        fb.set_role(BufferRole::Streaming);
        fb.fill(Pen::WHITE);
    }
}
