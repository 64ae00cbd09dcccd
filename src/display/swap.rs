//! Swap chain: the application's view of the frame buffers
use alloc::vec::Vec;

use super::link::PanelLink;
use super::streamer::{DisplayStreamer, ScanEngine};
use crate::config::DisplayConfig;
use crate::error::InitError;
use crate::framebuffer::{BufferId, Canvas, FrameBuffer, Pen};
use crate::memory::ExternalMemory;

/// Which buffer is where after a present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles {
    pub writable: BufferId,
    pub streaming: BufferId,
}

/// Owns every frame buffer and rotates them round-robin.
///
/// Buffer 0 streams first and buffer 1 is the first one drawn. Each
/// `present()` hands the writable buffer over and moves on to the next.
#[derive(Debug)]
pub struct SwapChain {
    streamer: DisplayStreamer,
    buffers: Vec<FrameBuffer>,
    writable: BufferId,
    streaming: BufferId,
}

impl SwapChain {
    /// Allocate `config.buffer_count` buffers from `memory`, clear them to
    /// `background` and start streaming buffer 0.
    pub fn allocate<M, L>(
        memory: &mut M,
        config: &DisplayConfig,
        background: Pen,
        link: L,
    ) -> Result<(Self, ScanEngine<L>), InitError>
    where
        M: ExternalMemory,
        L: PanelLink,
    {
        config.validate()?;
        if let Some(capacity) = memory.capacity() {
            log::info!("memory: external window {} KiB", capacity / 1024);
        }

        let mut buffers = Vec::with_capacity(config.buffer_count);
        for id in 0..config.buffer_count {
            let region = memory.allocate_uncached(config.pixels())?;
            let mut buffer = FrameBuffer::new(id, config.width, config.height, region)?;
            buffer.fill(background);
            log::info!(
                "memory: frame buffer {} at {:#010x}, {} bytes",
                id,
                buffer.base_addr(),
                config.pixels() * 2
            );
            buffers.push(buffer);
        }

        let (streamer, engine) = DisplayStreamer::initialize(config, link, &buffers, 0)?;
        let chain = Self {
            streamer,
            buffers,
            writable: 1,
            streaming: 0,
        };
        Ok((chain, engine))
    }

    pub fn roles(&self) -> Roles {
        Roles {
            writable: self.writable,
            streaming: self.streaming,
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.back().width()
    }

    pub fn height(&self) -> u32 {
        self.back().height()
    }

    /// The buffer the application may draw into
    pub fn back(&self) -> &FrameBuffer {
        &self.buffers[self.writable]
    }

    pub fn back_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffers[self.writable]
    }

    /// The buffer being scanned out. Read-only.
    pub fn front(&self) -> &FrameBuffer {
        &self.buffers[self.streaming]
    }

    pub fn buffer(&self, id: BufferId) -> Option<&FrameBuffer> {
        self.buffers.get(id)
    }

    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas::new(self.back_mut())
    }

    pub fn streamer(&self) -> &DisplayStreamer {
        &self.streamer
    }

    /// Hand the finished back buffer to the streamer and block until it is
    /// on screen. The next buffer in the ring becomes writable.
    pub fn present(&mut self) -> Roles {
        let finished = self.writable;
        self.streamer.designate_next_buffer(&self.buffers[finished]);
        self.streamer.wait_for_vsync();
        self.streaming = finished;
        self.writable = (finished + 1) % self.buffers.len();
        self.roles()
    }

    /// Stop the streamer; the engine powers the panel off on its next step
    pub fn shutdown(&self) {
        self.streamer.shutdown();
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::display::sim::{spawn_scanout, CaptureLink};
    use crate::framebuffer::BufferRole;
    use crate::memory::HeapMemory;
    use core::time::Duration;

    fn config(buffers: usize) -> DisplayConfig {
        let mut config = DisplayConfig::with_size(8, 6);
        config.buffer_count = buffers;
        config
    }

    #[test]
    fn allocate_clears_every_buffer() {
        let mut mem = HeapMemory::new();
        let white = Pen::WHITE;
        let (chain, _engine) =
            SwapChain::allocate(&mut mem, &config(3), white, CaptureLink::new(0)).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(mem.allocated(), 3 * 8 * 6 * 2);
        for id in 0..3 {
            assert!(chain.buffer(id).unwrap().is_uniform(white));
        }
        assert_eq!(chain.roles(), Roles { writable: 1, streaming: 0 });
        assert_eq!(chain.front().role(), BufferRole::Streaming);
    }

    #[test]
    fn present_rotates_round_robin() {
        let mut mem = HeapMemory::new();
        let (mut chain, engine) =
            SwapChain::allocate(&mut mem, &config(3), Pen::BLACK, CaptureLink::new(0)).unwrap();
        let scanout = spawn_scanout(engine, Duration::ZERO).unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            let roles = chain.present();
            assert_ne!(roles.writable, roles.streaming);
            assert_eq!(chain.back().role(), BufferRole::Writable);
            assert_eq!(chain.front().role(), BufferRole::Streaming);
            seen.push(roles.streaming);
        }
        assert_eq!(seen, [1, 2, 0, 1]);

        chain.shutdown();
        let engine = scanout.join();
        assert!(!engine.link().is_powered());
    }
}
