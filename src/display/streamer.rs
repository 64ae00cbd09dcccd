//! Continuous scan-out of the streaming buffer
//!
//! [`DisplayStreamer::initialize`] splits the display into two halves that
//! share a small block of atomics:
//!
//! - [`DisplayStreamer`]: the application side. Designates the next buffer
//!   and waits for vsync.
//! - [`ScanEngine`]: the hardware side. Pulls `cache_lines` rows at a time
//!   from the streaming buffer through the line cache into the link. On
//!   the board it is serviced from the DMA-complete interrupt; on the host
//!   from a thread (see `display::sim`).
//!
//! A designation only takes effect when the engine wraps from the last
//! row back to row 0, so a frame on the panel always comes from exactly
//! one buffer.
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use super::link::PanelLink;
use crate::config::DisplayConfig;
use crate::error::{ConfigError, InitError, LinkError};
use crate::framebuffer::{BufferId, BufferRole, FrameBuffer};

const NO_BUFFER: usize = usize::MAX;

#[derive(Debug)]
struct ScanShared {
    streaming: AtomicUsize,
    pending: AtomicUsize,
    frames: AtomicU32,
    stopped: AtomicBool,
}

/// Result of one [`ScanEngine::service`] step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Rows went out, the frame is not finished yet
    Streaming,
    /// The last rows of a frame went out; any pending swap was applied
    FrameDone,
    /// `shutdown()` was called; the panel is off
    Stopped,
}

/// Application half of the streamer
#[derive(Debug)]
pub struct DisplayStreamer {
    shared: Arc<ScanShared>,
    buffers: Vec<FrameBuffer>,
    awaited: AtomicUsize,
}

/// Hardware half of the streamer
pub struct ScanEngine<L> {
    link: L,
    shared: Arc<ScanShared>,
    buffers: Vec<FrameBuffer>,
    cache: Box<[u16]>,
    next_row: u32,
    height: u32,
    powered: bool,
}

impl DisplayStreamer {
    /// Bring up the link and start streaming from `initial`.
    ///
    /// Buffer ids must match their position in `buffers`.
    pub fn initialize<L: PanelLink>(
        config: &DisplayConfig,
        mut link: L,
        buffers: &[FrameBuffer],
        initial: BufferId,
    ) -> Result<(Self, ScanEngine<L>), InitError> {
        config.validate()?;
        if buffers.len() < 2 {
            return Err(ConfigError::BufferCount(buffers.len()).into());
        }
        for (index, buffer) in buffers.iter().enumerate() {
            if buffer.id() != index {
                return Err(ConfigError::UnknownBuffer(buffer.id()).into());
            }
            if buffer.width() != config.width || buffer.height() != config.height {
                return Err(ConfigError::BufferSize {
                    width: buffer.width(),
                    height: buffer.height(),
                }
                .into());
            }
        }
        let first = buffers
            .get(initial)
            .ok_or(ConfigError::UnknownBuffer(initial))?;

        link.power_on(config)?;
        log::info!(
            "display: {}x{} {:?}, link {}",
            config.width,
            config.height,
            config.rotation,
            config.pins
        );
        log::info!(
            "display: line cache {} rows, {} bytes",
            config.cache_lines,
            config.cache_bytes()
        );

        first.set_role(BufferRole::Streaming);
        let shared = Arc::new(ScanShared {
            streaming: AtomicUsize::new(initial),
            pending: AtomicUsize::new(NO_BUFFER),
            frames: AtomicU32::new(0),
            stopped: AtomicBool::new(false),
        });

        let streamer = Self {
            shared: Arc::clone(&shared),
            buffers: buffers.iter().map(FrameBuffer::share).collect(),
            awaited: AtomicUsize::new(NO_BUFFER),
        };
        let engine = ScanEngine {
            link,
            shared,
            buffers: buffers.iter().map(FrameBuffer::share).collect(),
            cache: vec![0u16; config.width as usize * config.cache_lines].into_boxed_slice(),
            next_row: 0,
            height: config.height,
            powered: true,
        };
        Ok((streamer, engine))
    }

    /// Hand `buffer` to the engine. It becomes the streaming buffer at the
    /// next frame boundary; until then it must not be written.
    ///
    /// Designating again before the boundary replaces the earlier choice.
    pub fn designate_next_buffer(&self, buffer: &FrameBuffer) {
        let id = buffer.id();
        debug_assert!(
            self.buffers.get(id).is_some_and(|b| b.same_memory(buffer)),
            "frame buffer {} does not belong to this streamer",
            id
        );
        debug_assert!(
            buffer.role() != BufferRole::Pending,
            "frame buffer {} designated twice",
            id
        );

        if buffer.role() == BufferRole::Writable {
            buffer.set_role(BufferRole::Pending);
        }
        self.awaited.store(id, Ordering::Release);
        let replaced = self.shared.pending.swap(id, Ordering::AcqRel);
        if replaced != NO_BUFFER && replaced != id {
            if let Some(old) = self.buffers.get(replaced) {
                old.set_role(BufferRole::Writable);
            }
        }
    }

    /// Block until the next frame boundary has passed and the last
    /// designated buffer is streaming. Returns at once after `shutdown()`.
    pub fn wait_for_vsync(&self) {
        let start = self.shared.frames.load(Ordering::Acquire);
        let awaited = self.awaited.swap(NO_BUFFER, Ordering::AcqRel);
        loop {
            if self.shared.stopped.load(Ordering::Acquire) {
                return;
            }
            let boundary = self.shared.frames.load(Ordering::Acquire) != start;
            let swapped =
                awaited == NO_BUFFER || self.shared.streaming.load(Ordering::Acquire) == awaited;
            if boundary && swapped {
                return;
            }
            relax();
        }
    }

    /// Stop streaming. The engine powers the panel down on its next step.
    pub fn shutdown(&self) {
        self.shared.stopped.store(true, Ordering::Release);
        log::info!("display: shutdown after {} frames", self.frame_count());
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }

    /// Frames fully transmitted since start-up
    pub fn frame_count(&self) -> u32 {
        self.shared.frames.load(Ordering::Acquire)
    }

    pub fn streaming(&self) -> BufferId {
        self.shared.streaming.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> Option<BufferId> {
        match self.shared.pending.load(Ordering::Acquire) {
            NO_BUFFER => None,
            id => Some(id),
        }
    }
}

impl<L: PanelLink> ScanEngine<L> {
    /// Push the next band of rows to the panel.
    ///
    /// On a link error the current frame is abandoned and the next call
    /// starts again from row 0, without applying a pending swap.
    pub fn service(&mut self) -> Result<ScanStatus, LinkError> {
        if self.shared.stopped.load(Ordering::Acquire) {
            if self.powered {
                self.powered = false;
                self.link.power_off()?;
                log::info!("display: link powered off");
            }
            return Ok(ScanStatus::Stopped);
        }

        if self.next_row == 0 {
            self.link.begin_frame()?;
        }

        let streaming = self.shared.streaming.load(Ordering::Acquire);
        let Some(source) = self.buffers.get(streaming) else {
            return Err(LinkError::Stopped);
        };
        let rows = source.read_rows(self.next_row, &mut self.cache);
        let pixels = rows * source.width() as usize;
        if let Err(e) = self.link.write_pixels(&self.cache[..pixels]) {
            self.next_row = 0;
            return Err(e);
        }

        self.next_row += rows as u32;
        if self.next_row < self.height {
            return Ok(ScanStatus::Streaming);
        }
        self.next_row = 0;
        self.swap_at_boundary();
        self.shared.frames.fetch_add(1, Ordering::AcqRel);
        Ok(ScanStatus::FrameDone)
    }

    /// Service until one whole frame has gone out
    pub fn run_frame(&mut self) -> Result<ScanStatus, LinkError> {
        loop {
            match self.service()? {
                ScanStatus::Streaming => continue,
                status => return Ok(status),
            }
        }
    }

    fn swap_at_boundary(&mut self) {
        let next = self.shared.pending.swap(NO_BUFFER, Ordering::AcqRel);
        let Some(incoming) = self.buffers.get(next) else {
            return;
        };
        let current = self.shared.streaming.load(Ordering::Acquire);
        if next != current {
            if let Some(outgoing) = self.buffers.get(current) {
                outgoing.set_role(BufferRole::Writable);
            }
        }
        incoming.set_role(BufferRole::Streaming);
        self.shared.streaming.store(next, Ordering::Release);
        log::trace!("scan: buffer {} -> {}", current, next);
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_link(self) -> L {
        self.link
    }

    /// Bytes held by the line cache
    pub fn cache_bytes(&self) -> usize {
        self.cache.len() * core::mem::size_of::<u16>()
    }

    pub fn frame_count(&self) -> u32 {
        self.shared.frames.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }
}

#[inline]
fn relax() {
    core::hint::spin_loop();
    #[cfg(any(test, feature = "std"))]
    std::thread::yield_now();
}
