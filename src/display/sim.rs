//! Host stand-ins for the scan-out hardware
//!
//! On the board the engine is driven by the DMA-complete interrupt. Here a
//! named thread plays that part and [`CaptureLink`] plays the panel.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use std::vec::Vec;

use super::link::PanelLink;
use super::streamer::{ScanEngine, ScanStatus};
use crate::config::DisplayConfig;
use crate::error::LinkError;

/// Panel that counts what it receives and keeps the last few frames
#[derive(Debug, Default)]
pub struct CaptureLink {
    keep: usize,
    frame_pixels: usize,
    current: Vec<u16>,
    /// Pixels received since the last `begin_frame`
    progress: usize,
    frames: VecDeque<Vec<u16>>,
    frames_seen: u64,
    pixels_seen: u64,
    powered: bool,
}

impl CaptureLink {
    /// `keep` is how many completed frames to hold on to; 0 only counts
    pub fn new(keep: usize) -> Self {
        Self {
            keep,
            ..Self::default()
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn pixels_seen(&self) -> u64 {
        self.pixels_seen
    }

    /// Most recent completed frame, row-major
    pub fn last_frame(&self) -> Option<&[u16]> {
        self.frames.back().map(Vec::as_slice)
    }

    pub fn frames(&self) -> impl Iterator<Item = &[u16]> {
        self.frames.iter().map(Vec::as_slice)
    }
}

impl PanelLink for CaptureLink {
    fn power_on(&mut self, config: &DisplayConfig) -> Result<(), LinkError> {
        self.frame_pixels = config.pixels();
        self.powered = true;
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<(), LinkError> {
        if !self.powered {
            return Err(LinkError::NotPowered);
        }
        self.current.clear();
        self.progress = 0;
        Ok(())
    }

    fn write_pixels(&mut self, pixels: &[u16]) -> Result<(), LinkError> {
        if !self.powered {
            return Err(LinkError::NotPowered);
        }
        self.pixels_seen += pixels.len() as u64;
        self.progress += pixels.len();
        if self.keep > 0 {
            self.current.extend_from_slice(pixels);
        }
        if self.progress == self.frame_pixels {
            self.progress = 0;
            self.frames_seen += 1;
            if self.keep > 0 {
                if self.frames.len() == self.keep {
                    self.frames.pop_front();
                }
                self.frames.push_back(std::mem::take(&mut self.current));
            }
        }
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), LinkError> {
        self.powered = false;
        Ok(())
    }
}

/// Scan-out thread started by [`spawn_scanout`]
pub struct ScanoutThread<L> {
    halt: Arc<AtomicBool>,
    handle: JoinHandle<ScanEngine<L>>,
}

/// Service `engine` on its own thread, resting `frame_period` after each
/// completed frame to approximate the panel refresh rate.
pub fn spawn_scanout<L>(
    mut engine: ScanEngine<L>,
    frame_period: Duration,
) -> std::io::Result<ScanoutThread<L>>
where
    L: PanelLink + Send + 'static,
{
    let halt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&halt);
    let handle = thread::Builder::new()
        .name("scanout".into())
        .spawn(move || {
            while !flag.load(Ordering::Acquire) {
                match engine.service() {
                    Ok(ScanStatus::Streaming) => {}
                    Ok(ScanStatus::FrameDone) => {
                        if !frame_period.is_zero() {
                            thread::sleep(frame_period);
                        }
                    }
                    Ok(ScanStatus::Stopped) => break,
                    Err(e) => log::warn!("scan: {}, restarting frame", e),
                }
            }
            // a shutdown may have raced the halt flag
            if engine.is_stopped() {
                if let Err(e) = engine.service() {
                    log::warn!("scan: power off failed: {}", e);
                }
            }
            engine
        })?;
    log::debug!("scan: thread started, period {:?}", frame_period);
    Ok(ScanoutThread { halt, handle })
}

impl<L> ScanoutThread<L> {
    /// Stop the thread and take the engine back
    pub fn join(self) -> ScanEngine<L> {
        self.halt.store(true, Ordering::Release);
        match self.handle.join() {
            Ok(engine) => engine,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_keeps_the_newest_frames() {
        let mut link = CaptureLink::new(2);
        link.power_on(&DisplayConfig::with_size(2, 1)).unwrap();
        for frame in 0..3u16 {
            link.begin_frame().unwrap();
            link.write_pixels(&[frame, frame]).unwrap();
        }
        assert_eq!(link.frames_seen(), 3);
        assert_eq!(link.pixels_seen(), 6);
        let kept: Vec<_> = link.frames().map(|f| f[0]).collect();
        assert_eq!(kept, [1, 2]);
        assert_eq!(link.last_frame(), Some(&[2u16, 2][..]));
    }

    #[test]
    fn restarted_frame_is_counted_from_its_own_start() {
        let mut link = CaptureLink::new(1);
        link.power_on(&DisplayConfig::with_size(2, 2)).unwrap();
        link.begin_frame().unwrap();
        link.write_pixels(&[9, 9]).unwrap();

        // the engine gave up halfway and starts over
        link.begin_frame().unwrap();
        link.write_pixels(&[1, 2]).unwrap();
        assert_eq!(link.frames_seen(), 0);
        link.write_pixels(&[3, 4]).unwrap();
        assert_eq!(link.frames_seen(), 1);
        assert_eq!(link.last_frame(), Some(&[1u16, 2, 3, 4][..]));
        assert_eq!(link.pixels_seen(), 6);
    }

    #[test]
    fn capture_rejects_writes_when_off() {
        let mut link = CaptureLink::new(0);
        assert_eq!(link.begin_frame(), Err(LinkError::NotPowered));
    }
}
