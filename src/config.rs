//! # Configuration
//!
//! Panel, link and demo settings are plain values chosen at start-up and
//! validated once, not build-time switches.
//!
//! | Setting           | Presto default |
//! |-------------------|----------------|
//! | panel             | 480x480, rotation 0 |
//! | link pins         | CS 28, CLK 26, DAT 27, no DC, backlight 45 |
//! | line cache        | 3 rows (2880 bytes) |
//! | frame buffers     | 2 |
//! | pipeline depth    | buffer count (2) |
//! | clear policy      | damage rectangles |

use core::fmt;

use crate::error::ConfigError;
use crate::frame_loop::ClearPolicy;
use crate::framebuffer::Pen;

/// Most frame buffers a swap chain rotates through
pub const MAX_BUFFERS: usize = 4;
/// Deepest buffer pipeline the damage history can follow
pub const MAX_PIPELINE_DEPTH: usize = MAX_BUFFERS;
/// Upper bound on rows held in the on-chip line cache
pub const MAX_CACHE_LINES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    /// Memory access control byte (MY/MX/MV bits) for this orientation
    pub const fn madctl(self) -> u8 {
        match self {
            Rotation::Rotate0 => 0x00,
            Rotation::Rotate90 => 0x60,
            Rotation::Rotate180 => 0xC0,
            Rotation::Rotate270 => 0xA0,
        }
    }
}

/// Pin assignment of the serial display link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPins {
    pub cs: u8,
    pub clk: u8,
    pub dat: u8,
    pub dc: Option<u8>,
    pub backlight: u8,
}

impl fmt::Display for LinkPins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cs={} clk={} dat={} ", self.cs, self.clk, self.dat)?;
        match self.dc {
            Some(dc) => write!(f, "dc={} ", dc)?,
            None => write!(f, "dc=- ")?,
        }
        write!(f, "bl={}", self.backlight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
    pub pins: LinkPins,
    /// Rows staged in on-chip RAM per scan step
    pub cache_lines: usize,
    pub buffer_count: usize,
    /// Override for `pipeline_depth()`, for panels whose scan-out holds
    /// on to a buffer longer than one swap. Measure on new hardware.
    pub pipeline_depth: Option<usize>,
    pub refresh_hz: u32,
}

impl DisplayConfig {
    /// Pimoroni Presto: 480x480 panel, two PSRAM buffers
    pub const fn presto() -> Self {
        Self {
            width: 480,
            height: 480,
            rotation: Rotation::Rotate0,
            pins: LinkPins {
                cs: 28,
                clk: 26,
                dat: 27,
                dc: None,
                backlight: 45,
            },
            cache_lines: 3,
            buffer_count: 2,
            pipeline_depth: None,
            refresh_hz: 60,
        }
    }

    /// Same timing and pins as `presto()` with a different panel size
    pub const fn with_size(width: u32, height: u32) -> Self {
        let mut config = Self::presto();
        config.width = width;
        config.height = height;
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.cache_lines == 0
            || self.cache_lines > MAX_CACHE_LINES
            || self.cache_lines > self.height as usize
        {
            return Err(ConfigError::CacheLines(self.cache_lines));
        }
        if self.buffer_count < 2 || self.buffer_count > MAX_BUFFERS {
            return Err(ConfigError::BufferCount(self.buffer_count));
        }
        let depth = self.pipeline_depth();
        if depth == 0 || depth > MAX_PIPELINE_DEPTH {
            return Err(ConfigError::PipelineDepth(depth));
        }
        Ok(())
    }

    /// Iterations by which the writable buffer lags the newest frame.
    ///
    /// Buffers are reused round-robin, so the one handed out for drawing
    /// last held the image from `buffer_count` iterations ago.
    pub fn pipeline_depth(&self) -> usize {
        self.pipeline_depth.unwrap_or(self.buffer_count)
    }

    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes of on-chip RAM the line cache needs
    pub fn cache_bytes(&self) -> usize {
        self.width as usize * self.cache_lines * core::mem::size_of::<u16>()
    }

    pub fn frame_period_us(&self) -> u64 {
        1_000_000 / u64::from(self.refresh_hz.max(1))
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::presto()
    }
}

/// Bouncing-sprite demo parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoConfig {
    pub sprite_count: usize,
    /// Square sprite edge in pixels
    pub footprint: u32,
    pub clear_policy: ClearPolicy,
    pub background: Pen,
    pub seed: u32,
}

impl DemoConfig {
    pub fn validate(&self, display: &DisplayConfig) -> Result<(), ConfigError> {
        if self.footprint == 0 || self.footprint >= display.width || self.footprint >= display.height {
            return Err(ConfigError::FootprintTooLarge {
                footprint: self.footprint,
                width: display.width,
                height: display.height,
            });
        }
        Ok(())
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sprite_count: 100,
            footprint: 16,
            clear_policy: ClearPolicy::DamageRects,
            background: Pen::BLACK,
            seed: 0x2545_F491,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn presto_preset_is_valid() {
        let config = DisplayConfig::presto();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.cache_bytes(), 2880);
        assert_eq!(config.pixels(), 480 * 480);
        assert_eq!(config.pipeline_depth(), 2);
        assert_eq!(config.pins.to_string(), "cs=28 clk=26 dat=27 dc=- bl=45");
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = DisplayConfig::presto();
        config.buffer_count = 1;
        assert_eq!(config.validate(), Err(ConfigError::BufferCount(1)));

        let mut config = DisplayConfig::presto();
        config.buffer_count = MAX_BUFFERS + 1;
        assert_eq!(config.validate(), Err(ConfigError::BufferCount(5)));

        let mut config = DisplayConfig::presto();
        config.pipeline_depth = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::PipelineDepth(0)));

        let mut config = DisplayConfig::with_size(16, 2);
        config.cache_lines = 3;
        assert_eq!(config.validate(), Err(ConfigError::CacheLines(3)));

        assert_eq!(DisplayConfig::with_size(0, 10).validate(), Err(ConfigError::ZeroDimension));
    }

    #[test]
    fn footprint_must_fit() {
        let display = DisplayConfig::with_size(32, 32);
        let mut demo = DemoConfig::default();
        assert_eq!(demo.validate(&display), Ok(()));
        demo.footprint = 32;
        assert!(demo.validate(&display).is_err());
    }
}
