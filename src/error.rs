//! # Error Types
//!
//! Every fallible boot or bus operation reports one of these enums.
//! `InitError` is the boot-level wrapper: anything that stops the
//! display from coming up converts into it with `?`.

use core::fmt;

/// External memory allocation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    OutOfMemory,
    InvalidAddress,
    InvalidSize,
    Overflow,
}

/// Physical display link failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The SPI transfer itself failed
    Bus,
    /// A control pin (backlight, reset) could not be driven
    Pin,
    /// Pixels were pushed before `power_on`
    NotPowered,
    /// The streamer was shut down
    Stopped,
}

/// Touch controller failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchError {
    Bus,
}

/// Rejected configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroDimension,
    CacheLines(usize),
    BufferCount(usize),
    PipelineDepth(usize),
    /// A buffer handed to the streamer that it was not set up with
    UnknownBuffer(usize),
    /// Buffer geometry differs from the panel geometry
    BufferSize { width: u32, height: u32 },
    FootprintTooLarge { footprint: u32, width: u32, height: u32 },
    /// Clear policy name that does not parse
    UnknownPolicy,
}

/// Boot-time failure. None of these are recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    Config(ConfigError),
    Alloc(AllocError),
    Link(LinkError),
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory => write!(f, "external memory exhausted"),
            AllocError::InvalidAddress => write!(f, "invalid memory window address"),
            AllocError::InvalidSize => write!(f, "invalid allocation size"),
            AllocError::Overflow => write!(f, "address arithmetic overflow"),
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Bus => write!(f, "display bus transfer failed"),
            LinkError::Pin => write!(f, "display control pin failed"),
            LinkError::NotPowered => write!(f, "display link not powered"),
            LinkError::Stopped => write!(f, "display streamer stopped"),
        }
    }
}

impl fmt::Display for TouchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TouchError::Bus => write!(f, "touch controller bus transfer failed"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDimension => write!(f, "display dimensions must be non-zero"),
            ConfigError::CacheLines(n) => write!(f, "cache lines out of range: {}", n),
            ConfigError::BufferCount(n) => write!(f, "need at least two frame buffers, got {}", n),
            ConfigError::PipelineDepth(n) => write!(f, "pipeline depth out of range: {}", n),
            ConfigError::UnknownBuffer(id) => write!(f, "unknown frame buffer {}", id),
            ConfigError::BufferSize { width, height } => {
                write!(f, "frame buffer is {}x{}, panel differs", width, height)
            }
            ConfigError::FootprintTooLarge { footprint, width, height } => write!(
                f,
                "footprint {} does not fit a {}x{} buffer",
                footprint, width, height
            ),
            ConfigError::UnknownPolicy => {
                write!(f, "unknown clear policy (expected none, damage, fill or canvas)")
            }
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Config(e) => write!(f, "config: {}", e),
            InitError::Alloc(e) => write!(f, "frame buffer allocation: {}", e),
            InitError::Link(e) => write!(f, "display link: {}", e),
        }
    }
}

impl core::error::Error for AllocError {}
impl core::error::Error for LinkError {}
impl core::error::Error for TouchError {}
impl core::error::Error for ConfigError {}
impl core::error::Error for InitError {}

impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self {
        InitError::Config(e)
    }
}

impl From<AllocError> for InitError {
    fn from(e: AllocError) -> Self {
        InitError::Alloc(e)
    }
}

impl From<LinkError> for InitError {
    fn from(e: LinkError) -> Self {
        InitError::Link(e)
    }
}
