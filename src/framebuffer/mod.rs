//! # Frame Buffers and Drawing
//!
//! Provides the pixel surfaces the application renders into.
//!
//! ## Modules
//!
//! - `buffer`: `FrameBuffer` over an external-memory region, plus its `BufferRole`
//! - `canvas`: `Canvas`, an embedded-graphics draw target with pen selection
//! - `color`: `Color` and the packed RGB565 `Pen`
//!
//! ## Ownership
//!
//! At any instant each buffer is either writable by the application,
//! pending (handed to the streamer, waiting for vsync) or streaming
//! (being read out to the panel). Only writable buffers may be drawn
//! into; debug builds assert it on every canvas and bulk write.

pub mod buffer;
pub mod canvas;
pub mod color;

pub use buffer::{BufferId, BufferRole, FrameBuffer};
pub use canvas::Canvas;
pub use color::{Color, Pen};
