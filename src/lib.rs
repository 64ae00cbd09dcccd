//! # presto-scanout
//!
//! Double-buffered rendering for a 480x480 SPI panel whose frame buffers
//! live in slow external PSRAM and are streamed to the glass through a
//! few rows of on-chip cache.
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐   poll    ┌───────────┐
//!  │ PointerInput │ ────────> │           │  advance / damage / render
//!  └──────────────┘           │ FrameLoop │ ─────────────────────────┐
//!  ┌──────────────┐   laps    │           │                          v
//!  │  FrameClock  │ ────────> │           │                     ┌─────────┐
//!  └──────────────┘           └─────┬─────┘                     │  Scene  │
//!                                   │ present()                 └────┬────┘
//!                                   v                                │ Canvas
//!                             ┌───────────┐   writable buffer   <────┘
//!                             │ SwapChain │
//!                             └─────┬─────┘
//!                designate / vsync  │
//!                                   v
//!                         ┌─────────────────┐  atomics  ┌────────────┐  rows  ┌───────────┐
//!                         │ DisplayStreamer │ <───────> │ ScanEngine │ ─────> │ PanelLink │
//!                         └─────────────────┘           └────────────┘        └───────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: panel, link and demo settings
//! - `memory`: uncached external memory regions
//! - `framebuffer`: frame buffers, buffer roles, the drawing canvas
//! - `display`: panel link, scan engine, swap chain
//! - `input`: touch contacts and the FT6236 driver
//! - `scene`: bouncing sprites and touch paint
//! - `frame_loop`: one iteration of input, update, clear, draw, present
//! - `clock`: stopwatch and stage timings
//! - `logging`: serial `log` backend for targets without `std`
//!
//! The crate is `no_std` + `alloc`. The `std` feature (on by default) adds
//! the host scan-out thread, a wall clock and the runner binary.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod frame_loop;
pub mod framebuffer;
pub mod input;
pub mod logging;
pub mod memory;
pub mod scene;

pub use config::{DemoConfig, DisplayConfig};
pub use error::{AllocError, ConfigError, InitError, LinkError, TouchError};
pub use frame_loop::{ClearPolicy, FrameLoop, FrameReport};
