//! # Display Output
//!
//! Everything between a finished frame buffer and the glass.
//!
//! ## Modules
//!
//! - `link`: the `PanelLink` trait and the SPI panel driver
//! - `streamer`: `DisplayStreamer` (application side) and `ScanEngine`
//!   (hardware side) of the scan-out
//! - `swap`: `SwapChain`, which owns the buffers and rotates their roles
//! - `sim`: host scan-out thread and capture link (`std` only)
//!
//! ## Buffer Swap
//!
//! ```text
//!  application                         scan engine
//!  -----------                         -----------
//!  draw into writable buffer           stream rows of front buffer
//!  designate_next_buffer(back) ---->   (pending, frame keeps going)
//!  wait_for_vsync()                    last row: pending -> streaming,
//!        |                                       old front -> writable
//!        +<----------------------------  frame counter += 1
//!  draw into the next writable buffer
//! ```

pub mod link;
#[cfg(feature = "std")]
pub mod sim;
pub mod streamer;
pub mod swap;

pub use link::{PanelLink, SpiPanel};
pub use streamer::{DisplayStreamer, ScanEngine, ScanStatus};
pub use swap::{Roles, SwapChain};
