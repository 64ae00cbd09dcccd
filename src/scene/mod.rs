//! # Scenes
//!
//! What gets drawn each frame. The frame loop drives a [`Scene`] through
//! the same four calls every iteration:
//!
//! 1. `advance` with this frame's touch sample
//! 2. `take_full_clear`, then `damage` when the loop clears by rectangles
//! 3. the loop restores the damage to the background
//! 4. `render` into the writable buffer
//!
//! Scenes must remember that the writable buffer is `pipeline_depth`
//! frames behind: whatever they erase or replay has to cover that gap.

pub mod paint;
pub mod rng;
pub mod sprites;

use alloc::vec::Vec;

use embedded_graphics::primitives::Rectangle;

pub use paint::{Oscillator, TouchPaint};
pub use rng::XorShift32;
pub use sprites::{BouncingSprites, Sprite};

use crate::framebuffer::Canvas;
use crate::input::{Contact, MAX_CONTACTS};

pub trait Scene {
    /// Step the model once
    fn advance(&mut self, contacts: &[Contact; MAX_CONTACTS]);

    /// Rectangles of the writable buffer that hold stale content
    fn damage(&self, _out: &mut Vec<Rectangle>) {}

    fn render(&mut self, canvas: &mut Canvas<'_>);

    /// Whether this frame must start from a fully cleared buffer.
    /// Consumed by the call.
    fn take_full_clear(&mut self) -> bool {
        false
    }
}
