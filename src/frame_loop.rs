//! # Frame Loop
//!
//! One iteration, in order:
//!
//! ```text
//! poll input -> advance scene -> clear stale pixels -> render
//!            -> present (designate + wait for vsync) -> log timings
//! ```
//!
//! Everything drawn in iteration N lands in the writable buffer before it
//! is designated, and nothing touches that buffer again until it comes
//! back round as writable.
use alloc::vec::Vec;
use core::str::FromStr;

use embedded_graphics::primitives::Rectangle;

use crate::clock::{Elapsed, FrameClock, StageTimings};
use crate::display::{Roles, SwapChain};
use crate::error::ConfigError;
use crate::framebuffer::Pen;
use crate::input::{Contact, PointerInput};
use crate::scene::Scene;

/// How the writable buffer is cleaned before drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    /// Draw over whatever is there. Leaves trails.
    None,
    /// Restore only the rectangles the scene reports as damaged
    #[default]
    DamageRects,
    /// Bulk fill of the whole buffer
    BulkFill,
    /// Clear through the drawing surface
    CanvasClear,
}

impl FromStr for ClearPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("none") => Ok(ClearPolicy::None),
            s if s.eq_ignore_ascii_case("damage") => Ok(ClearPolicy::DamageRects),
            s if s.eq_ignore_ascii_case("fill") => Ok(ClearPolicy::BulkFill),
            s if s.eq_ignore_ascii_case("canvas") => Ok(ClearPolicy::CanvasClear),
            _ => Err(ConfigError::UnknownPolicy),
        }
    }
}

/// What one `step()` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    /// Roles after the swap
    pub roles: Roles,
    pub contacts: u8,
    pub cleared: ClearPolicy,
    pub timings: StageTimings,
}

pub struct FrameLoop<S, I, C> {
    chain: SwapChain,
    scene: S,
    input: I,
    clock: C,
    policy: ClearPolicy,
    background: Pen,
    damage: Vec<Rectangle>,
    frame: u64,
}

impl<S, I, C> FrameLoop<S, I, C>
where
    S: Scene,
    I: PointerInput,
    C: FrameClock,
{
    pub fn new(chain: SwapChain, scene: S, input: I, clock: C, policy: ClearPolicy, background: Pen) -> Self {
        log::info!("frame loop: {} buffers, clear {:?}", chain.len(), policy);
        Self {
            chain,
            scene,
            input,
            clock,
            policy,
            background,
            damage: Vec::new(),
            frame: 0,
        }
    }

    pub fn step(&mut self) -> FrameReport {
        let mut timings = StageTimings::default();
        let mut lap = Elapsed::start(&self.clock);

        let (contacts, sample) = match self.input.poll() {
            Ok(n) => (n, self.input.contacts()),
            Err(e) => {
                log::warn!("input: {}", e);
                (0, [Contact::idle(0), Contact::idle(1)])
            }
        };
        if self.input.is_present() {
            timings.input = Some(lap.lap_us());
        }

        self.scene.advance(&sample);
        timings.update = lap.lap_us();

        let policy = if self.scene.take_full_clear() {
            ClearPolicy::BulkFill
        } else {
            self.policy
        };
        self.damage.clear();
        if policy == ClearPolicy::DamageRects {
            self.scene.damage(&mut self.damage);
        }
        clear_writable(&mut self.chain, policy, self.background, &self.damage);
        timings.clear = lap.lap_us();

        self.scene.render(&mut self.chain.canvas());
        timings.draw = lap.lap_us();

        let roles = self.chain.present();
        timings.vsync = lap.lap_us();

        self.frame += 1;
        log::info!("{}", timings);
        FrameReport {
            frame: self.frame,
            roles,
            contacts,
            cleared: policy,
            timings,
        }
    }

    /// Step forever
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    pub fn chain(&self) -> &SwapChain {
        &self.chain
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn policy(&self) -> ClearPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ClearPolicy) {
        self.policy = policy;
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    pub fn into_chain(self) -> SwapChain {
        self.chain
    }
}

fn clear_writable(chain: &mut SwapChain, policy: ClearPolicy, background: Pen, damage: &[Rectangle]) {
    match policy {
        ClearPolicy::None => {}
        ClearPolicy::DamageRects => {
            let buffer = chain.back_mut();
            for area in damage {
                buffer.fill_rect(area, background);
            }
        }
        ClearPolicy::BulkFill => chain.back_mut().fill(background),
        ClearPolicy::CanvasClear => {
            let mut canvas = chain.canvas();
            canvas.set_pen(background);
            canvas.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names_parse() {
        assert_eq!("none".parse(), Ok(ClearPolicy::None));
        assert_eq!("Damage".parse(), Ok(ClearPolicy::DamageRects));
        assert_eq!(" fill ".parse(), Ok(ClearPolicy::BulkFill));
        assert_eq!("canvas".parse(), Ok(ClearPolicy::CanvasClear));
        assert_eq!("memset".parse::<ClearPolicy>(), Err(ConfigError::UnknownPolicy));
        assert_eq!(ClearPolicy::default(), ClearPolicy::DamageRects);
    }
}
