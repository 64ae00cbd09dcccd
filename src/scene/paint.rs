//! Finger painting with mirrored circles
//!
//! Dragging one finger stamps four circles mirrored across both axes;
//! radius and color drift a little with every stamp. Touching with a
//! second finger wipes the panel and picks new colors.
use alloc::collections::VecDeque;

use embedded_graphics::prelude::*;

use super::rng::XorShift32;
use super::Scene;
use crate::framebuffer::{Canvas, Color, Pen};
use crate::input::{Contact, MAX_CONTACTS};

pub const BANNER: &str = "Draw with finger, tap with two fingers one above the other to clear.";

pub const MIN_RADIUS: i16 = 10;
pub const MAX_RADIUS: i16 = 50;

/// Value that drifts by `step` and turns around at its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oscillator {
    value: i16,
    step: i16,
    min: i16,
    max: i16,
}

impl Oscillator {
    pub const fn new(value: i16, step: i16, min: i16, max: i16) -> Self {
        Self { value, step, min, max }
    }

    pub fn value(&self) -> i16 {
        self.value
    }

    pub fn step(&self) -> i16 {
        self.step
    }

    /// Turn around before a step would leave `[min, max]`
    pub fn bounce(&mut self) -> i16 {
        let next = self.value + self.step;
        if next > self.max || next < self.min {
            self.step = -self.step;
        }
        self.value += self.step;
        self.value
    }

    /// Step, and fold any overshoot back inside `[min, max]`
    pub fn fold(&mut self) -> i16 {
        self.value += self.step;
        if self.value > self.max {
            self.value = self.max - (self.value - self.max);
            self.step = -self.step;
        }
        if self.value < self.min {
            self.value = self.min + (self.min - self.value);
            self.step = -self.step;
        }
        self.value
    }
}

/// One stamp: four mirrored circles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stroke {
    at: Point,
    radius: u32,
    pen: Pen,
}

pub struct TouchPaint {
    width: i32,
    height: i32,
    rng: XorShift32,
    radius: Oscillator,
    channels: [Oscillator; 3],
    depth: usize,
    /// Stamps of the last `depth` iterations, one slot per iteration
    recent: VecDeque<Option<Stroke>>,
    clears_left: usize,
    banner_left: usize,
}

impl TouchPaint {
    pub fn new(width: u32, height: u32, depth: usize, mut rng: XorShift32) -> Self {
        let channels = core::array::from_fn(|_| {
            Oscillator::new(rng.between(0, 255), rng.between(-2, 2), 0, 255)
        });
        let depth = depth.max(1);
        Self {
            width: width as i32,
            height: height as i32,
            rng,
            radius: Oscillator::new(MIN_RADIUS, 1, MIN_RADIUS, MAX_RADIUS),
            channels,
            depth,
            recent: VecDeque::with_capacity(depth + 1),
            clears_left: 0,
            banner_left: depth,
        }
    }

    pub fn radius(&self) -> &Oscillator {
        &self.radius
    }

    pub fn channels(&self) -> &[Oscillator; 3] {
        &self.channels
    }

    pub fn pen(&self) -> Pen {
        let [r, g, b] = self.channels.map(|c| c.value() as u8);
        Color::new(r, g, b).pen()
    }

    fn reset_colors(&mut self) {
        for channel in &mut self.channels {
            *channel = Oscillator::new(self.rng.between(0, 255), self.rng.between(-5, 5), 0, 255);
        }
    }

    fn stamp(&mut self, touch: &Contact) -> Stroke {
        let radius = self.radius.bounce();
        for channel in &mut self.channels {
            channel.fold();
        }
        Stroke {
            at: Point::new(i32::from(touch.x), i32::from(touch.y)),
            radius: radius as u32,
            pen: self.pen(),
        }
    }

    fn draw(&self, canvas: &mut Canvas<'_>, stroke: &Stroke) {
        let Point { x, y } = stroke.at;
        let (mx, my) = (self.width - x, self.height - y);
        canvas.set_pen(stroke.pen);
        for center in [Point::new(x, y), Point::new(mx, y), Point::new(mx, my), Point::new(x, my)] {
            canvas.circle(center, stroke.radius);
        }
    }
}

impl Scene for TouchPaint {
    fn advance(&mut self, contacts: &[Contact; MAX_CONTACTS]) {
        let [first, second] = contacts;

        let stroke = (first.active && first.has_moved()).then(|| self.stamp(first));
        self.recent.push_back(stroke);
        while self.recent.len() > self.depth {
            self.recent.pop_front();
        }

        if second.active {
            self.reset_colors();
            self.recent.clear();
            self.banner_left = 0;
            // every buffer in the ring needs its own wipe
            self.clears_left = self.depth;
            log::debug!("paint: cleared");
        }
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        if self.banner_left > 0 {
            self.banner_left -= 1;
            canvas.set_pen(Pen::WHITE);
            canvas.text(BANNER, Point::zero(), self.width as u32);
        }
        for stroke in self.recent.iter().flatten() {
            self.draw(canvas, stroke);
        }
    }

    fn take_full_clear(&mut self) -> bool {
        if self.clears_left == 0 {
            return false;
        }
        self.clears_left -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(x: i16, y: i16, dx: i16) -> Contact {
        Contact {
            id: 0,
            active: true,
            x,
            y,
            dx,
            dy: 0,
        }
    }

    #[test]
    fn fold_reflects_overflow() {
        let mut c = Oscillator::new(254, 3, 0, 255);
        assert_eq!(c.fold(), 253);
        assert_eq!(c.step(), -3);

        let mut c = Oscillator::new(1, -4, 0, 255);
        assert_eq!(c.fold(), 3);
        assert_eq!(c.step(), 4);
    }

    #[test]
    fn channels_stay_in_byte_range() {
        for step in -5..=5 {
            let mut c = Oscillator::new(128, step, 0, 255);
            for _ in 0..2000 {
                let v = c.fold();
                assert!((0..=255).contains(&v), "step {} gave {}", step, v);
            }
        }
    }

    #[test]
    fn radius_stays_inside_bounds() {
        let mut r = Oscillator::new(MIN_RADIUS, 1, MIN_RADIUS, MAX_RADIUS);
        let mut peak = 0;
        for _ in 0..500 {
            let v = r.bounce();
            assert!((MIN_RADIUS..=MAX_RADIUS).contains(&v));
            peak = peak.max(v);
        }
        assert_eq!(peak, MAX_RADIUS);
    }

    #[test]
    fn only_moving_first_contact_stamps() {
        let mut paint = TouchPaint::new(100, 100, 2, XorShift32::new(5));
        let idle = Contact::idle(1);

        paint.advance(&[touch(10, 10, 0), idle]);
        assert_eq!(paint.radius().value(), MIN_RADIUS);

        paint.advance(&[touch(12, 10, 2), idle]);
        assert_eq!(paint.radius().value(), MIN_RADIUS + 1);
        assert_eq!(paint.recent.len(), 2);
        assert!(paint.recent[1].is_some());
        assert!(!paint.take_full_clear());
    }

    #[test]
    fn second_contact_requests_a_clear_per_buffer() {
        let mut paint = TouchPaint::new(100, 100, 2, XorShift32::new(5));
        let mut second = Contact::idle(1);
        second.active = true;

        paint.advance(&[touch(12, 10, 2), second]);
        assert!(paint.recent.is_empty());
        assert!(paint.take_full_clear());
        assert!(paint.take_full_clear());
        assert!(!paint.take_full_clear());
    }
}
