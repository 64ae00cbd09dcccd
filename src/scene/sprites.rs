//! Bouncing sprites with damage-rectangle erase
use alloc::vec::Vec;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::rng::XorShift32;
use super::Scene;
use crate::config::MAX_PIPELINE_DEPTH;
use crate::framebuffer::{Canvas, Color, Pen};
use crate::input::{Contact, MAX_CONTACTS};

/// One square sprite.
///
/// `history[0]` is where the sprite was one iteration ago and
/// `history[depth - 1]` where it was `depth` iterations ago, which is what
/// the buffer about to be drawn still shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub size: u32,
    pub pen: Pen,
    history: [(f32, f32); MAX_PIPELINE_DEPTH],
    depth: usize,
}

impl Sprite {
    pub fn new(position: (f32, f32), velocity: (f32, f32), size: u32, pen: Pen, depth: usize) -> Self {
        Self {
            x: position.0,
            y: position.1,
            dx: velocity.0,
            dy: velocity.1,
            size,
            pen,
            history: [position; MAX_PIPELINE_DEPTH],
            depth: depth.clamp(1, MAX_PIPELINE_DEPTH),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn history(&self) -> &[(f32, f32)] {
        &self.history[..self.depth]
    }

    /// Integrate one step inside a `width` x `height` area, flipping the
    /// velocity on any axis where the footprint has left `[0, dim - size)`
    pub fn advance(&mut self, width: u32, height: u32) {
        self.history.copy_within(0..self.depth - 1, 1);
        self.history[0] = (self.x, self.y);

        self.x += self.dx;
        self.y += self.dy;

        let max_x = width.saturating_sub(self.size) as f32;
        let max_y = height.saturating_sub(self.size) as f32;
        if self.x < 0.0 || self.x >= max_x {
            self.dx = -self.dx;
        }
        if self.y < 0.0 || self.y >= max_y {
            self.dy = -self.dy;
        }
    }

    pub fn footprint(&self) -> Rectangle {
        self.footprint_at((self.x, self.y))
    }

    /// Footprint as the writable buffer still holds it
    pub fn stale_footprint(&self) -> Rectangle {
        self.footprint_at(self.history[self.depth - 1])
    }

    fn footprint_at(&self, (x, y): (f32, f32)) -> Rectangle {
        Rectangle::new(Point::new(x as i32, y as i32), Size::new(self.size, self.size))
    }
}

/// A fixed pool of sprites bouncing around the panel
#[derive(Debug, Clone)]
pub struct BouncingSprites {
    sprites: Vec<Sprite>,
    width: u32,
    height: u32,
}

impl BouncingSprites {
    /// `count` sprites of `size` pixels at random positions, with random
    /// velocities below four pixels per frame
    pub fn spawn(
        count: usize,
        size: u32,
        width: u32,
        height: u32,
        depth: usize,
        rng: &mut XorShift32,
    ) -> Self {
        let sprites = (0..count)
            .map(|_| {
                let x = rng.below(width.saturating_sub(size)) as f32;
                let y = rng.below(height.saturating_sub(size)) as f32;
                let dx = rng.below(255) as f32 / 64.0;
                let dy = rng.below(255) as f32 / 64.0;
                let pen = Color::new(
                    rng.below(255) as u8,
                    rng.below(255) as u8,
                    rng.below(255) as u8,
                )
                .pen();
                Sprite::new((x, y), (dx, dy), size, pen, depth)
            })
            .collect();
        log::info!("sprites: {} of {}px, depth {}", count, size, depth);
        Self::with_sprites(sprites, width, height)
    }

    pub fn with_sprites(sprites: Vec<Sprite>, width: u32, height: u32) -> Self {
        Self {
            sprites,
            width,
            height,
        }
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }
}

impl Scene for BouncingSprites {
    fn advance(&mut self, _contacts: &[Contact; MAX_CONTACTS]) {
        for sprite in &mut self.sprites {
            sprite.advance(self.width, self.height);
        }
    }

    fn damage(&self, out: &mut Vec<Rectangle>) {
        out.extend(self.sprites.iter().map(Sprite::stale_footprint));
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        for sprite in &self.sprites {
            canvas.set_pen(sprite.pen);
            canvas.rectangle(sprite.footprint());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflects_at_the_far_edge() {
        let mut s = Sprite::new((0.0, 0.0), (5.0, 0.0), 16, Pen::WHITE, 2);
        s.advance(32, 32);
        assert_eq!((s.x, s.y, s.dx), (5.0, 0.0, 5.0));

        let mut xs = Vec::new();
        for _ in 0..4 {
            s.advance(32, 32);
            xs.push(s.x);
        }
        // 20 is past 32 - 16, so the velocity flips there
        assert_eq!(xs, [10.0, 15.0, 20.0, 15.0]);
        assert_eq!(s.dx, -5.0);
    }

    #[test]
    fn stale_footprint_is_depth_iterations_old() {
        let mut s = Sprite::new((0.0, 0.0), (1.0, 2.0), 4, Pen::WHITE, 2);
        s.advance(100, 100);
        s.advance(100, 100);
        s.advance(100, 100);
        assert_eq!(s.history(), &[(2.0, 4.0), (1.0, 2.0)]);
        assert_eq!(s.stale_footprint().top_left, Point::new(1, 2));
        assert_eq!(s.footprint().top_left, Point::new(3, 6));

        let mut deep = Sprite::new((0.0, 0.0), (1.0, 0.0), 4, Pen::WHITE, 3);
        for _ in 0..3 {
            deep.advance(100, 100);
        }
        assert_eq!(deep.stale_footprint().top_left, Point::new(0, 0));
    }

    #[test]
    fn positions_reenter_range_within_one_step() {
        let mut rng = XorShift32::new(99);
        let mut scene = BouncingSprites::spawn(50, 16, 64, 48, 2, &mut rng);
        let idle = [Contact::idle(0), Contact::idle(1)];
        for _ in 0..500 {
            let before: Vec<_> = scene.sprites().iter().map(|s| (s.x, s.y)).collect();
            scene.advance(&idle);
            for ((px, py), s) in before.into_iter().zip(scene.sprites()) {
                let out_x = px < 0.0 || px > 48.0;
                let out_y = py < 0.0 || py > 32.0;
                // an overshoot never lasts two iterations in a row
                assert!(!(out_x && (s.x < 0.0 || s.x > 48.0)));
                assert!(!(out_y && (s.y < 0.0 || s.y > 32.0)));
            }
        }
    }

    #[test]
    fn damage_lists_one_rect_per_sprite() {
        let mut rng = XorShift32::new(3);
        let scene = BouncingSprites::spawn(7, 8, 64, 64, 2, &mut rng);
        let mut out = Vec::new();
        scene.damage(&mut out);
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|r| r.size == Size::new(8, 8)));
    }
}
