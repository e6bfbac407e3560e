//! Chromatic-aberration trails
//!
//! A shape keeps its last three positions and rotations. Each frame it is
//! stamped once per sample in red, green and blue with additive blending,
//! interpolated across `sub_samples` steps between consecutive samples, so
//! fast motion fringes into colour and slow motion converges to white.

use crate::display::{Paint, PixelBuffer, Rgb};
use crate::math3d::{lerp, lerp2, Vec2};

/// Channel colour for sample ids 0 (previous), 1 (current), 2 (next)
pub const CHANNELS: [Rgb; 3] = [(255, 0, 0), (0, 255, 0), (0, 0, 255)];

/// One placement of the shape on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamp {
    pub center: Vec2,
    pub position: Vec2,
    pub rotation: f32,
    pub size: f32,
    pub color: Rgb,
    pub paint: Paint,
}

impl Stamp {
    /// Map a point in the shape's local frame to screen space
    pub fn transform(&self, local: Vec2) -> Vec2 {
        self.center + (self.position + local).rotate(self.rotation)
    }
}

/// The motion and look of a chromatic shape
pub trait ChromaticShape {
    /// Position relative to the box centre, in units of the box half-extent.
    /// Must be a pure function of `time`.
    fn compute_pos(&self, time: f32) -> Vec2;

    /// Rotation in radians. Must be a pure function of `time`.
    fn compute_rot(&self, time: f32) -> f32;

    fn draw(&self, buffer: &mut PixelBuffer, stamp: &Stamp);
}

/// Sliding window of three samples
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaticTrail {
    positions: [Vec2; 3],
    rotations: [f32; 3],
    sub_samples: usize,
}

impl ChromaticTrail {
    pub fn new(sub_samples: usize) -> Self {
        Self {
            positions: [Vec2::zero(); 3],
            rotations: [0.0; 3],
            sub_samples: sub_samples.max(1),
        }
    }

    pub fn sub_samples(&self) -> usize {
        self.sub_samples
    }

    pub fn set_sub_samples(&mut self, sub_samples: usize) {
        self.sub_samples = sub_samples.max(1);
    }

    /// Shift the window by one frame: prev <- curr <- next <- shape(time)
    pub fn update(&mut self, shape: &impl ChromaticShape, time: f32) {
        self.positions = [self.positions[1], self.positions[2], shape.compute_pos(time)];
        self.rotations = [self.rotations[1], self.rotations[2], shape.compute_rot(time)];
    }

    /// Fill the window as if the shape had been running for three frames
    pub fn prime(&mut self, shape: &impl ChromaticShape, time: f32, dt: f32) {
        for i in 0..3 {
            self.update(shape, time + (i as f32 - 2.0) * dt);
        }
    }

    #[inline]
    fn fraction(&self, sub_sample: usize) -> f32 {
        sub_sample as f32 / self.sub_samples as f32
    }

    /// Position between sample `id` and the next one (wrapping), `sub_sample` steps in
    pub fn position_on(&self, id: usize, sub_sample: usize) -> Vec2 {
        let id = id % 3;
        lerp2(self.positions[id], self.positions[(id + 1) % 3], self.fraction(sub_sample))
    }

    /// Rotation between sample `id` and the next one (wrapping), `sub_sample` steps in
    pub fn rotation_on(&self, id: usize, sub_sample: usize) -> f32 {
        let id = id % 3;
        lerp(self.rotations[id], self.rotations[(id + 1) % 3], self.fraction(sub_sample))
    }

    /// Stamp the shape `3 * sub_samples` times into the box at (cx, cy)
    pub fn render(
        &self,
        shape: &impl ChromaticShape,
        buffer: &mut PixelBuffer,
        cx: f32,
        cy: f32,
        size: f32,
    ) {
        let alpha = (255 / self.sub_samples).max(1) as u8;
        for sub in 0..self.sub_samples {
            for (id, color) in CHANNELS.iter().enumerate() {
                let stamp = Stamp {
                    center: Vec2::new(cx, cy),
                    position: self.position_on(id, sub) * size,
                    rotation: self.rotation_on(id, sub),
                    size,
                    color: *color,
                    paint: Paint::Additive(alpha),
                };
                shape.draw(buffer, &stamp);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Moves one unit right per second, turns one radian per second
    struct Slider {
        stamps: RefCell<Vec<Stamp>>,
    }

    impl Slider {
        fn new() -> Self {
            Self {
                stamps: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChromaticShape for Slider {
        fn compute_pos(&self, time: f32) -> Vec2 {
            Vec2::new(time, 0.0)
        }

        fn compute_rot(&self, time: f32) -> f32 {
            time
        }

        fn draw(&self, _buffer: &mut PixelBuffer, stamp: &Stamp) {
            self.stamps.borrow_mut().push(*stamp);
        }
    }

    fn primed() -> (Slider, ChromaticTrail) {
        let shape = Slider::new();
        let mut trail = ChromaticTrail::new(4);
        trail.update(&shape, 1.0);
        trail.update(&shape, 2.0);
        trail.update(&shape, 3.0);
        (shape, trail)
    }

    #[test]
    fn test_update_shifts_window() {
        let (shape, mut trail) = primed();
        assert_eq!(trail.position_on(0, 0), Vec2::new(1.0, 0.0));
        assert_eq!(trail.position_on(1, 0), Vec2::new(2.0, 0.0));
        assert_eq!(trail.position_on(2, 0), Vec2::new(3.0, 0.0));
        trail.update(&shape, 4.0);
        assert_eq!(trail.position_on(0, 0), Vec2::new(2.0, 0.0));
        assert_eq!(trail.rotation_on(2, 0), 4.0);
    }

    #[test]
    fn test_sub_sample_interpolation() {
        let (_, trail) = primed();
        assert_eq!(trail.position_on(0, 2), Vec2::new(1.5, 0.0));
        assert_eq!(trail.rotation_on(1, 1), 2.25);
        // The last sample interpolates back toward the first
        assert_eq!(trail.position_on(2, 2), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_render_stamps_three_channels_per_sub_sample() {
        let (shape, trail) = primed();
        let mut buffer = PixelBuffer::with_size(4, 4);
        trail.render(&shape, &mut buffer, 10.0, 20.0, 2.0);
        let stamps = shape.stamps.borrow();
        assert_eq!(stamps.len(), 12);
        for (i, s) in stamps.iter().enumerate() {
            assert_eq!(s.color, CHANNELS[i % 3]);
            assert_eq!(s.paint, Paint::Additive(63));
            assert_eq!(s.center, Vec2::new(10.0, 20.0));
        }
        // First stamp is the previous sample scaled by the box size
        assert_eq!(stamps[0].position, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_prime_fills_window_with_past_frames() {
        let shape = Slider::new();
        let mut trail = ChromaticTrail::new(2);
        trail.prime(&shape, 10.0, 0.5);
        assert_eq!(trail.position_on(0, 0), Vec2::new(9.0, 0.0));
        assert_eq!(trail.position_on(2, 0), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_stamp_transform_rotates_about_center() {
        let stamp = Stamp {
            center: Vec2::new(5.0, 5.0),
            position: Vec2::new(1.0, 0.0),
            rotation: std::f32::consts::PI,
            size: 1.0,
            color: (0, 0, 0),
            paint: Paint::Solid,
        };
        let p = stamp.transform(Vec2::zero());
        assert!(p.approx_eq(&Vec2::new(4.0, 5.0), 1e-5));
    }
}
