//! Chromatic Squares
//!
//! A grid of squares sliding back and forth while turning in quarter steps.
//! Each square is stamped in red, green and blue at its last three positions
//! with additive light, so it reads white when still and splits into colour
//! fringes while it moves. Every cell uses a different easing curve and a
//! small phase delay, giving a ripple across the grid.

use std::f32::consts::FRAC_PI_2;

use super::{FrameRequest, ParamValue, Sketch};
use crate::display::PixelBuffer;
use crate::ease::Ease;
use crate::error::{SketchError, SketchResult};
use crate::math3d::{lerp, Vec2};
use crate::particles::{BoxDrawable, BoxGrid, ChromaticShape, ChromaticTrail, GridSource, Stamp};

/// Seconds for one slide across the cell
const PERIOD: f32 = 2.0;
/// Half-extent of a square, box units
const SQUARE: f32 = 0.35;
/// How far the centre slides either way, box units
const TRAVEL: f32 = 0.45;
/// Phase delay between neighbouring cells, seconds
const RIPPLE: f32 = 0.15;
/// Frame interval assumed when priming a trail
const PRIME_DT: f32 = 1.0 / 60.0;

const CURVES: [Ease; 5] = [
    Ease::InOutPower(3.0),
    Ease::InOutElastic,
    Ease::InOutExpo,
    Ease::OutCubic,
    Ease::InQuart,
];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Motion {
    phase: f32,
    ease: Ease,
}

impl ChromaticShape for Motion {
    fn compute_pos(&self, time: f32) -> Vec2 {
        // Ping-pong over two periods
        let cycle = ((time + self.phase) / PERIOD).rem_euclid(2.0);
        let t = if cycle < 1.0 { cycle } else { 2.0 - cycle };
        Vec2::new(lerp(-TRAVEL, TRAVEL, self.ease.apply(t)), 0.0)
    }

    fn compute_rot(&self, time: f32) -> f32 {
        let turns = (time + self.phase) / PERIOD;
        let whole = turns.floor();
        (whole + self.ease.apply(turns - whole)) * FRAC_PI_2
    }

    fn draw(&self, buffer: &mut PixelBuffer, stamp: &Stamp) {
        let h = stamp.size * SQUARE;
        let corners = [
            Vec2::new(-h, -h),
            Vec2::new(h, -h),
            Vec2::new(h, h),
            Vec2::new(-h, h),
        ];
        let points = corners.map(|c| stamp.transform(c).as_tuple());
        buffer.fill_polygon(&points, stamp.color, stamp.paint);
    }
}

#[derive(Debug, Clone)]
pub struct Spinner {
    motion: Motion,
    trail: ChromaticTrail,
}

impl Spinner {
    fn advance(&mut self, time: f32) {
        self.trail.update(&self.motion, time);
    }

    pub fn sub_samples(&self) -> usize {
        self.trail.sub_samples()
    }
}

impl BoxDrawable for Spinner {
    fn render_in_box(&self, buffer: &mut PixelBuffer, cx: f32, cy: f32, size: f32) {
        self.trail.render(&self.motion, buffer, cx, cy, size);
    }
}

struct SpinnerSource {
    sub_samples: usize,
}

impl GridSource for SpinnerSource {
    type Drawable = Spinner;

    fn add_drawables(&mut self, count: usize) -> Vec<Spinner> {
        (0..count)
            .map(|i| {
                let motion = Motion {
                    phase: i as f32 * RIPPLE,
                    ease: CURVES[i % CURVES.len()],
                };
                let mut trail = ChromaticTrail::new(self.sub_samples);
                trail.prime(&motion, 0.0, PRIME_DT);
                Spinner { motion, trail }
            })
            .collect()
    }
}

pub struct Chromatic {
    grid: BoxGrid<SpinnerSource>,
    time: f32,
    n: usize,
    size: f32,
    speed: f32,
}

impl Chromatic {
    pub fn new() -> Self {
        let n = 4;
        let size = 0.8;
        Self {
            grid: BoxGrid::new(SpinnerSource { sub_samples: 3 }, n, size),
            time: 0.0,
            n,
            size,
            speed: 1.0,
        }
    }

    pub fn spinners(&self) -> &[Spinner] {
        self.grid.drawables()
    }
}

impl Default for Chromatic {
    fn default() -> Self {
        Self::new()
    }
}

impl Sketch for Chromatic {
    fn update(&mut self, dt: f32, _width: u32, _height: u32) -> FrameRequest {
        self.time += dt * self.speed;
        let time = self.time;
        for spinner in self.grid.drawables_mut() {
            spinner.advance(time);
        }
        FrameRequest::Continue
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        buffer.clear((0, 0, 0));
        self.grid.render(buffer);
    }

    fn name(&self) -> &str {
        "chromatic"
    }

    fn reset(&mut self, _width: u32, _height: u32) {
        self.time = 0.0;
        self.grid.reset(self.n, self.size);
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> SketchResult<()> {
        match key {
            "grid" => {
                let n = value.as_usize(key)?;
                if n == 0 {
                    return Err(SketchError::invalid(key, "must be at least 1"));
                }
                self.n = n;
                self.grid.reset(n, self.size);
            },
            "size" => {
                self.size = value.as_f32(key)?;
                self.grid.set_size_factor(self.size);
            },
            "speed" => self.speed = value.as_f32(key)?,
            "sub_samples" => {
                let sub = value.as_usize(key)?;
                if sub == 0 {
                    return Err(SketchError::invalid(key, "must be at least 1"));
                }
                self.grid.source_mut().sub_samples = sub;
                for spinner in self.grid.drawables_mut() {
                    spinner.trail.set_sub_samples(sub);
                }
            },
            _ => return Err(SketchError::unknown_param(self.name(), key)),
        }
        Ok(())
    }

    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("grid", ParamValue::Int(self.n as i64)),
            ("size", ParamValue::Number(self.size)),
            ("speed", ParamValue::Number(self.speed)),
            ("sub_samples", ParamValue::Int(self.grid.source().sub_samples as i64)),
        ]
    }
}
