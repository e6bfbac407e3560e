//! Swarms
//!
//! A grid of little particle swarms. Each mote is pulled toward its cell's
//! centre by a spring, so it traces an ellipse while its light fades out.
//! When every mote of a swarm has died the swarm restarts from its original
//! particles.

use std::f32::consts::TAU;

use tracing::debug;

use super::{FrameRequest, ParamValue, Sketch, SEED_MASK};
use crate::display::{Paint, PixelBuffer, Rgb};
use crate::error::{SketchError, SketchResult};
use crate::math3d::Vec2;
use crate::particles::{BoxDrawable, BoxGrid, GridSource, Particle, ParticleState, Particles};
use crate::util::{hsv_to_rgb, Rng};

/// Starting distance from the centre, box units
const ORBIT: f32 = 0.6;
/// Spring constant toward the centre
const PULL: f32 = 6.0;
/// Fraction of the previous frame kept each render
const TRAIL: f32 = 0.8;

#[derive(Debug, Clone, PartialEq)]
struct Mote {
    state: ParticleState,
    life: f32,
    color: Rgb,
}

impl BoxDrawable for Mote {
    fn render_in_box(&self, buffer: &mut PixelBuffer, cx: f32, cy: f32, size: f32) {
        let p = self.state.pos * size;
        if !p.is_finite() {
            return;
        }
        let radius = (size * 0.05).max(1.0) as i32;
        let alpha = (self.state.remaining(self.life) * 255.0) as u8;
        buffer.fill_circle((cx + p.x) as i32, (cy + p.y) as i32, radius, self.color, Paint::Additive(alpha));
    }
}

impl Particle for Mote {
    fn state(&self) -> &ParticleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ParticleState {
        &mut self.state
    }

    fn update(&mut self, dt: f32) {
        self.state.acc = self.state.pos * -PULL;
        self.state.integrate(dt);
        self.state.age(dt);
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        let (w, h) = (buffer.width() as f32, buffer.height() as f32);
        self.render_in_box(buffer, w / 2.0, h / 2.0, w.min(h) / 2.0);
    }
}

/// One grid cell worth of motes
#[derive(Clone)]
pub struct Swarm {
    motes: Particles<Mote>,
}

impl Swarm {
    fn update(&mut self, dt: f32) {
        self.motes.update(dt);
        if self.motes.is_empty() {
            self.motes.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.motes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motes.is_empty()
    }
}

impl BoxDrawable for Swarm {
    fn render_in_box(&self, buffer: &mut PixelBuffer, cx: f32, cy: f32, size: f32) {
        self.motes.render_in_box(buffer, cx, cy, size);
    }
}

/// Builds swarms of `count` motes with seeded randomness
pub struct SwarmSource {
    rng: Rng,
    count: usize,
}

impl SwarmSource {
    fn new(seed: u64, count: usize) -> Self {
        Self {
            rng: Rng::new(seed),
            count,
        }
    }

    fn swarm(&mut self) -> Swarm {
        let hue = self.rng.range_f32(0.0, 360.0);
        let count = self.count;
        let rng = &mut self.rng;
        let motes = (0..count).map(|i| {
            let angle = -(i as f32 / count as f32) * TAU;
            let speed = ORBIT * PULL.sqrt() * rng.range_f32(0.6, 1.2);
            let life = rng.range_f32(2.0, 6.0);
            let state = ParticleState::new(life, 1.0)
                .at(Vec2::new(ORBIT, 0.0).rotate(angle))
                .with_velocity(Vec2::new(0.0, speed).rotate(angle));
            Mote {
                state,
                life,
                color: hsv_to_rgb((hue + i as f32 * 90.0 / count as f32) % 360.0, 0.8, 1.0),
            }
        });

        let mut swarm = Swarm {
            motes: Particles::new(),
        };
        swarm.motes.add_particle(motes.collect::<Vec<_>>());
        swarm
    }
}

impl GridSource for SwarmSource {
    type Drawable = Swarm;

    fn add_drawables(&mut self, count: usize) -> Vec<Swarm> {
        (0..count).map(|_| self.swarm()).collect()
    }
}

pub struct Swarms {
    grid: BoxGrid<SwarmSource>,
    seed: u64,
    n: usize,
    size: f32,
    speed: f32,
}

impl Swarms {
    pub fn new(seed: u64) -> Self {
        let seed = seed & SEED_MASK;
        let n = 3;
        let size = 0.9;
        Self {
            grid: BoxGrid::new(SwarmSource::new(seed, 20), n, size),
            seed,
            n,
            size,
            speed: 1.0,
        }
    }

    pub fn swarms(&self) -> &[Swarm] {
        self.grid.drawables()
    }

    /// Fresh swarms from the seed
    fn rebuild(&mut self) {
        let count = self.grid.source().count;
        *self.grid.source_mut() = SwarmSource::new(self.seed, count);
        self.grid.reset(self.n, self.size);
        debug!(n = self.n, count, seed = self.seed, "swarms rebuilt");
    }
}

impl Sketch for Swarms {
    fn update(&mut self, dt: f32, _width: u32, _height: u32) -> FrameRequest {
        let dt = dt * self.speed;
        for swarm in self.grid.drawables_mut() {
            swarm.update(dt);
        }
        FrameRequest::Continue
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        buffer.fade(TRAIL);
        self.grid.render(buffer);
    }

    fn name(&self) -> &str {
        "swarms"
    }

    fn reset(&mut self, _width: u32, _height: u32) {
        self.rebuild();
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> SketchResult<()> {
        match key {
            "grid" => {
                let n = value.as_usize(key)?;
                if n == 0 {
                    return Err(SketchError::invalid(key, "must be at least 1"));
                }
                self.n = n;
                self.rebuild();
            },
            "size" => {
                self.size = value.as_f32(key)?;
                self.grid.set_size_factor(self.size);
            },
            "speed" => self.speed = value.as_f32(key)?,
            "count" => {
                self.grid.source_mut().count = value.as_usize(key)?;
                self.rebuild();
            },
            "seed" => {
                self.seed = value.as_u64(key)?;
                self.rebuild();
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
            ("count", ParamValue::Int(self.grid.source().count as i64)),
            ("seed", ParamValue::Int(self.seed as i64)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_of_full_swarms() {
        let s = Swarms::new(3);
        assert_eq!(s.swarms().len(), 9);
        assert!(s.swarms().iter().all(|sw| sw.len() == 20));
    }

    #[test]
    fn test_swarm_thins_out_then_refills() {
        let mut s = Swarms::new(3);
        // Lifetimes are 2..6 seconds: after 4s some motes are gone
        for _ in 0..40 {
            s.update(0.1, 100, 100);
        }
        let total: usize = s.swarms().iter().map(Swarm::len).sum();
        assert!(total < 9 * 20);

        // Past the longest lifetime every swarm has restarted at least once
        for _ in 0..30 {
            s.update(0.1, 100, 100);
        }
        assert!(s.swarms().iter().all(|sw| !sw.is_empty()));
    }

    #[test]
    fn test_motes_orbit_the_centre() {
        let mut mote = SwarmSource::new(1, 1).swarm().motes.particles()[0].clone();
        let start = mote.state.pos.length();
        for _ in 0..200 {
            mote.update(0.005);
            assert!(mote.state.pos.length() < start * 1.5 + 0.01);
        }
    }

    #[test]
    fn test_render_draws_motes() {
        let mut s = Swarms::new(9);
        s.update(0.016, 90, 90);
        let mut buffer = PixelBuffer::with_size(90, 90);
        s.render(&mut buffer);
        assert_ne!(buffer.as_bytes(), PixelBuffer::with_size(90, 90).as_bytes());
    }

    #[test]
    fn test_params_rebuild_grid() {
        let mut s = Swarms::new(3);
        s.set_param("grid", ParamValue::Int(4)).unwrap();
        assert_eq!(s.swarms().len(), 16);
        s.set_param("count", ParamValue::Int(5)).unwrap();
        assert!(s.swarms().iter().all(|sw| sw.len() == 5));
        assert!(s.set_param("grid", ParamValue::Int(0)).is_err());
        assert!(matches!(
            s.set_param("gravity", ParamValue::Number(1.0)),
            Err(SketchError::UnknownParam { .. })
        ));
        assert_eq!(s.param("count"), Some(ParamValue::Int(5)));
    }

    #[test]
    fn test_same_seed_same_swarms() {
        let a = SwarmSource::new(42, 8).swarm();
        let b = SwarmSource::new(42, 8).swarm();
        assert_eq!(a.motes.particles(), b.motes.particles());
    }
}
