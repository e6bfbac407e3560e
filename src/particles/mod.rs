//! Particle lifecycle framework
//!
//! A particle carries position, velocity, acceleration and a lifetime that
//! decays each update. Concrete particle kinds implement [`Particle`] and
//! decide how they look; [`Particles`] owns a set of them, remembers the
//! original set for `reset`, and culls the dead ones.

pub mod chromatic;
pub mod grid;

pub use chromatic::{ChromaticShape, ChromaticTrail, Stamp};
pub use grid::{BoxDrawable, BoxGrid, GridCell, GridSource};

use crate::display::PixelBuffer;
use crate::math3d::Vec2;

/// Physical and aging state shared by every particle kind
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    lifetime: f32,
    decay: f32,
}

impl ParticleState {
    /// Particle that loses `decay` lifetime units per second
    pub fn new(lifetime: f32, decay: f32) -> Self {
        Self {
            pos: Vec2::zero(),
            vel: Vec2::zero(),
            acc: Vec2::zero(),
            lifetime,
            decay,
        }
    }

    /// Particle that never dies
    pub fn immortal() -> Self {
        Self::new(f32::INFINITY, 0.0)
    }

    pub fn at(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_acceleration(mut self, acc: Vec2) -> Self {
        self.acc = acc;
        self
    }

    #[inline]
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    #[inline]
    pub fn decay(&self) -> f32 {
        self.decay
    }

    #[inline]
    pub fn is_immortal(&self) -> bool {
        !self.lifetime.is_finite()
    }

    /// Consume `decay * dt` of lifetime. Non-finite lifetimes are left alone.
    #[inline]
    pub fn age(&mut self, dt: f32) {
        if self.lifetime.is_finite() {
            self.lifetime -= self.decay * dt;
        }
    }

    /// Semi-implicit Euler step
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.vel = self.vel + self.acc * dt;
        self.pos = self.pos + self.vel * dt;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.lifetime < 0.0
    }

    /// Fraction of `initial` lifetime left, clamped to [0, 1]. 1 for immortals.
    pub fn remaining(&self, initial: f32) -> f32 {
        if self.is_immortal() || initial <= 0.0 {
            1.0
        } else {
            (self.lifetime / initial).clamp(0.0, 1.0)
        }
    }
}

/// An animated entity with a lifetime
///
/// The default `update` only ages the particle; kinds that move override it
/// and call [`ParticleState::integrate`] as well.
pub trait Particle: BoxDrawable {
    fn state(&self) -> &ParticleState;

    fn state_mut(&mut self) -> &mut ParticleState;

    fn update(&mut self, dt: f32) {
        self.state_mut().age(dt);
    }

    fn is_dead(&self) -> bool {
        self.state().is_dead()
    }

    /// Draw in canvas coordinates
    fn render(&self, buffer: &mut PixelBuffer);
}

/// What a collection does with particles whose lifetime ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullPolicy {
    /// Drop dead particles at the end of the update that killed them
    #[default]
    Remove,
    /// Keep dead particles (frozen, still rendered) until the next reset
    Keep,
}

/// Owned set of particles plus the snapshot `reset` returns to
#[derive(Clone)]
pub struct Particles<P> {
    particles: Vec<P>,
    original: Vec<P>,
    cull: CullPolicy,
}

impl<P: Particle + Clone> Particles<P> {
    pub fn new() -> Self {
        Self::with_cull(CullPolicy::default())
    }

    pub fn with_cull(cull: CullPolicy) -> Self {
        Self {
            particles: Vec::new(),
            original: Vec::new(),
            cull,
        }
    }

    /// Append particles; their state as added is what `reset` returns to
    pub fn add_particle(&mut self, particles: impl IntoIterator<Item = P>) {
        let batch: Vec<P> = particles.into_iter().collect();
        self.original.extend(batch.iter().cloned());
        self.particles.extend(batch);
    }

    /// Restore every particle ever added, in order, as it was when added
    pub fn reset(&mut self) {
        self.particles.clone_from(&self.original);
    }

    /// Age and move every live particle once, then apply the cull policy
    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            if !p.is_dead() {
                p.update(dt);
            }
        }
        if self.cull == CullPolicy::Remove {
            self.particles.retain(|p| !p.is_dead());
        }
    }

    pub fn render(&self, buffer: &mut PixelBuffer) {
        for p in &self.particles {
            p.render(buffer);
        }
    }

    pub fn particles(&self) -> &[P] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| !p.is_dead()).count()
    }

    pub fn cull_policy(&self) -> CullPolicy {
        self.cull
    }
}

impl<P: Particle + Clone> Default for Particles<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Particle + Clone> BoxDrawable for Particles<P> {
    fn render_in_box(&self, buffer: &mut PixelBuffer, cx: f32, cy: f32, size: f32) {
        for p in &self.particles {
            p.render_in_box(buffer, cx, cy, size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Dot {
        id: u32,
        state: ParticleState,
    }

    impl Dot {
        fn new(id: u32, lifetime: f32, decay: f32) -> Self {
            Self {
                id,
                state: ParticleState::new(lifetime, decay),
            }
        }
    }

    impl BoxDrawable for Dot {
        fn render_in_box(&self, buffer: &mut PixelBuffer, cx: f32, cy: f32, size: f32) {
            let p = self.state.pos * size;
            buffer.set_pixel((cx + p.x) as i32, (cy + p.y) as i32, (255, 255, 255));
        }
    }

    impl Particle for Dot {
        fn state(&self) -> &ParticleState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ParticleState {
            &mut self.state
        }

        fn render(&self, buffer: &mut PixelBuffer) {
            buffer.set_pixel(self.state.pos.x as i32, self.state.pos.y as i32, (255, 255, 255));
        }
    }

    fn ids(ps: &Particles<Dot>) -> Vec<u32> {
        ps.particles().iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_decay_subtracts_factor_times_dt() {
        let mut s = ParticleState::new(10.0, 2.0);
        s.age(0.5);
        assert_eq!(s.lifetime(), 9.0);
        s.age(4.75);
        assert_eq!(s.lifetime(), -0.5);
        assert!(s.is_dead());
    }

    #[test]
    fn test_zero_lifetime_is_not_dead() {
        let s = ParticleState::new(0.0, 1.0);
        assert!(!s.is_dead());
    }

    #[test]
    fn test_immortal_never_decays() {
        let mut s = ParticleState::immortal();
        for _ in 0..1000 {
            s.age(1.0);
        }
        assert!(s.is_immortal());
        assert!(!s.is_dead());
        // A NaN lifetime is also left untouched and never counts as dead
        let mut odd = ParticleState::new(f32::NAN, 1.0);
        odd.age(1.0);
        assert!(odd.lifetime().is_nan());
        assert!(!odd.is_dead());
    }

    #[test]
    fn test_integrate_uses_acceleration_then_velocity() {
        let mut s = ParticleState::immortal()
            .with_velocity(Vec2::new(1.0, 0.0))
            .with_acceleration(Vec2::new(0.0, 2.0));
        s.integrate(0.5);
        assert_eq!(s.vel, Vec2::new(1.0, 1.0));
        assert_eq!(s.pos, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_update_removes_dead_without_skipping_live() {
        let mut ps = Particles::new();
        // Alternate dying / surviving so a naive in-place removal would skip entries
        ps.add_particle([
            Dot::new(0, 0.5, 1.0),
            Dot::new(1, 5.0, 1.0),
            Dot::new(2, 0.5, 1.0),
            Dot::new(3, 5.0, 1.0),
        ]);
        ps.update(1.0);
        assert_eq!(ids(&ps), vec![1, 3]);
        for d in ps.particles() {
            assert_eq!(d.state.lifetime(), 4.0);
        }
    }

    #[test]
    fn test_keep_policy_freezes_dead_particles() {
        let mut ps = Particles::with_cull(CullPolicy::Keep);
        ps.add_particle([Dot::new(0, 0.5, 1.0), Dot::new(1, 5.0, 1.0)]);
        ps.update(1.0);
        ps.update(1.0);
        assert_eq!(ps.len(), 2);
        assert_eq!(ps.live_count(), 1);
        assert_eq!(ps.particles()[0].state.lifetime(), -0.5);
        assert_eq!(ps.particles()[1].state.lifetime(), 3.0);
    }

    #[test]
    fn test_reset_restores_membership_and_order() {
        let mut ps = Particles::new();
        ps.add_particle([Dot::new(7, 1.0, 1.0), Dot::new(3, 9.0, 1.0)]);
        ps.add_particle([Dot::new(5, 0.1, 1.0)]);
        let before: Vec<Dot> = ps.particles().to_vec();

        for _ in 0..5 {
            ps.update(0.6);
        }
        assert_eq!(ids(&ps), vec![3]);

        ps.reset();
        assert_eq!(ps.particles(), before.as_slice());
    }

    #[test]
    fn test_reset_after_interleaved_adds_and_updates() {
        let mut ps = Particles::new();
        ps.add_particle([Dot::new(0, 0.5, 1.0), Dot::new(1, 5.0, 1.0)]);
        ps.update(1.0);
        ps.add_particle([Dot::new(2, 5.0, 1.0)]);
        assert_eq!(ids(&ps), vec![1, 2]);

        ps.reset();
        assert_eq!(ids(&ps), vec![0, 1, 2]);
        let lifetimes: Vec<f32> = ps.particles().iter().map(|d| d.state.lifetime()).collect();
        assert_eq!(lifetimes, vec![0.5, 5.0, 5.0]);
    }

    #[test]
    fn test_keep_policy_still_renders_dead_particles() {
        let mut ps = Particles::with_cull(CullPolicy::Keep);
        ps.add_particle([Dot::new(0, 0.5, 1.0)]);
        ps.update(1.0);
        assert_eq!(ps.live_count(), 0);
        let mut buffer = PixelBuffer::with_size(4, 4);
        ps.render(&mut buffer);
        assert_eq!(buffer.get_pixel(0, 0), Some((255, 255, 255)));
    }

    #[test]
    fn test_render_in_box_dispatches_to_all() {
        let mut ps = Particles::new();
        ps.add_particle([Dot::new(0, 1.0, 0.0), Dot::new(1, 1.0, 0.0)]);
        ps.particles[1].state.pos = Vec2::new(1.0, 0.0);
        let mut buffer = PixelBuffer::with_size(20, 20);
        ps.render_in_box(&mut buffer, 10.0, 10.0, 5.0);
        assert_eq!(buffer.get_pixel(10, 10), Some((255, 255, 255)));
        assert_eq!(buffer.get_pixel(15, 10), Some((255, 255, 255)));
    }
}
