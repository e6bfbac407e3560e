//! Fixed-angle perspective for the toy city
//!
//! World points are `(x: width, y: depth, z: height)`. The camera looks at
//! the ground plane rotated by `angle` and sits `height` units above it.

use serde::{Deserialize, Serialize};

use crate::math3d::{Vec2, Vec3};

/// Divisor turning screen height into pixels per projected unit
const SCREEN_UNITS: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Rotation of the ground plane, radians
    pub angle: f32,
    /// Focal distance
    pub focal: f32,
    /// Eye height above the ground
    pub height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            angle: 30f32.to_radians(),
            focal: 90.0,
            height: 1.5,
        }
    }
}

/// Screen-space placement of the vanishing point and the ground line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Horizon {
    /// Horizontal placement, fraction of the screen width
    pub intersect_pos: f32,
    /// Where the sky ends, fraction of the screen height
    pub sky_limit: f32,
    /// Extra drop of the ground below the sky limit, fraction of the screen height
    pub ground_off: f32,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            intersect_pos: 0.63,
            sky_limit: 0.9,
            ground_off: 0.05,
        }
    }
}

/// Camera + horizon + screen size, ready to project
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    camera: Camera,
    horizon: Horizon,
    width: f32,
    height: f32,
    sin: f32,
    cos: f32,
}

impl Projector {
    pub fn new(camera: Camera, horizon: Horizon, width: f32, height: f32) -> Self {
        Self {
            camera,
            horizon,
            width,
            height,
            sin: camera.angle.sin(),
            cos: camera.angle.cos(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    /// Projection before screen scaling and placement
    pub fn factor(&self, pt: Vec3) -> Vec2 {
        let focal = self.camera.focal;
        let a = pt.x * self.sin - pt.y * self.cos;
        let b = pt.x * self.cos + pt.y * self.sin;
        Vec2::new(
            focal * a / (b + focal),
            -focal * (pt.z - self.camera.height) / (b + focal),
        )
    }

    /// World point to screen pixels
    pub fn project(&self, pt: Vec3) -> Vec2 {
        let f = self.factor(pt);
        let scale = self.height / SCREEN_UNITS;
        Vec2::new(
            self.horizon.intersect_pos * self.width + scale * f.x,
            (self.horizon.sky_limit + self.horizon.ground_off) * self.height + scale * f.y,
        )
    }

    /// Shorthand for `project(Vec3::new(x, y, z))`
    pub fn xyz(&self, x: f32, y: f32, z: f32) -> Vec2 {
        self.project(Vec3::new(x, y, z))
    }
}
