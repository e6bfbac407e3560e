//! Vector math shared by the sketches
//!
//! `Vec2` is screen space (pixels, y down). `Vec3` is the city's world space:
//! `x` runs along the width, `y` along the depth and `z` is the height.

use std::ops::{Add, Mul, Neg, Sub};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Point on the ground plane (height 0)
    #[inline]
    pub const fn ground(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Same point, new height
    #[inline]
    pub const fn with_z(self, z: f32) -> Self {
        Self { z, ..self }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// 2D Vector (screen coordinates, particle positions)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Rotate around the origin (radians, clockwise on screen since y points down)
    #[inline]
    pub fn rotate(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn as_tuple(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    #[inline]
    fn mul(self, v: Vec2) -> Vec2 {
        v * self
    }
}

/// Scalar linear interpolation. `t` is not clamped.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation between two screen points. `t` is not clamped.
#[inline]
pub fn lerp2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    Vec2 {
        x: lerp(a.x, b.x, t),
        y: lerp(a.y, b.y, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_lerp2_endpoints() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(5.0, -2.0);
        assert_eq!(lerp2(a, b, 0.0), a);
        assert_eq!(lerp2(a, b, 1.0), b);
        assert_eq!(lerp2(a, b, 0.5), Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert!(v.approx_eq(&Vec2::new(0.0, 1.0), 1e-6));
    }

    #[test]
    fn test_with_z_keeps_ground_coordinates() {
        let p = Vec3::ground(3.0, 4.0).with_z(7.0);
        assert_eq!(p, Vec3::new(3.0, 4.0, 7.0));
    }
}
