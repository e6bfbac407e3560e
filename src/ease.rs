//! Easing curves for looping sketch motion

use std::f32::consts::PI;

/// Easing curve over `t` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
    Linear,
    /// Symmetric power curve: `0.5 * (2t)^g` on the first half, mirrored on the second
    InOutPower(f32),
    InOutElastic,
    InOutExpo,
    OutCubic,
    InQuart,
}

impl Ease {
    /// Apply the curve. Input is clamped to [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutPower(g) => {
                if t < 0.5 {
                    0.5 * (2.0 * t).powf(g)
                } else {
                    1.0 - 0.5 * (2.0 * (1.0 - t)).powf(g)
                }
            },
            Self::InOutElastic => {
                let c5 = (2.0 * PI) / 4.5;
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0
                } else {
                    (2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0 + 1.0
                }
            },
            Self::InOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            },
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InQuart => t * t * t * t,
        }
    }
}
