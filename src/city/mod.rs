//! Hand-drawn toy city
//!
//! The generator records a whole scene as a list of [`DrawAction`]s up
//! front; a [`Drawer`] then replays a few of them per frame.

pub mod action;
pub mod builder;
pub mod drawer;
pub mod generator;
pub mod palette;
pub mod projection;

pub use action::{DrawAction, Fill, Hatch, Segment};
pub use builder::CityBuilder;
pub use drawer::{Drawer, QueueState, Replay};
pub use generator::generate;
pub use palette::{Colors, Element, ResolvedPalette};
pub use projection::{Camera, Horizon, Projector};

use serde::{Deserialize, Serialize};

/// Tunables of a city scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityParams {
    /// Actions replayed per frame
    pub step: usize,
    /// Hand-drawn jitter, pixels
    pub offset: f32,
    pub use_color: bool,
    #[serde(flatten)]
    pub horizon: Horizon,
}

impl Default for CityParams {
    fn default() -> Self {
        Self {
            step: 5,
            offset: 5.0,
            use_color: true,
            horizon: Horizon::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_flat_json() {
        let p: CityParams = serde_json::from_str(r#"{"step": 40, "sky_limit": 0.6}"#).unwrap();
        assert_eq!(p.step, 40);
        assert_eq!(p.horizon.sky_limit, 0.6);
        assert_eq!(p.horizon.intersect_pos, 0.63);
        assert!(p.use_color);
    }
}
