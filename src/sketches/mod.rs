mod chromatic;
mod city;
mod swarms;

pub use chromatic::Chromatic;
pub use city::City;
pub use swarms::Swarms;

use serde::{Deserialize, Serialize};

use crate::display::PixelBuffer;
use crate::error::{SketchError, SketchResult};

/// Registry names, in keyboard order
pub const SKETCH_NAMES: [&str; 3] = ["city", "swarms", "chromatic"];

/// Seeds are reported as `ParamValue::Int`, so they are kept below 2^63
pub const SEED_MASK: u64 = i64::MAX as u64;

/// Whether the host should keep updating a sketch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    Continue,
    /// Nothing left to animate until the next reset
    Stop,
}

/// A tunable value, as read from the config file or set from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Int(i64),
    Number(f32),
}

impl ParamValue {
    pub fn as_f32(self, key: &str) -> SketchResult<f32> {
        let v = match self {
            Self::Int(i) => i as f32,
            Self::Number(n) => n,
            Self::Flag(_) => return Err(SketchError::invalid(key, "expected a number")),
        };
        if v.is_finite() {
            Ok(v)
        } else {
            Err(SketchError::invalid(key, "must be finite"))
        }
    }

    pub fn as_usize(self, key: &str) -> SketchResult<usize> {
        match self {
            Self::Int(i) if i >= 0 => Ok(i as usize),
            Self::Number(n) if n >= 0.0 && n.fract() == 0.0 && n.is_finite() => Ok(n as usize),
            _ => Err(SketchError::invalid(key, "expected a non-negative integer")),
        }
    }

    pub fn as_u64(self, key: &str) -> SketchResult<u64> {
        match self {
            Self::Int(i) if i >= 0 => Ok(i as u64),
            _ => Err(SketchError::invalid(key, "expected a non-negative integer")),
        }
    }

    pub fn as_bool(self, key: &str) -> SketchResult<bool> {
        match self {
            Self::Flag(b) => Ok(b),
            _ => Err(SketchError::invalid(key, "expected true or false")),
        }
    }
}

/// Trait for all sketches
pub trait Sketch {
    /// Advance the animation
    /// - dt: delta time in seconds
    /// - width/height: canvas dimensions
    fn update(&mut self, dt: f32, width: u32, height: u32) -> FrameRequest;

    /// Render the current frame into the pixel buffer
    fn render(&self, buffer: &mut PixelBuffer);

    /// Sketch name for logs and the registry
    fn name(&self) -> &str;

    /// Rebuild from the current parameters for a `width` x `height` canvas
    fn reset(&mut self, width: u32, height: u32);

    /// Change one parameter. Unknown keys and mistyped values are errors.
    fn set_param(&mut self, key: &str, value: ParamValue) -> SketchResult<()>;

    /// Current parameter values
    fn params(&self) -> Vec<(&'static str, ParamValue)>;

    fn param(&self, key: &str) -> Option<ParamValue> {
        self.params().into_iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Host-side run state of the current sketch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Playback {
    pub paused: bool,
    pub stopped: bool,
}

impl Playback {
    pub fn should_update(&self) -> bool {
        !self.paused && !self.stopped
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Record what the sketch asked for after an update
    pub fn apply(&mut self, request: FrameRequest) {
        if request == FrameRequest::Stop {
            self.stopped = true;
        }
    }

    /// A reset starts the sketch over; pause is left as the user set it
    pub fn restart(&mut self) {
        self.stopped = false;
    }
}

/// Build a sketch by registry name
pub fn by_name(name: &str, seed: u64) -> SketchResult<Box<dyn Sketch>> {
    match name {
        "city" => Ok(Box::new(City::new(seed))),
        "swarms" => Ok(Box::new(Swarms::new(seed))),
        "chromatic" => Ok(Box::new(Chromatic::new())),
        other => Err(SketchError::UnknownSketch(other.to_string())),
    }
}

/// Every sketch, in registry order
pub fn all(seed: u64) -> Vec<Box<dyn Sketch>> {
    SKETCH_NAMES
        .iter()
        .filter_map(|name| by_name(name, seed).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_builds_every_name() {
        let sketches = all(1);
        assert_eq!(sketches.len(), SKETCH_NAMES.len());
        for (sketch, name) in sketches.iter().zip(SKETCH_NAMES) {
            assert_eq!(sketch.name(), name);
        }
        assert!(matches!(by_name("nope", 1), Err(SketchError::UnknownSketch(_))));
    }

    #[test]
    fn test_wide_seeds_stay_representable() {
        for name in ["city", "swarms"] {
            let sketch = by_name(name, u64::MAX).unwrap();
            let seed = sketch.param("seed").unwrap();
            assert_eq!(seed, ParamValue::Int(i64::MAX));
            assert_eq!(seed.as_u64("seed").unwrap(), SEED_MASK);
        }
    }

    #[test]
    fn test_param_value_from_json() {
        let v: Vec<ParamValue> = serde_json::from_str("[true, 3, 0.5]").unwrap();
        assert_eq!(v, vec![ParamValue::Flag(true), ParamValue::Int(3), ParamValue::Number(0.5)]);
    }

    #[test]
    fn test_param_value_conversions() {
        assert_eq!(ParamValue::Int(4).as_f32("k").unwrap(), 4.0);
        assert_eq!(ParamValue::Number(3.0).as_usize("k").unwrap(), 3);
        assert!(ParamValue::Number(2.5).as_usize("k").is_err());
        assert!(ParamValue::Int(-1).as_usize("k").is_err());
        assert!(ParamValue::Number(f32::NAN).as_f32("k").is_err());
        assert!(ParamValue::Flag(true).as_f32("k").is_err());
        assert!(ParamValue::Int(1).as_bool("k").is_err());
        assert_eq!(ParamValue::Int(9).as_u64("seed").unwrap(), 9);
    }

    #[test]
    fn test_playback_stop_and_restart() {
        let mut playback = Playback::default();
        assert!(playback.should_update());
        playback.apply(FrameRequest::Continue);
        assert!(playback.should_update());
        playback.apply(FrameRequest::Stop);
        assert!(!playback.should_update());
        playback.toggle_pause();
        playback.restart();
        assert!(!playback.should_update());
        playback.toggle_pause();
        assert!(playback.should_update());
    }
}
