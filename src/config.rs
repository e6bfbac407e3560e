//! Application configuration stored as JSON
//!
//! ```json
//! {
//!   "width": 1280,
//!   "height": 720,
//!   "sketch": "city",
//!   "params": { "city": { "step": 40, "use_color": false } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::{SketchError, SketchResult};
use crate::sketches::{ParamValue, Sketch, SKETCH_NAMES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub seed: u64,
    /// Sketch shown at startup
    pub sketch: String,
    /// Per-sketch parameter overrides, keyed by sketch name
    pub params: BTreeMap<String, BTreeMap<String, ParamValue>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            seed: 1,
            sketch: SKETCH_NAMES[0].to_string(),
            params: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> SketchResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> SketchResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SketchResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn validate(&self) -> SketchResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SketchError::config(format!(
                "window size {}x{} is empty",
                self.width, self.height
            )));
        }
        if !SKETCH_NAMES.contains(&self.sketch.as_str()) {
            return Err(SketchError::UnknownSketch(self.sketch.clone()));
        }
        for name in self.params.keys() {
            if !SKETCH_NAMES.contains(&name.as_str()) {
                warn!(sketch = %name, "params given for an unknown sketch");
            }
        }
        Ok(())
    }

    /// Push this config's overrides for `sketch` through `set_param`.
    /// Bad entries are logged and skipped. Returns how many were applied.
    pub fn apply(&self, sketch: &mut dyn Sketch) -> usize {
        let Some(overrides) = self.params.get(sketch.name()) else {
            return 0;
        };
        let mut applied = 0;
        for (key, value) in overrides {
            match sketch.set_param(key, *value) {
                Ok(()) => {
                    debug!(sketch = sketch.name(), key = %key, ?value, "param applied");
                    applied += 1;
                },
                Err(e) => warn!(sketch = sketch.name(), error = %e, "skipping config param"),
            }
        }
        applied
    }
}
