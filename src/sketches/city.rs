//! Toy City
//!
//! A whole city is generated up front as a draw queue and then sketched onto
//! a persistent canvas a few strokes per frame. Once the last stroke is down
//! the sketch asks the host to stop updating it.

use tracing::info;

use super::{FrameRequest, ParamValue, Sketch, SEED_MASK};
use crate::city::{generate, CityParams, Drawer, Replay};
use crate::display::PixelBuffer;
use crate::error::{SketchError, SketchResult};

const PAPER: (u8, u8, u8) = (255, 255, 255);

pub struct City {
    params: CityParams,
    seed: u64,
    drawer: Drawer,
    canvas: PixelBuffer,
}

impl City {
    pub fn new(seed: u64) -> Self {
        let params = CityParams::default();
        Self {
            params,
            seed: seed & SEED_MASK,
            drawer: Drawer::new(params.step),
            canvas: PixelBuffer::with_size(0, 0),
        }
    }

    pub fn city_params(&self) -> &CityParams {
        &self.params
    }

    pub fn drawer(&self) -> &Drawer {
        &self.drawer
    }

    /// Batch size after one Up (`grow`) or Down step from the keyboard
    pub fn rescaled_step(step: i64, grow: bool) -> i64 {
        if grow {
            step.saturating_mul(2)
        } else {
            (step / 2).max(1)
        }
    }

    fn regenerate(&mut self) {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.reset(w, h);
    }
}

impl Sketch for City {
    fn update(&mut self, _dt: f32, width: u32, height: u32) -> FrameRequest {
        if (width, height) != (self.canvas.width(), self.canvas.height()) {
            self.reset(width, height);
        }
        match self.drawer.call(&mut self.canvas) {
            Replay::Continue => FrameRequest::Continue,
            Replay::Exhausted => {
                info!(actions = self.drawer.len(), seed = self.seed, "city finished");
                FrameRequest::Stop
            },
            Replay::Idle => FrameRequest::Stop,
        }
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        buffer.copy_from(&self.canvas);
    }

    fn name(&self) -> &str {
        "city"
    }

    fn reset(&mut self, width: u32, height: u32) {
        self.canvas = PixelBuffer::with_size(width, height);
        self.canvas.clear(PAPER);
        self.drawer = generate(&self.params, self.seed, width, height);
        info!(width, height, seed = self.seed, actions = self.drawer.len(), "city reset");
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> SketchResult<()> {
        match key {
            "step" => {
                let step = value.as_usize(key)?;
                if step == 0 {
                    return Err(SketchError::invalid(key, "must be at least 1"));
                }
                self.params.step = step;
                // Batch size applies from the next frame, no regeneration
                self.drawer.set_step(step);
                return Ok(());
            },
            "intersect_pos" => self.params.horizon.intersect_pos = value.as_f32(key)?,
            "sky_limit" => self.params.horizon.sky_limit = value.as_f32(key)?,
            "ground_off" => self.params.horizon.ground_off = value.as_f32(key)?,
            "offset" => {
                let offset = value.as_f32(key)?;
                if offset < 0.0 {
                    return Err(SketchError::invalid(key, "must not be negative"));
                }
                self.params.offset = offset;
            },
            "use_color" => self.params.use_color = value.as_bool(key)?,
            "seed" => self.seed = value.as_u64(key)?,
            _ => return Err(SketchError::unknown_param(self.name(), key)),
        }
        self.regenerate();
        Ok(())
    }

    fn params(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("step", ParamValue::Int(self.params.step as i64)),
            ("intersect_pos", ParamValue::Number(self.params.horizon.intersect_pos)),
            ("sky_limit", ParamValue::Number(self.params.horizon.sky_limit)),
            ("ground_off", ParamValue::Number(self.params.horizon.ground_off)),
            ("offset", ParamValue::Number(self.params.offset)),
            ("use_color", ParamValue::Flag(self.params.use_color)),
            ("seed", ParamValue::Int(self.seed as i64)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::QueueState;

    fn city(w: u32, h: u32) -> City {
        let mut c = City::new(5);
        c.reset(w, h);
        c
    }

    #[test]
    fn test_plays_to_completion_then_stops() {
        let mut c = city(160, 120);
        c.set_param("step", ParamValue::Int(50)).unwrap();
        let expected = c.drawer().len().div_ceil(50);
        let mut frames = 0;
        while c.update(0.016, 160, 120) == FrameRequest::Continue {
            frames += 1;
            assert!(frames <= expected);
        }
        assert_eq!(frames + 1, expected);
        assert_eq!(c.drawer().state(), QueueState::Exhausted);
        // Further updates stay stopped
        assert_eq!(c.update(0.016, 160, 120), FrameRequest::Stop);
    }

    #[test]
    fn test_canvas_persists_between_frames() {
        let mut c = city(120, 90);
        c.update(0.016, 120, 90);
        let mut first = PixelBuffer::with_size(120, 90);
        c.render(&mut first);
        // The sky rect is the very first action
        assert_ne!(first.get_pixel(5, 5), Some(PAPER));

        c.update(0.016, 120, 90);
        let mut second = PixelBuffer::with_size(120, 90);
        c.render(&mut second);
        assert_ne!(second.get_pixel(5, 5), Some(PAPER));
    }

    #[test]
    fn test_rescaled_step_saturates() {
        assert_eq!(City::rescaled_step(5, true), 10);
        assert_eq!(City::rescaled_step(5, false), 2);
        assert_eq!(City::rescaled_step(1, false), 1);
        let mut step = 1;
        for _ in 0..100 {
            step = City::rescaled_step(step, true);
        }
        assert_eq!(step, i64::MAX);

        let mut c = city(40, 40);
        c.update(0.016, 40, 40);
        c.set_param("step", ParamValue::Int(step)).unwrap();
        assert_eq!(c.update(0.016, 40, 40), FrameRequest::Stop);
    }

    #[test]
    fn test_step_change_keeps_queue() {
        let mut c = city(100, 100);
        c.update(0.016, 100, 100);
        let cursor = c.drawer().cursor();
        c.set_param("step", ParamValue::Int(9)).unwrap();
        assert_eq!(c.drawer().cursor(), cursor);
        assert_eq!(c.drawer().step(), 9);
    }

    #[test]
    fn test_scene_params_regenerate() {
        let mut c = city(100, 100);
        c.update(0.016, 100, 100);
        c.set_param("use_color", ParamValue::Flag(false)).unwrap();
        assert_eq!(c.drawer().cursor(), 0);
        assert!(!c.city_params().use_color);
        assert_eq!(c.param("use_color"), Some(ParamValue::Flag(false)));
    }

    #[test]
    fn test_bad_params_are_rejected() {
        let mut c = city(50, 50);
        assert!(matches!(
            c.set_param("colour", ParamValue::Flag(true)),
            Err(SketchError::UnknownParam { .. })
        ));
        assert!(matches!(
            c.set_param("sky_limit", ParamValue::Flag(true)),
            Err(SketchError::InvalidParam { .. })
        ));
        assert!(c.set_param("step", ParamValue::Int(0)).is_err());
        assert!(c.set_param("offset", ParamValue::Number(-1.0)).is_err());
    }

    #[test]
    fn test_resize_through_update_regenerates() {
        let mut c = city(100, 100);
        c.update(0.016, 200, 150);
        let mut buffer = PixelBuffer::with_size(200, 150);
        c.render(&mut buffer);
        assert_ne!(buffer.as_bytes(), PixelBuffer::with_size(200, 150).as_bytes());
    }
}
