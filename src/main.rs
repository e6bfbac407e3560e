use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use sdl2::keyboard::Keycode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sketchbook::config::AppConfig;
use sketchbook::display::{Display, InputEvent, PixelBuffer, RenderTarget};
use sketchbook::sketches::{
    self, City, FrameRequest, ParamValue, Playback, Sketch, SEED_MASK, SKETCH_NAMES,
};
use sketchbook::util::{FpsCounter, Rng};

/// Longest frame step handed to a sketch, seconds
const MAX_DT: f32 = 0.1;

#[derive(Parser, Debug)]
#[command(name = "sketchbook", version, about = "Generative-art sketches in an SDL2 window")]
struct Args {
    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Disable VSync for an uncapped framerate
    #[arg(long)]
    no_vsync: bool,

    /// JSON config file with window settings and per-sketch params
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sketch to start with (city, swarms, chromatic)
    #[arg(long)]
    sketch: Option<String>,

    /// Seed for every random choice
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    /// Command line flags win over the config file
    fn resolve(self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("load config '{}'", path.display()))?,
            None => AppConfig::default(),
        };
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
        if self.no_vsync {
            config.vsync = false;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(sketch) = self.sketch {
            config.sketch = sketch;
        }
        anyhow::ensure!(
            config.width > 0 && config.height > 0,
            "window size {}x{} is empty",
            config.width,
            config.height
        );
        Ok(config)
    }
}

fn log_controls() {
    info!("controls:");
    info!("  Space      - pause / resume");
    info!("  R          - restart the sketch");
    info!("  N          - new seed");
    info!("  Left/Right - cycle sketches");
    for (i, name) in SKETCH_NAMES.iter().enumerate() {
        info!("  {}          - {}", i + 1, name);
    }
    info!("  C          - toggle colour");
    info!("  Up/Down    - city strokes per frame");
    info!("  F          - log FPS");
    info!("  Escape     - quit");
}

/// Set a param from the keyboard, logging instead of failing
fn tweak(sketch: &mut dyn Sketch, playback: &mut Playback, key: &str, value: ParamValue) {
    match sketch.set_param(key, value) {
        Ok(()) => {
            info!(sketch = sketch.name(), key, ?value, "param changed");
            // Scene params regenerate the sketch, so let it run again
            if key != "step" {
                playback.restart();
            }
        },
        Err(e) => warn!(error = %e, "param not changed"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().resolve()?;
    let (mut width, mut height) = (config.width, config.height);

    let mut gallery = sketches::all(config.seed);
    for sketch in &mut gallery {
        config.apply(sketch.as_mut());
    }
    let mut current = SKETCH_NAMES
        .iter()
        .position(|name| *name == config.sketch)
        .with_context(|| format!("unknown sketch '{}'", config.sketch))?;

    let (mut display, texture_creator) =
        Display::with_options("sketchbook", width, height, config.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut buffer = PixelBuffer::with_size(width, height);

    let mut fps_counter = FpsCounter::new(60);
    let mut log_fps = false;
    let mut fps_timer = 0.0;

    let mut seeds = Rng::new(config.seed);
    let mut playback = Playback::default();
    gallery[current].reset(width, height);

    info!(width, height, vsync = config.vsync, seed = config.seed, "=== sketchbook ===");
    log_controls();

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::Resized { width: w, height: h } => {
                    if (w, h) != (width, height) {
                        width = w;
                        height = h;
                        target = RenderTarget::with_size(&texture_creator, width, height)?;
                        buffer = PixelBuffer::with_size(width, height);
                        gallery[current].reset(width, height);
                        playback.restart();
                        info!(width, height, "window resized");
                    }
                },
                InputEvent::KeyDown(key) => {
                    let count = gallery.len();
                    let sketch = gallery[current].as_mut();
                    let mut select = None;
                    match key {
                        Keycode::Escape => break 'main,
                        Keycode::Space => {
                            playback.toggle_pause();
                            info!(paused = playback.paused, "playback");
                        },
                        Keycode::R => {
                            sketch.reset(width, height);
                            playback.restart();
                        },
                        Keycode::N => {
                            let seed = seeds.next_u64() & SEED_MASK;
                            if sketch.param("seed").is_some() {
                                tweak(sketch, &mut playback, "seed", ParamValue::Int(seed as i64));
                            } else {
                                sketch.reset(width, height);
                                playback.restart();
                            }
                        },
                        Keycode::C => {
                            if let Some(ParamValue::Flag(on)) = sketch.param("use_color") {
                                tweak(sketch, &mut playback, "use_color", ParamValue::Flag(!on));
                            }
                        },
                        Keycode::Up | Keycode::Down => {
                            if let Some(ParamValue::Int(step)) = sketch.param("step") {
                                let step = City::rescaled_step(step, key == Keycode::Up);
                                tweak(sketch, &mut playback, "step", ParamValue::Int(step));
                            }
                        },
                        Keycode::F => {
                            log_fps = !log_fps;
                            fps_timer = 0.0;
                        },
                        Keycode::Left => select = Some((current + count - 1) % count),
                        Keycode::Right => select = Some((current + 1) % count),
                        Keycode::Num1 => select = Some(0),
                        Keycode::Num2 => select = Some(1),
                        Keycode::Num3 => select = Some(2),
                        _ => {},
                    }

                    if let Some(idx) = select.filter(|idx| *idx < count) {
                        current = idx;
                        buffer.clear((0, 0, 0));
                        gallery[current].reset(width, height);
                        playback.restart();
                        info!(sketch = gallery[current].name(), "switched sketch");
                    }
                },
            }
        }

        let sketch = gallery[current].as_mut();
        if playback.should_update() {
            let request = sketch.update(dt.min(MAX_DT), width, height);
            playback.apply(request);
            if request == FrameRequest::Stop {
                info!(sketch = sketch.name(), "sketch stopped, press R or N to go again");
            }
        }
        sketch.render(&mut buffer);

        if log_fps {
            fps_timer += dt;
            if fps_timer >= 1.0 {
                fps_timer = 0.0;
                info!(fps = avg_fps as u32, "frame rate");
            }
        }

        display.present(&mut target, &buffer)?;
    }

    Ok(())
}
