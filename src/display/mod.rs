mod pixel_buffer;

pub use pixel_buffer::{Paint, PixelBuffer};

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::error::{SketchError, SketchResult};

/// 8-bit RGB color
pub type Rgb = (u8, u8, u8);

pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 800;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
}

/// Streaming texture the pixel buffer is uploaded into each frame
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    Resized { width: u32, height: u32 },
}

fn display_err(e: impl ToString) -> SketchError {
    SketchError::Display(e.to_string())
}

impl Display {
    /// Create a resizable window
    /// vsync=true: locked to monitor refresh (typically 60fps)
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> SketchResult<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(display_err)?;
        let video_subsystem = sdl_context.video().map_err(display_err)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(display_err)?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(display_err)?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(display_err)?;

        Ok((Self { canvas, event_pump }, texture_creator))
    }

    pub fn present(&mut self, target: &mut RenderTarget, buffer: &PixelBuffer) -> SketchResult<()> {
        if target.width != buffer.width() || target.height != buffer.height() {
            return Err(SketchError::Display(format!(
                "buffer {}x{} does not match render target {}x{}",
                buffer.width(),
                buffer.height(),
                target.width,
                target.height
            )));
        }
        target
            .texture
            .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
            .map_err(display_err)?;

        self.canvas.copy(&target.texture, None, None).map_err(display_err)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::Window {
                    win_event: WindowEvent::SizeChanged(w, h),
                    ..
                } if w > 0 && h > 0 => events.push(InputEvent::Resized {
                    width: w as u32,
                    height: h as u32,
                }),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> SketchResult<Self> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(display_err)?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }
}
