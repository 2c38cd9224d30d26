use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;
use sdl2::EventPump;

use crate::vic::Frame;

const SCALE: f32 = 2.0;

/// An SDL window showing the emulated frame.
pub struct Screen {
    canvas: Canvas<sdl2::video::Window>,
    event_pump: EventPump,
}

impl Screen {
    /// Opens a window sized for a scaled frame.
    pub fn open(title: &str) -> Result<Screen, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let window = video_subsystem
            .window(
                title,
                (Frame::WIDTH as f32 * SCALE) as u32,
                (Frame::HEIGHT as f32 * SCALE) as u32,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        canvas.set_scale(SCALE, SCALE)?;
        let event_pump = sdl_context.event_pump()?;

        Ok(Screen { canvas, event_pump })
    }

    pub fn texture_creator(&self) -> TextureCreator<WindowContext> {
        self.canvas.texture_creator()
    }

    /// Returns a streaming texture the size of a frame.
    pub fn frame_texture<'r>(
        creator: &'r TextureCreator<WindowContext>,
    ) -> Result<Texture<'r>, String> {
        creator
            .create_texture_target(
                PixelFormatEnum::RGB24,
                Frame::WIDTH as u32,
                Frame::HEIGHT as u32,
            )
            .map_err(|e| e.to_string())
    }

    /// Shows the frame and polls input. Returns false when the window was
    /// closed or Escape was pressed.
    pub fn present(&mut self, texture: &mut Texture, frame: &Frame) -> bool {
        if let Err(e) = texture.update(None, frame.pixels(), Frame::WIDTH * 3) {
            log::warn!("frame upload failed: {}", e);
        }
        if let Err(e) = self.canvas.copy(texture, None, None) {
            log::warn!("frame copy failed: {}", e);
        }
        self.canvas.present();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return false,
                _ => { /* do nothing */ }
            }
        }
        true
    }
}
