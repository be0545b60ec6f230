use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture, TextureError};
use thiserror::Error;
use winit::window::Window;

use super::canvas::Canvas;
use crate::app::Scene;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create or present pixel buffer: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("failed to resize surface: {0}")]
    Texture(#[from] TextureError),
}

/// Presents a fixed-size logical framebuffer, scaled by `pixels` to the window surface.
pub struct Renderer {
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        buffer_width: u32,
        buffer_height: u32,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(buffer_width, buffer_height, surface)?;
        Ok(Self {
            pixels,
            buffer_width,
            buffer_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        Ok(())
    }

    pub fn draw_scene(&mut self, scene: &dyn Scene) -> Result<(), RenderError> {
        let mut canvas = Canvas::new(
            self.pixels.frame_mut(),
            self.buffer_width,
            self.buffer_height,
        );
        scene.render(&mut canvas);
        self.pixels.render()?;
        Ok(())
    }
}
