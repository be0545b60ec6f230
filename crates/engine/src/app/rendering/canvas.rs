use crate::assets::{blend_over, Sprite};
use crate::geometry::Rect;

/// Software drawing surface over a tightly packed RGBA8 frame.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    /// The height is trimmed to the rows the buffer actually holds.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        let row_bytes = width as usize * 4;
        let available_rows = if row_bytes == 0 {
            0
        } else {
            (frame.len() / row_bytes) as u32
        };
        Self {
            frame,
            width,
            height: height.min(available_rows),
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let left = rect.left().max(0);
        let top = rect.top().max(0);
        let right = rect.right().min(self.width as i32);
        let bottom = rect.bottom().min(self.height as i32);
        for y in top..bottom {
            for x in left..right {
                if let Some(pixel) = self.pixel_mut(x, y) {
                    blend_over(pixel, color, 255);
                }
            }
        }
    }

    /// Draws `sprite` with its top-left corner at `(left, top)`, clipped to the canvas.
    /// `opacity` scales the sprite's own alpha; zero draws nothing.
    pub fn blit(&mut self, sprite: &Sprite, left: i32, top: i32, opacity: u8) {
        if opacity == 0 {
            return;
        }
        let src_x0 = (-left).max(0) as u32;
        let src_y0 = (-top).max(0) as u32;
        let src_x1 = sprite
            .width()
            .min((self.width as i32 - left).max(0) as u32);
        let src_y1 = sprite
            .height()
            .min((self.height as i32 - top).max(0) as u32);

        for sy in src_y0..src_y1 {
            for sx in src_x0..src_x1 {
                let src = sprite.pixel(sx, sy);
                if src[3] == 0 {
                    continue;
                }
                if let Some(pixel) = self.pixel_mut(left + sx as i32, top + sy as i32) {
                    blend_over(pixel, src, opacity);
                }
            }
        }
    }

    fn pixel_mut(&mut self, x: i32, y: i32) -> Option<&mut [u8]> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.frame.get_mut(offset..offset + 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_at(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn blit_clips_partially_offscreen_sprite() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let sprite = Sprite::solid(3, 3, [200, 0, 0, 255]);
        {
            let mut canvas = Canvas::new(&mut frame, 4, 4);
            canvas.clear([0, 0, 0, 255]);
            canvas.blit(&sprite, -1, 2, 255);
        }
        assert_eq!(pixel_at(&frame, 4, 0, 2), [200, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 1, 3), [200, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 2, 2), [0, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 0, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn transparent_pixels_and_zero_opacity_leave_frame_untouched() {
        let mut frame = vec![7u8; 2 * 2 * 4];
        let ghost = Sprite::solid(2, 2, [255, 255, 255, 0]);
        let solid = Sprite::solid(2, 2, [255, 255, 255, 255]);
        {
            let mut canvas = Canvas::new(&mut frame, 2, 2);
            canvas.blit(&ghost, 0, 0, 255);
            canvas.blit(&solid, 0, 0, 0);
        }
        assert!(frame.iter().all(|byte| *byte == 7));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut frame = vec![0u8; 3 * 3 * 4];
        {
            let mut canvas = Canvas::new(&mut frame, 3, 3);
            canvas.fill_rect(Rect::new(2, 2, 10, 10), [0, 255, 0, 255]);
        }
        assert_eq!(pixel_at(&frame, 3, 2, 2), [0, 255, 0, 255]);
        assert_eq!(pixel_at(&frame, 3, 1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn short_buffer_trims_height() {
        let mut frame = vec![0u8; 4 * 4 * 2];
        let canvas = Canvas::new(&mut frame, 4, 10);
        assert_eq!(canvas.height(), 2);
    }
}
