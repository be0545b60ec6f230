use crate::geometry::{Rect, Vec2};

/// Screen-edge scrolling camera. The player is free inside a central box inset by a
/// quarter of the viewport on each side; crossing that box drags the camera along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeScrollCamera {
    position: Vec2,
    viewport_width: u32,
    viewport_height: u32,
}

impl EdgeScrollCamera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport_width,
            viewport_height,
        }
    }

    /// World coordinate shown at the top-left corner of the viewport.
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    pub fn margins(&self) -> (f32, f32) {
        (
            self.viewport_width as f32 / 4.0,
            self.viewport_height as f32 / 4.0,
        )
    }

    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.position
    }

    pub fn viewport_rect(&self) -> Rect {
        Rect::at_position(self.position, self.viewport_width, self.viewport_height)
    }

    /// Shifts the camera so `target` sits inside the margins, then clamps the viewport to
    /// `bounds`. A map narrower than the viewport pins the camera to the map's left/top edge.
    pub fn follow(&mut self, target: Vec2, bounds: Rect) {
        let (margin_x, margin_y) = self.margins();
        let view_w = self.viewport_width as f32;
        let view_h = self.viewport_height as f32;
        let screen = self.world_to_screen(target);

        if screen.x < margin_x {
            self.position.x -= margin_x - screen.x;
        } else if screen.x > view_w - margin_x {
            self.position.x += screen.x - (view_w - margin_x);
        }

        if screen.y < margin_y {
            self.position.y -= margin_y - screen.y;
        } else if screen.y > view_h - margin_y {
            self.position.y += screen.y - (view_h - margin_y);
        }

        self.position.x = self
            .position
            .x
            .min(bounds.right() as f32 - view_w)
            .max(bounds.left() as f32);
        self.position.y = self
            .position
            .y
            .min(bounds.bottom() as f32 - view_h)
            .max(bounds.top() as f32);
    }
}
