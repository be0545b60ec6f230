use crate::geometry::Rect;

/// Alpha values strictly above this count as solid.
pub const MASK_ALPHA_THRESHOLD: u8 = 127;

const WORD_BITS: usize = 64;

/// One bit per pixel. Reads outside the bitmap are `false`, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words: Vec<u64>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        let bits = width as usize * height as usize;
        Self {
            width,
            height,
            words: vec![0; bits.div_ceil(WORD_BITS)],
        }
    }

    pub fn filled(width: u32, height: u32) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                mask.set(x, y, true);
            }
        }
        mask
    }

    /// Builds a mask from tightly packed RGBA8 pixels. Missing trailing pixels read as clear.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        let mut mask = Self::new(width, height);
        for (index, pixel) in rgba.chunks_exact(4).enumerate() {
            if pixel[3] > MASK_ALPHA_THRESHOLD {
                let x = (index % width.max(1) as usize) as i32;
                let y = (index / width.max(1) as usize) as i32;
                mask.set(x, y, true);
            }
        }
        mask
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        match self.bit_index(x, y) {
            Some(index) => self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0,
            None => false,
        }
    }

    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        let Some(index) = self.bit_index(x, y) else {
            return;
        };
        let bit = 1u64 << (index % WORD_BITS);
        if value {
            self.words[index / WORD_BITS] |= bit;
        } else {
            self.words[index / WORD_BITS] &= !bit;
        }
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// ORs `other` into this mask with its top-left corner at `offset`.
    pub fn draw(&mut self, other: &Mask, offset: (i32, i32)) {
        for y in 0..other.height as i32 {
            for x in 0..other.width as i32 {
                if other.get(x, y) {
                    self.set(x + offset.0, y + offset.1, true);
                }
            }
        }
    }

    /// True when any set bit of `other`, placed at `offset` relative to this mask,
    /// lands on a set bit here.
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let x_start = offset.0.max(0);
        let y_start = offset.1.max(0);
        let x_end = (offset.0 + other.width as i32).min(self.width as i32);
        let y_end = (offset.1 + other.height as i32).min(self.height as i32);

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x, y) && other.get(x - offset.0, y - offset.1) {
                    return true;
                }
            }
        }
        false
    }

    fn bit_index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Overlap test for two masks placed at world rects.
pub fn masks_overlap(a: &Mask, a_rect: Rect, b: &Mask, b_rect: Rect) -> bool {
    if !a_rect.intersects(&b_rect) {
        return false;
    }
    a.overlaps(b, (b_rect.x - a_rect.x, b_rect.y - a_rect.y))
}

/// Walkable area of a level, anchored at the world bounds' top-left corner.
#[derive(Debug, Clone)]
pub struct FloorMask {
    bounds: Rect,
    mask: Mask,
}

impl FloorMask {
    pub fn new(bounds: Rect, mask: Mask) -> Self {
        Self { bounds, mask }
    }

    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    pub const fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Samples a world-space pixel. Anything outside the bounds is not floor.
    pub fn is_floor(&self, world_x: i32, world_y: i32) -> bool {
        self.mask
            .get(world_x - self.bounds.x, world_y - self.bounds.y)
    }

    pub fn all_floor(&self, points: &[(i32, i32)]) -> bool {
        points.iter().all(|&(x, y)| self.is_floor(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_false() {
        let mask = Mask::filled(4, 4);
        assert!(mask.get(0, 0));
        assert!(mask.get(3, 3));
        assert!(!mask.get(-1, 0));
        assert!(!mask.get(4, 0));
        assert!(!mask.get(0, 4));
    }

    #[test]
    fn alpha_threshold_is_exclusive() {
        let rgba = [0, 0, 0, 127, 0, 0, 0, 128];
        let mask = Mask::from_rgba(2, 1, &rgba);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn draw_composites_with_offset_and_clips() {
        let mut canvas = Mask::new(10, 10);
        canvas.draw(&Mask::filled(4, 4), (8, -2));
        assert_eq!(canvas.count(), 4);
        assert!(canvas.get(9, 1));
        assert!(!canvas.get(9, 2));
    }

    #[test]
    fn overlap_respects_offset() {
        let mut a = Mask::new(8, 8);
        a.set(7, 7, true);
        let b = Mask::filled(2, 2);
        assert!(a.overlaps(&b, (6, 6)));
        assert!(!a.overlaps(&b, (8, 8)));
        assert!(!a.overlaps(&b, (0, 0)));
    }

    #[test]
    fn world_rect_overlap_requires_set_bits() {
        let ring = {
            let mut mask = Mask::filled(6, 6);
            for y in 1..5 {
                for x in 1..5 {
                    mask.set(x, y, false);
                }
            }
            mask
        };
        let dot = Mask::filled(2, 2);
        let ring_rect = Rect::new(100, 100, 6, 6);
        assert!(!masks_overlap(&ring, ring_rect, &dot, Rect::new(102, 102, 2, 2)));
        assert!(masks_overlap(&ring, ring_rect, &dot, Rect::new(99, 99, 2, 2)));
        assert!(!masks_overlap(&ring, ring_rect, &dot, Rect::new(0, 0, 2, 2)));
    }

    #[test]
    fn floor_mask_samples_in_world_space() {
        let floor = FloorMask::new(Rect::new(-10, 20, 5, 5), Mask::filled(5, 5));
        assert!(floor.is_floor(-10, 20));
        assert!(floor.is_floor(-6, 24));
        assert!(!floor.is_floor(-11, 20));
        assert!(!floor.is_floor(0, 0));
        assert!(floor.all_floor(&[(-9, 21), (-7, 23)]));
        assert!(!floor.all_floor(&[(-9, 21), (-5, 23)]));
    }
}
