use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalize_or_zero(self) -> Self {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Self::ZERO;
        }
        Self::new(self.x / length, self.y / length)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Integer pixel rectangle. `right()` and `bottom()` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect of the given size whose top-left corner sits at a float position.
    /// Coordinates truncate toward zero.
    pub fn at_position(position: Vec2, w: u32, h: u32) -> Self {
        Self::new(position.x as i32, position.y as i32, w, h)
    }

    pub fn from_center(center: (i32, i32), w: u32, h: u32) -> Self {
        Self::new(center.0 - (w / 2) as i32, center.1 - (h / 2) as i32, w, h)
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub const fn center_x(&self) -> i32 {
        self.x + (self.w / 2) as i32
    }

    pub const fn center_y(&self) -> i32 {
        self.y + (self.h / 2) as i32
    }

    pub const fn center(&self) -> (i32, i32) {
        (self.center_x(), self.center_y())
    }

    pub fn center_vec(&self) -> Vec2 {
        Vec2::new(self.center_x() as f32, self.center_y() as f32)
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// True when the two rects share at least one pixel. Touching edges do not count.
    pub const fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, (right - left) as u32, (bottom - top) as u32)
    }
}

/// Integer grid direction, each axis in `-1..=1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GridDir {
    pub dx: i8,
    pub dy: i8,
}

impl GridDir {
    pub const NONE: Self = Self { dx: 0, dy: 0 };

    /// The eight non-zero directions, clockwise from east.
    pub const ALL: [GridDir; 8] = [
        GridDir { dx: 1, dy: 0 },
        GridDir { dx: 1, dy: 1 },
        GridDir { dx: 0, dy: 1 },
        GridDir { dx: -1, dy: 1 },
        GridDir { dx: -1, dy: 0 },
        GridDir { dx: -1, dy: -1 },
        GridDir { dx: 0, dy: -1 },
        GridDir { dx: 1, dy: -1 },
    ];

    pub fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx: dx.signum(),
            dy: dy.signum(),
        }
    }

    pub const fn is_none(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Affine tile-grid to world-pixel map used for tile placement and all movement.
///
/// `world_x = (col - row) * step_x + origin.x`
/// `world_y = (col + row) * step_y + origin.y`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoProjection {
    step_x: f32,
    step_y: f32,
    origin: Vec2,
}

impl IsoProjection {
    /// Steps are `tile / 3` and `tile / 6`, rounded down like the tile art grid.
    pub fn for_tile(tile_size: u32, origin: Vec2) -> Self {
        Self {
            step_x: (tile_size / 3) as f32,
            step_y: (tile_size / 6) as f32,
            origin,
        }
    }

    pub const fn step_x(&self) -> f32 {
        self.step_x
    }

    pub const fn step_y(&self) -> f32 {
        self.step_y
    }

    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn project(&self, col: f32, row: f32) -> Vec2 {
        self.grid_to_world(col, row) + self.origin
    }

    /// Integer world position of a tile's top-left corner.
    pub fn project_px(&self, col: usize, row: usize) -> (i32, i32) {
        let world = self.project(col as f32, row as f32);
        (world.x.round() as i32, world.y.round() as i32)
    }

    pub fn unproject(&self, world: Vec2) -> (f32, f32) {
        self.world_to_grid(world - self.origin)
    }

    /// Grid-space delta to world-space delta, without the origin.
    pub fn grid_to_world(&self, dx: f32, dy: f32) -> Vec2 {
        Vec2::new((dx - dy) * self.step_x, (dx + dy) * self.step_y)
    }

    pub fn world_to_grid(&self, delta: Vec2) -> (f32, f32) {
        let a = delta.x / self.step_x;
        let b = delta.y / self.step_y;
        ((a + b) * 0.5, (b - a) * 0.5)
    }

    /// World velocity for a grid direction at the given speed. A unit grid axis moves
    /// exactly `speed` pixels per second; diagonals scale with the iso skew.
    pub fn velocity(&self, dx: f32, dy: f32, speed: f32) -> Vec2 {
        let norm = speed / self.step_x.hypot(self.step_y);
        self.grid_to_world(dx, dy) * norm
    }

    pub fn dir_velocity(&self, dir: GridDir, speed: f32) -> Vec2 {
        self.velocity(f32::from(dir.dx), f32::from(dir.dy), speed)
    }
}
