use iso_engine::{FloorMask, Rect, Sprite, Vec2};

/// Downward acceleration for jumps and falls, in pixels per second squared.
pub(crate) const GRAVITY: f32 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EntityId(pub(crate) u64);

#[derive(Debug, Default)]
pub(crate) struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Position and footing shared by everything that moves. The collision rect is derived
/// from `pos` (top-left) and the sprite size; nothing else shifts it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Body {
    pub(crate) pos: Vec2,
    pub(crate) size: (u32, u32),
    pub(crate) falling: bool,
    pub(crate) fall_vel: f32,
}

impl Body {
    pub(crate) fn new(pos: Vec2, size: (u32, u32)) -> Self {
        Self {
            pos,
            size,
            falling: false,
            fall_vel: 0.0,
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        Rect::at_position(self.pos, self.size.0, self.size.1)
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.rect().center_vec()
    }

    /// Bottom-centre pixel, one above the rect's bottom edge.
    pub(crate) fn foot_point(&self) -> (i32, i32) {
        let rect = self.rect();
        (rect.center_x(), rect.bottom() - 1)
    }

    /// Sample point for hazards, one pixel higher than the footing sample.
    pub(crate) fn hazard_point(&self) -> (i32, i32) {
        let rect = self.rect();
        (rect.center_x(), rect.bottom() - 2)
    }

    /// Left quarter, centre and right quarter of the foot line if the body stood at `pos`.
    pub(crate) fn foot_line_at(&self, pos: Vec2) -> [(i32, i32); 3] {
        let (w, h) = (self.size.0 as f32, self.size.1 as f32);
        let y = (pos.y + h - 2.0) as i32;
        [
            ((pos.x + w * 0.25) as i32, y),
            ((pos.x + w * 0.5) as i32, y),
            ((pos.x + w * 0.75) as i32, y),
        ]
    }

    /// Recomputes `falling` from the floor under the foot point. Regaining footing clears
    /// any accumulated fall speed.
    pub(crate) fn update_footing(&mut self, floor: &FloorMask) {
        let (x, y) = self.foot_point();
        if floor.is_floor(x, y) {
            self.falling = false;
            self.fall_vel = 0.0;
        } else {
            self.falling = true;
        }
    }

    pub(crate) fn apply_fall(&mut self, dt: f32) {
        if !self.falling {
            return;
        }
        self.fall_vel += GRAVITY * dt;
        self.pos.y += self.fall_vel * dt;
    }
}

/// Frame timer. Large steps skip frames instead of stalling.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Animator {
    frame: usize,
    timer: f32,
    interval: f32,
}

impl Animator {
    pub(crate) fn new(interval: f32) -> Self {
        Self {
            frame: 0,
            timer: 0.0,
            interval: interval.max(f32::EPSILON),
        }
    }

    pub(crate) fn advance(&mut self, dt: f32, frame_count: usize) {
        if frame_count == 0 {
            return;
        }
        self.timer += dt;
        if self.timer >= self.interval {
            let steps = (self.timer / self.interval) as usize;
            self.frame = (self.frame + steps) % frame_count;
            self.timer %= self.interval;
        }
    }

    pub(crate) fn frame(&self) -> usize {
        self.frame
    }

    pub(crate) fn restart(&mut self) {
        self.frame = 0;
        self.timer = 0.0;
    }

    pub(crate) fn pick<'a>(&self, frames: &'a [Sprite]) -> Option<&'a Sprite> {
        if frames.is_empty() {
            return None;
        }
        frames.get(self.frame % frames.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Ignored,
    Wounded,
    Killed,
}

/// Anything the level can hurt.
pub(crate) trait Damageable {
    fn apply_damage(&mut self, amount: i32) -> DamageOutcome;
    fn is_dead(&self) -> bool;
}

/// Hit points for entities that survive more than one blow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Health {
    pub(crate) hp: i32,
    pub(crate) max_hp: i32,
}

impl Health {
    pub(crate) fn full(max_hp: i32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    pub(crate) fn take(&mut self, amount: i32) -> DamageOutcome {
        self.hp -= amount;
        if self.hp <= 0 {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }
}
