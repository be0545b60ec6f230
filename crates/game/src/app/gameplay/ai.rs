use std::f32::consts::TAU;

use iso_engine::{FloorMask, GridDir, IsoProjection, Rect, Vec2};
use rand::Rng;
use tracing::debug;

use super::entity::Body;

/// Tuning for a walking melee enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GroundAiParams {
    pub(crate) detect_radius: f32,
    pub(crate) melee_range: f32,
    pub(crate) patrol_speed: f32,
    pub(crate) chase_speed: f32,
    pub(crate) turn_delay: (f32, f32),
    pub(crate) attack_cooldown: f32,
    pub(crate) damage: i32,
    pub(crate) max_hp: i32,
}

pub(crate) const BANDIT_PARAMS: GroundAiParams = GroundAiParams {
    detect_radius: 250.0,
    melee_range: 40.0,
    patrol_speed: 60.0,
    chase_speed: 110.0,
    turn_delay: (1.2, 3.0),
    attack_cooldown: 0.8,
    damage: 10,
    max_hp: 30,
};

pub(crate) const SKELETON_PARAMS: GroundAiParams = GroundAiParams {
    detect_radius: 250.0,
    melee_range: 40.0,
    patrol_speed: 70.0,
    chase_speed: 120.0,
    turn_delay: (1.0, 2.5),
    attack_cooldown: 0.8,
    damage: 25,
    max_hp: 40,
};

const BAT_SPEED: f32 = 120.0;
const BAT_TURN_DELAY: (f32, f32) = (1.0, 3.0);
const BAT_ATTACK_COOLDOWN: f32 = 0.8;
const BAT_DAMAGE: i32 = 10;

/// What an enemy sees of the world during its own update.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AiContext<'a> {
    pub(crate) player_center: Vec2,
    pub(crate) player_rect: Rect,
    pub(crate) floor: &'a FloorMask,
    pub(crate) projection: &'a IsoProjection,
    /// Visible part of the world; flyers stay inside it.
    pub(crate) screen: Rect,
    /// Extra distance a chasing enemy tolerates before giving up.
    pub(crate) chase_dead_zone: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Strike {
    pub(crate) damage: i32,
}

/// Patrol/chase walker. Mode is recomputed from distance every tick.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GroundAi {
    params: GroundAiParams,
    dir: GridDir,
    turn_timer: f32,
    attack_cooldown: f32,
    chasing: bool,
}

impl GroundAi {
    pub(crate) fn new<R: Rng + ?Sized>(params: GroundAiParams, rng: &mut R) -> Self {
        let mut ai = Self {
            params,
            dir: GridDir::NONE,
            turn_timer: 0.0,
            attack_cooldown: 0.0,
            chasing: false,
        };
        ai.pick_patrol_direction(rng);
        ai
    }

    #[cfg(test)]
    pub(crate) fn is_chasing(&self) -> bool {
        self.chasing
    }

    #[cfg(test)]
    pub(crate) fn direction(&self) -> GridDir {
        self.dir
    }

    pub(crate) fn update<R: Rng + ?Sized>(
        &mut self,
        body: &mut Body,
        dt: f32,
        ctx: &AiContext<'_>,
        rng: &mut R,
    ) -> Option<Strike> {
        let to_player = ctx.player_center - body.center();
        let distance = to_player.length();
        let radius = if self.chasing {
            self.params.detect_radius + ctx.chase_dead_zone.max(0.0)
        } else {
            self.params.detect_radius
        };
        let was_chasing = self.chasing;
        self.chasing = distance <= radius;
        if self.chasing != was_chasing {
            debug!(chasing = self.chasing, distance, "enemy_mode_changed");
        }

        if self.chasing {
            let (gx, gy) = ctx.projection.world_to_grid(to_player);
            self.dir = chase_direction(gx, gy);
        } else {
            self.turn_timer -= dt;
            if self.turn_timer <= 0.0 {
                self.pick_patrol_direction(rng);
            }
        }

        if !body.falling {
            let speed = if self.chasing {
                self.params.chase_speed
            } else {
                self.params.patrol_speed
            };
            let next = body.pos + ctx.projection.dir_velocity(self.dir, speed) * dt;
            if ctx.floor.all_floor(&body.foot_line_at(next)) {
                body.pos = next;
            } else {
                self.pick_patrol_direction(rng);
            }
        }

        let strike = if self.chasing
            && distance <= self.params.melee_range
            && self.attack_cooldown <= 0.0
        {
            self.attack_cooldown = self.params.attack_cooldown;
            Some(Strike {
                damage: self.params.damage,
            })
        } else {
            None
        };
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        strike
    }

    fn pick_patrol_direction<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.dir = GridDir::ALL[rng.gen_range(0..GridDir::ALL.len())];
        let (min, max) = self.params.turn_delay;
        self.turn_timer = rng.gen_range(min..=max);
    }
}

/// Dominant-axis pursuit in grid space; never diagonal.
pub(crate) fn chase_direction(gx: f32, gy: f32) -> GridDir {
    if gx.abs() > gy.abs() {
        GridDir::new(axis_sign(gx), 0)
    } else {
        GridDir::new(0, axis_sign(gy))
    }
}

fn axis_sign(value: f32) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Free-flying wanderer: ignores the floor and bounces inside the screen.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlyerAi {
    dir: Vec2,
    turn_timer: f32,
    attack_cooldown: f32,
}

impl FlyerAi {
    pub(crate) fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut ai = Self {
            dir: Vec2::ZERO,
            turn_timer: 0.0,
            attack_cooldown: 0.0,
        };
        ai.pick_heading(rng);
        ai
    }

    pub(crate) fn heading(&self) -> Vec2 {
        self.dir
    }

    pub(crate) fn update<R: Rng + ?Sized>(
        &mut self,
        body: &mut Body,
        dt: f32,
        ctx: &AiContext<'_>,
        rng: &mut R,
    ) -> Option<Strike> {
        self.turn_timer -= dt;
        if self.turn_timer <= 0.0 {
            self.pick_heading(rng);
        }
        body.pos += self.dir * (BAT_SPEED * dt);
        self.bounce(body, ctx.screen);

        let strike = if self.attack_cooldown <= 0.0 && body.rect().intersects(&ctx.player_rect) {
            self.attack_cooldown = BAT_ATTACK_COOLDOWN;
            Some(Strike { damage: BAT_DAMAGE })
        } else {
            None
        };
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        strike
    }

    fn bounce(&mut self, body: &mut Body, screen: Rect) {
        let (w, h) = (body.size.0 as f32, body.size.1 as f32);
        let (left, top) = (screen.left() as f32, screen.top() as f32);
        let right = (screen.right() as f32 - w).max(left);
        let bottom = (screen.bottom() as f32 - h).max(top);

        if body.pos.x < left {
            body.pos.x = left;
            self.dir.x = self.dir.x.abs();
        } else if body.pos.x > right {
            body.pos.x = right;
            self.dir.x = -self.dir.x.abs();
        }
        if body.pos.y < top {
            body.pos.y = top;
            self.dir.y = self.dir.y.abs();
        } else if body.pos.y > bottom {
            body.pos.y = bottom;
            self.dir.y = -self.dir.y.abs();
        }
    }

    fn pick_heading<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let angle = rng.gen_range(0.0..TAU);
        self.dir = Vec2::new(angle.cos(), angle.sin());
        self.turn_timer = rng.gen_range(BAT_TURN_DELAY.0..=BAT_TURN_DELAY.1);
    }
}
