use iso_engine::{InputAction, InputSnapshot, IsoProjection, Rect, Sprite, Vec2};

use super::art::{Frames, PlayerArt};
use super::entity::{Animator, Body, DamageOutcome, Damageable, Health, GRAVITY};
use crate::app::audio::{AudioCue, AudioSink};

pub(crate) const PLAYER_MAX_HP: i32 = 100;
const PLAYER_SPEED: f32 = 200.0;
const JUMP_VELOCITY: f32 = -300.0;
const ATTACK_DURATION_SECONDS: f32 = 0.3;
const ATTACK_HITBOX_WINDOW_SECONDS: f32 = 0.15;
const ATTACK_HITBOX_SIZE: (u32, u32) = (60, 40);
const ATTACK_HITBOX_REACH: f32 = 35.0;
const INVULNERABILITY_SECONDS: f32 = 1.0;
const BLINK_INTERVAL_SECONDS: f32 = 0.1;
const ANIMATION_INTERVAL_SECONDS: f32 = 0.15;
const DIAGONAL_SCALE: f32 = std::f32::consts::FRAC_1_SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Idle,
    Run,
    #[allow(dead_code)]
    Climb,
    #[allow(dead_code)]
    Crouch,
    Attack,
}

/// Held keys relevant to the controller for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PlayerInput {
    pub(crate) up: bool,
    pub(crate) down: bool,
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) jump: bool,
    pub(crate) attack: bool,
}

impl PlayerInput {
    pub(crate) fn from_snapshot(input: &InputSnapshot) -> Self {
        Self {
            up: input.is_down(InputAction::MoveUp),
            down: input.is_down(InputAction::MoveDown),
            left: input.is_down(InputAction::MoveLeft),
            right: input.is_down(InputAction::MoveRight),
            jump: input.is_down(InputAction::Jump),
            attack: input.is_down(InputAction::Attack),
        }
    }

    /// Grid-space intent, diagonals scaled to unit length.
    fn grid_direction(&self) -> (f32, f32) {
        let dx = f32::from(i8::from(self.right) - i8::from(self.left));
        let dy = f32::from(i8::from(self.down) - i8::from(self.up));
        if dx != 0.0 && dy != 0.0 {
            (dx * DIAGONAL_SCALE, dy * DIAGONAL_SCALE)
        } else {
            (dx, dy)
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    pub(crate) body: Body,
    art: PlayerArt,
    animator: Animator,
    state: PlayerState,
    vel: Vec2,
    facing: Vec2,
    jumping: bool,
    vz: f32,
    z_offset: f32,
    attack_timer: f32,
    attack_ready: bool,
    health: Health,
    invulnerable: f32,
    blink_timer: f32,
    blink_visible: bool,
}

impl Player {
    pub(crate) fn spawn(pos: Vec2, art: PlayerArt) -> Self {
        let size = art.idle.first().map(Sprite::size).unwrap_or((1, 1));
        Self {
            body: Body::new(pos, size),
            art,
            animator: Animator::new(ANIMATION_INTERVAL_SECONDS),
            state: PlayerState::Idle,
            vel: Vec2::ZERO,
            facing: Vec2::new(1.0, 0.0),
            jumping: false,
            vz: 0.0,
            z_offset: 0.0,
            attack_timer: 0.0,
            attack_ready: true,
            health: Health::full(PLAYER_MAX_HP),
            invulnerable: 0.0,
            blink_timer: 0.0,
            blink_visible: true,
        }
    }

    /// Starts with health carried over from a previous level, clamped to `1..=max`.
    pub(crate) fn with_hp(mut self, hp: i32) -> Self {
        self.health.hp = hp.clamp(1, self.health.max_hp);
        self
    }

    pub(crate) fn update(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        projection: &IsoProjection,
        audio: &mut dyn AudioSink,
    ) {
        if self.state == PlayerState::Attack {
            self.attack_timer -= dt;
            if self.attack_timer <= 0.0 {
                self.attack_timer = 0.0;
                self.state = PlayerState::Idle;
            }
        }

        if !self.body.falling {
            self.handle_input(input, projection, audio);
        }

        if self.jumping {
            self.vz += GRAVITY * dt;
            self.z_offset += self.vz * dt;
            if self.z_offset >= 0.0 {
                self.z_offset = 0.0;
                self.vz = 0.0;
                self.jumping = false;
            }
        }

        self.body.pos += self.vel * dt;
        self.body.apply_fall(dt);

        let frame_count = self.clip().len();
        self.animator.advance(dt, frame_count);
        self.tick_invulnerability(dt);
    }

    fn handle_input(
        &mut self,
        input: &PlayerInput,
        projection: &IsoProjection,
        audio: &mut dyn AudioSink,
    ) {
        let (dx, dy) = input.grid_direction();
        if dx != 0.0 || dy != 0.0 {
            self.vel = projection.velocity(dx, dy, PLAYER_SPEED);
            self.facing = Vec2::new(dx - dy, dx + dy).normalize_or_zero();
            if self.state != PlayerState::Attack {
                self.state = PlayerState::Run;
            }
        } else {
            self.vel = Vec2::ZERO;
            if self.state != PlayerState::Attack {
                self.state = PlayerState::Idle;
            }
        }

        if input.jump && !self.jumping {
            self.jumping = true;
            self.vz = JUMP_VELOCITY;
            audio.play(AudioCue::Jump);
        }

        if input.attack {
            if self.attack_ready && self.state != PlayerState::Attack {
                self.start_attack();
                audio.play(AudioCue::Swing);
            }
            self.attack_ready = false;
        } else {
            self.attack_ready = true;
        }
    }

    /// Begins a fresh swing and restarts its hitbox window.
    pub(crate) fn start_attack(&mut self) {
        self.state = PlayerState::Attack;
        self.attack_timer = ATTACK_DURATION_SECONDS;
        self.animator.restart();
    }

    /// Live during the first part of the swing, offset along the facing direction.
    pub(crate) fn attack_hitbox(&self) -> Option<Rect> {
        let live_after = ATTACK_DURATION_SECONDS - ATTACK_HITBOX_WINDOW_SECONDS;
        if self.state != PlayerState::Attack || self.attack_timer <= live_after {
            return None;
        }
        let center = self.body.center() + self.facing * ATTACK_HITBOX_REACH;
        Some(Rect::from_center(
            (center.x as i32, center.y as i32),
            ATTACK_HITBOX_SIZE.0,
            ATTACK_HITBOX_SIZE.1,
        ))
    }

    fn tick_invulnerability(&mut self, dt: f32) {
        if self.invulnerable <= 0.0 {
            self.blink_timer = 0.0;
            self.blink_visible = true;
            return;
        }
        self.invulnerable = (self.invulnerable - dt).max(0.0);
        self.blink_timer += dt;
        while self.blink_timer >= BLINK_INTERVAL_SECONDS {
            self.blink_timer -= BLINK_INTERVAL_SECONDS;
            self.blink_visible = !self.blink_visible;
        }
    }

    fn clip(&self) -> &Frames {
        match self.state {
            PlayerState::Idle => &self.art.idle,
            PlayerState::Run => &self.art.run,
            PlayerState::Climb => &self.art.climb,
            PlayerState::Crouch => &self.art.crouch,
            PlayerState::Attack => &self.art.attack,
        }
    }

    pub(crate) fn sprite(&self) -> Option<&Sprite> {
        self.animator.pick(self.clip())
    }

    /// Draw opacity; blinking never changes collision.
    pub(crate) fn opacity(&self) -> u8 {
        match (self.invulnerable > 0.0, self.blink_visible) {
            (false, _) => 255,
            (true, true) => 128,
            (true, false) => 0,
        }
    }

    pub(crate) fn state(&self) -> PlayerState {
        self.state
    }

    pub(crate) fn hp(&self) -> i32 {
        self.health.hp
    }

    pub(crate) fn max_hp(&self) -> i32 {
        self.health.max_hp
    }

    pub(crate) fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    pub(crate) fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub(crate) fn z_offset(&self) -> f32 {
        self.z_offset
    }

    pub(crate) fn facing(&self) -> Vec2 {
        self.facing
    }

    #[cfg(test)]
    pub(crate) fn set_hp(&mut self, hp: i32) {
        self.health.hp = hp;
    }
}

impl Damageable for Player {
    fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.invulnerable > 0.0 {
            return DamageOutcome::Ignored;
        }
        let outcome = self.health.take(amount);
        self.invulnerable = INVULNERABILITY_SECONDS;
        self.blink_timer = 0.0;
        self.blink_visible = true;
        outcome
    }

    fn is_dead(&self) -> bool {
        self.health.hp <= 0
    }
}
