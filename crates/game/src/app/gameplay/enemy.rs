use iso_engine::{Sprite, Vec2};
use rand::Rng;

use super::ai::{AiContext, FlyerAi, GroundAi, Strike, BANDIT_PARAMS, SKELETON_PARAMS};
use super::art::{Frames, LevelArt};
use super::entity::{Animator, Body, DamageOutcome, Damageable, EntityId, Health};
use super::TILE;

/// Walkers spawn this far below their tile's corner so the foot line lands on the plate.
const FOOT_SHIFT_Y: f32 = (TILE / 2) as f32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EnemyKind {
    Bandit,
    Skeleton,
    Bat,
    Guard,
}

impl EnemyKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            EnemyKind::Bandit => "bandit",
            EnemyKind::Skeleton => "skeleton",
            EnemyKind::Bat => "bat",
            EnemyKind::Guard => "guard",
        }
    }

    fn animation_interval(self) -> f32 {
        match self {
            EnemyKind::Bandit => 0.12,
            EnemyKind::Skeleton | EnemyKind::Guard => 0.15,
            EnemyKind::Bat => 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Brain {
    Ground(GroundAi),
    Flyer(FlyerAi),
    /// Stands still; only animates.
    Sentinel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vitality {
    Health(Health),
    /// No hit points: any blow kills.
    Fragile { dead: bool },
}

#[derive(Debug, Clone)]
pub(crate) struct Enemy {
    pub(crate) id: EntityId,
    pub(crate) kind: EnemyKind,
    pub(crate) body: Body,
    frames: Frames,
    animator: Animator,
    vitality: Vitality,
    brain: Brain,
}

impl Enemy {
    /// Places an enemy for the tile whose top-left corner is `tile`.
    pub(crate) fn spawn<R: Rng + ?Sized>(
        id: EntityId,
        kind: EnemyKind,
        tile: (i32, i32),
        art: &LevelArt,
        rng: &mut R,
    ) -> Self {
        let frames = match kind {
            EnemyKind::Bandit => art.bandit.clone(),
            EnemyKind::Skeleton => art.skeleton.clone(),
            EnemyKind::Bat => art.bat.clone(),
            EnemyKind::Guard => art.guard.clone(),
        };
        let size = frames.first().map(Sprite::size).unwrap_or((1, 1));
        let (x, y) = (tile.0 as f32, tile.1 as f32);
        let (pos, vitality, brain) = match kind {
            EnemyKind::Bandit => (
                Vec2::new(x, y + FOOT_SHIFT_Y),
                Vitality::Health(Health::full(BANDIT_PARAMS.max_hp)),
                Brain::Ground(GroundAi::new(BANDIT_PARAMS, rng)),
            ),
            EnemyKind::Skeleton => (
                Vec2::new(x, y + FOOT_SHIFT_Y),
                Vitality::Health(Health::full(SKELETON_PARAMS.max_hp)),
                Brain::Ground(GroundAi::new(SKELETON_PARAMS, rng)),
            ),
            EnemyKind::Bat => (
                Vec2::new(x - size.0 as f32 / 2.0, y - size.1 as f32 / 2.0),
                Vitality::Fragile { dead: false },
                Brain::Flyer(FlyerAi::new(rng)),
            ),
            EnemyKind::Guard => (
                Vec2::new(x, y),
                Vitality::Fragile { dead: false },
                Brain::Sentinel,
            ),
        };
        Self {
            id,
            kind,
            body: Body::new(pos, size),
            frames,
            animator: Animator::new(kind.animation_interval()),
            vitality,
            brain,
        }
    }

    /// Runs the brain, applies gravity to walkers that lost their footing and advances the
    /// animation. Returns the blow the enemy lands on the player this tick, if any.
    pub(crate) fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        ctx: &AiContext<'_>,
        rng: &mut R,
    ) -> Option<Strike> {
        let strike = match &mut self.brain {
            Brain::Ground(ai) => ai.update(&mut self.body, dt, ctx, rng),
            Brain::Flyer(ai) => ai.update(&mut self.body, dt, ctx, rng),
            Brain::Sentinel => None,
        };
        if !self.is_flying() {
            self.body.apply_fall(dt);
        }
        self.animator.advance(dt, self.frames.len());
        strike
    }

    /// Flyers never consult the floor.
    pub(crate) fn is_flying(&self) -> bool {
        matches!(self.brain, Brain::Flyer(_))
    }

    /// Remaining hit points; `None` for enemies that die to any blow.
    pub(crate) fn hp(&self) -> Option<i32> {
        match self.vitality {
            Vitality::Health(health) => Some(health.hp),
            Vitality::Fragile { .. } => None,
        }
    }

    pub(crate) fn sprite(&self) -> Option<&Sprite> {
        self.animator.pick(&self.frames)
    }
}

impl Damageable for Enemy {
    fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        match &mut self.vitality {
            Vitality::Health(health) => health.take(amount),
            Vitality::Fragile { dead } => {
                *dead = true;
                DamageOutcome::Killed
            }
        }
    }

    fn is_dead(&self) -> bool {
        match self.vitality {
            Vitality::Health(health) => health.hp <= 0,
            Vitality::Fragile { dead } => dead,
        }
    }
}
