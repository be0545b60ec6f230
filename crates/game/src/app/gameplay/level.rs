use iso_engine::{masks_overlap, EdgeScrollCamera, FloorMask, IsoProjection, Rect, Sprite, Vec2};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info};

use super::ai::AiContext;
use super::art::LevelArt;
use super::enemy::{Enemy, EnemyKind};
use super::entity::{DamageOutcome, Damageable, EntityId, EntityIdAllocator};
use super::hazard::{Hazard, Ladder};
use super::player::{Player, PlayerInput};
use super::tilemap::{GridPos, SpawnKind, TileMap};
use super::{TILE, VIEW_HEIGHT, VIEW_WIDTH};
use crate::app::audio::{AudioCue, AudioSink};

const MAP_OFFSET: (f32, f32) = (-260.0, -210.0);
const MAP_TOP: f32 = 100.0;
/// World position of tile (0, 0)'s top-left corner.
pub(crate) const MAP_ORIGIN: Vec2 = Vec2::new(
    VIEW_WIDTH as f32 / 2.0 + MAP_OFFSET.0,
    MAP_TOP + MAP_OFFSET.1,
);

pub(crate) const CONTACT_DAMAGE: i32 = 10;
pub(crate) const PLAYER_ATTACK_DAMAGE: i32 = 20;
pub(crate) const ENEMY_POINTS: u32 = 100;
/// How far below the bottom of the screen a falling player must drop before the run ends.
const FALL_OUT_MARGIN: f32 = 200.0;
/// Falling enemies are dropped this far below the world.
const ENEMY_DESPAWN_DEPTH: i32 = 200;
const MAX_WORLD_PIXELS: u64 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub(crate) enum LevelError {
    #[error("level {id} has no floor tiles")]
    EmptyFloor { id: String },
    #[error("level {id} floor art has no opaque pixels")]
    InvisibleFloor { id: String },
    #[error("level {id} spans {width}x{height} px, too large for one floor surface")]
    WorldTooLarge { id: String, width: u32, height: u32 },
}

/// Everything a level needs besides its map and art.
#[derive(Debug, Clone)]
pub(crate) struct LevelSetup {
    pub(crate) id: String,
    pub(crate) has_next: bool,
    /// Player health carried over from the previous level.
    pub(crate) carried_hp: Option<i32>,
    pub(crate) seed: u64,
    pub(crate) chase_dead_zone: f32,
}

impl LevelSetup {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            has_next: false,
            carried_hp: None,
            seed: 0,
            chase_dead_zone: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LevelOutcome {
    Lost,
    Cleared { has_next: bool },
}

/// One running level. Owns the floor, the camera and every entity; the player is a
/// singleton beside the enemy, hazard and ladder lists.
#[derive(Debug)]
pub(crate) struct Level {
    id: String,
    has_next: bool,
    projection: IsoProjection,
    bounds: Rect,
    floor: FloorMask,
    floor_sprite: Sprite,
    camera: EdgeScrollCamera,
    player: Player,
    enemies: Vec<Enemy>,
    hazards: Vec<Hazard>,
    ladders: Vec<Ladder>,
    score: u32,
    rng: SmallRng,
    chase_dead_zone: f32,
    outcome: Option<LevelOutcome>,
}

impl Level {
    pub(crate) fn build(
        map: &TileMap,
        art: &LevelArt,
        setup: LevelSetup,
    ) -> Result<Self, LevelError> {
        let projection = IsoProjection::for_tile(TILE, MAP_ORIGIN);
        let placed: Vec<((i32, i32), &Sprite)> = map
            .floor_cells()
            .map(|(pos, _)| (projection.project_px(pos.col, pos.row), plate_at(art, pos)))
            .collect();

        let bounds = placed
            .iter()
            .map(|&((x, y), plate)| Rect::new(x, y, plate.width(), plate.height()))
            .reduce(|acc, rect| acc.union(&rect))
            .ok_or_else(|| LevelError::EmptyFloor {
                id: setup.id.clone(),
            })?;
        if u64::from(bounds.w) * u64::from(bounds.h) > MAX_WORLD_PIXELS {
            return Err(LevelError::WorldTooLarge {
                id: setup.id,
                width: bounds.w,
                height: bounds.h,
            });
        }

        let floor_sprite = Sprite::composite(
            bounds.w,
            bounds.h,
            placed
                .iter()
                .map(|&((x, y), plate)| (plate, (x - bounds.x, y - bounds.y))),
        );
        if floor_sprite.mask().count() == 0 {
            return Err(LevelError::InvisibleFloor { id: setup.id });
        }
        let floor = FloorMask::new(bounds, floor_sprite.mask().clone());

        let mut rng = SmallRng::seed_from_u64(setup.seed);
        let mut ids = EntityIdAllocator::default();
        let start = map.player();
        let (px, py) = projection.project_px(start.col, start.row);
        let mut player = Player::spawn(Vec2::new(px as f32, py as f32), art.player.clone());
        if let Some(hp) = setup.carried_hp {
            player = player.with_hp(hp);
        }

        let mut enemies = Vec::new();
        let mut hazards = Vec::new();
        let mut ladders = Vec::new();
        for (pos, kind) in map.spawns() {
            let tile = projection.project_px(pos.col, pos.row);
            let plate = plate_at(art, pos).clone();
            let mut enemy =
                |enemy_kind| Enemy::spawn(ids.allocate(), enemy_kind, tile, art, &mut rng);
            match kind {
                SpawnKind::Player => {}
                SpawnKind::Guard => enemies.push(enemy(EnemyKind::Guard)),
                SpawnKind::Bat => enemies.push(enemy(EnemyKind::Bat)),
                SpawnKind::Skeleton => enemies.push(enemy(EnemyKind::Skeleton)),
                SpawnKind::Bandit => enemies.push(enemy(EnemyKind::Bandit)),
                SpawnKind::Ladder => ladders.push(Ladder::new(tile, art.ladder.clone())),
                SpawnKind::SpikeTrap => {
                    hazards.push(Hazard::spike_trap(tile, art.spikes.clone(), plate));
                }
                SpawnKind::FloorCollapse => {
                    hazards.push(Hazard::floor_collapse(tile, art.floor_collapse.clone(), plate));
                }
                SpawnKind::BladeSpinner => {
                    hazards.push(Hazard::blade_spinner(tile, art.blade_spinner.clone(), plate));
                }
            }
        }

        info!(
            level = %setup.id,
            rows = map.row_count(),
            enemies = enemies.len(),
            hazards = hazards.len(),
            ladders = ladders.len(),
            world_width = bounds.w,
            world_height = bounds.h,
            hp = player.hp(),
            "level_built"
        );

        let mut camera = EdgeScrollCamera::new(VIEW_WIDTH, VIEW_HEIGHT);
        camera.reset();
        Ok(Self {
            id: setup.id,
            has_next: setup.has_next,
            projection,
            bounds,
            floor,
            floor_sprite,
            camera,
            player,
            enemies,
            hazards,
            ladders,
            score: 0,
            rng,
            chase_dead_zone: setup.chase_dead_zone,
            outcome: None,
        })
    }

    /// Advances the level by one fixed tick. Returns the outcome on the tick the level
    /// ends; once ended, further calls do nothing.
    pub(crate) fn step(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        audio: &mut dyn AudioSink,
    ) -> Option<LevelOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        let outcome = self.advance(dt, input, audio)?;
        self.outcome = Some(outcome);
        match outcome {
            LevelOutcome::Lost => {
                info!(level = %self.id, score = self.score, hp = self.player.hp(), "level_lost");
            }
            LevelOutcome::Cleared { has_next } => {
                info!(level = %self.id, score = self.score, has_next, "level_cleared");
            }
        }
        Some(outcome)
    }

    fn advance(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        audio: &mut dyn AudioSink,
    ) -> Option<LevelOutcome> {
        if self.update_entities(dt, input, audio) {
            return Some(LevelOutcome::Lost);
        }
        self.resolve_footing();
        if self.player_fell_out() {
            return Some(LevelOutcome::Lost);
        }
        if self.resolve_hazards(audio) {
            return Some(LevelOutcome::Lost);
        }
        if self.resolve_enemy_contact(audio) {
            return Some(LevelOutcome::Lost);
        }
        self.resolve_player_attack(audio);
        if self.touches_ladder() {
            return Some(LevelOutcome::Cleared {
                has_next: self.has_next,
            });
        }
        self.camera.follow(self.player.body.center(), self.bounds);
        None
    }

    /// Self-contained behaviour of every entity. Melee blows landed by enemies are applied
    /// after all of them have moved; true when one of them kills the player.
    fn update_entities(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        audio: &mut dyn AudioSink,
    ) -> bool {
        self.player.update(dt, input, &self.projection, audio);
        for hazard in &mut self.hazards {
            hazard.update(dt);
        }

        let ctx = AiContext {
            player_center: self.player.body.center(),
            player_rect: self.player.body.rect(),
            floor: &self.floor,
            projection: &self.projection,
            screen: self.camera.viewport_rect(),
            chase_dead_zone: self.chase_dead_zone,
        };
        let mut strikes = Vec::new();
        for enemy in &mut self.enemies {
            if let Some(strike) = enemy.update(dt, &ctx, &mut self.rng) {
                strikes.push((enemy.kind, strike));
            }
        }

        strikes
            .into_iter()
            .any(|(kind, strike)| self.damage_player(strike.damage, kind.label(), audio))
    }

    /// Grounded walkers only: jumping, flying and already falling bodies keep their state.
    fn resolve_footing(&mut self) {
        if !self.player.is_jumping() && !self.player.body.falling {
            self.player.body.update_footing(&self.floor);
        }
        for enemy in &mut self.enemies {
            if !enemy.is_flying() && !enemy.body.falling {
                enemy.body.update_footing(&self.floor);
            }
        }

        let despawn_below = self.bounds.bottom() + ENEMY_DESPAWN_DEPTH;
        let level = &self.id;
        self.enemies.retain(|enemy| {
            let gone = enemy.body.falling && enemy.body.rect().top() > despawn_below;
            if gone {
                debug!(level = %level, enemy = enemy.kind.label(), "enemy_fell");
            }
            !gone
        });
    }

    fn player_fell_out(&self) -> bool {
        if !self.player.body.falling {
            return false;
        }
        let screen_top = self.player.body.rect().top() as f32 - self.camera.position().y;
        screen_top > VIEW_HEIGHT as f32 + FALL_OUT_MARGIN
    }

    /// Hazards in map order against the player's foot; stops at the first lethal one.
    fn resolve_hazards(&mut self, audio: &mut dyn AudioSink) -> bool {
        let foot = self.player.body.hazard_point();
        for index in 0..self.hazards.len() {
            let hazard = &mut self.hazards[index];
            if !hazard.covers(foot) {
                continue;
            }
            let source = hazard.kind().label();
            let Some(damage) = hazard.contact_damage() else {
                continue;
            };
            let outcome = self.player.apply_damage(damage);
            if outcome != DamageOutcome::Ignored {
                self.hazards[index].spend();
            }
            if self.report_damage(outcome, damage, source, audio) {
                return true;
            }
        }
        false
    }

    fn resolve_enemy_contact(&mut self, audio: &mut dyn AudioSink) -> bool {
        if self.player.is_invulnerable() {
            return false;
        }
        let Some(player_sprite) = self.player.sprite() else {
            return false;
        };
        let player_rect = self.player.body.rect();
        let touching = self
            .enemies
            .iter()
            .find(|enemy| {
                enemy.sprite().is_some_and(|sprite| {
                    masks_overlap(player_sprite.mask(), player_rect, sprite.mask(), enemy.body.rect())
                })
            })
            .map(|enemy| enemy.kind.label());

        match touching {
            Some(source) => self.damage_player(CONTACT_DAMAGE, source, audio),
            None => false,
        }
    }

    /// Applies the live sword hitbox to every enemy it overlaps, on every tick the hitbox is
    /// live. Hits are decided on a snapshot of ids before anything is removed.
    /// Returns the number of kills.
    pub(crate) fn resolve_player_attack(&mut self, audio: &mut dyn AudioSink) -> usize {
        let Some(hitbox) = self.player.attack_hitbox() else {
            return 0;
        };
        let struck: Vec<EntityId> = self
            .enemies
            .iter()
            .filter(|enemy| hitbox.intersects(&enemy.body.rect()))
            .map(|enemy| enemy.id)
            .collect();

        let mut killed = Vec::new();
        for id in struck {
            let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id == id) else {
                continue;
            };
            match enemy.apply_damage(PLAYER_ATTACK_DAMAGE) {
                DamageOutcome::Killed => killed.push(id),
                DamageOutcome::Wounded => {
                    debug!(enemy = enemy.kind.label(), hp = ?enemy.hp(), "enemy_hit");
                }
                DamageOutcome::Ignored => {}
            }
        }
        if killed.is_empty() {
            return 0;
        }

        let level = &self.id;
        self.enemies.retain(|enemy| {
            let dead = killed.contains(&enemy.id);
            if dead {
                info!(level = %level, enemy = enemy.kind.label(), points = ENEMY_POINTS, "enemy_killed");
            }
            !dead
        });
        for _ in &killed {
            audio.play(AudioCue::EnemyKilled);
        }
        self.score += ENEMY_POINTS * killed.len() as u32;
        killed.len()
    }

    fn touches_ladder(&self) -> bool {
        let Some(sprite) = self.player.sprite() else {
            return false;
        };
        let rect = self.player.body.rect();
        self.ladders
            .iter()
            .any(|ladder| masks_overlap(sprite.mask(), rect, ladder.sprite().mask(), ladder.rect()))
    }

    /// Routes all damage to the player. True when the blow was lethal.
    fn damage_player(
        &mut self,
        amount: i32,
        source: &'static str,
        audio: &mut dyn AudioSink,
    ) -> bool {
        let outcome = self.player.apply_damage(amount);
        self.report_damage(outcome, amount, source, audio)
    }

    fn report_damage(
        &self,
        outcome: DamageOutcome,
        amount: i32,
        source: &'static str,
        audio: &mut dyn AudioSink,
    ) -> bool {
        match outcome {
            DamageOutcome::Ignored => false,
            DamageOutcome::Wounded => {
                audio.play(AudioCue::PlayerHurt);
                info!(source, damage = amount, hp = self.player.hp(), "player_damaged");
                false
            }
            DamageOutcome::Killed => {
                audio.play(AudioCue::PlayerHurt);
                info!(source, damage = amount, hp = self.player.hp(), "player_killed");
                true
            }
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    pub(crate) fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub(crate) fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub(crate) fn ladders(&self) -> &[Ladder] {
        &self.ladders
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    pub(crate) fn floor_sprite(&self) -> &Sprite {
        &self.floor_sprite
    }

    pub(crate) fn camera(&self) -> &EdgeScrollCamera {
        &self.camera
    }

    pub(crate) fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    #[cfg(test)]
    pub(crate) fn enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }

    #[cfg(test)]
    pub(crate) fn floor(&self) -> &FloorMask {
        &self.floor
    }
}

/// Plates alternate in a checkerboard.
fn plate_at(art: &LevelArt, pos: GridPos) -> &Sprite {
    &art.plates[(pos.col + pos.row) % 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::audio::RecordingAudio;
    use crate::app::gameplay::hazard::COLLAPSE_DAMAGE;
    use crate::app::gameplay::player::PlayerState;

    const DT: f32 = 1.0 / 60.0;

    fn build(source: &str, setup: LevelSetup) -> Level {
        let map = TileMap::parse(source).expect("valid map");
        Level::build(&map, &LevelArt::solid(), setup).expect("level builds")
    }

    fn idle() -> PlayerInput {
        PlayerInput::default()
    }

    #[test]
    fn bounds_enclose_every_plate() {
        let level = build("P.\n..", LevelSetup::new("level1"));
        assert_eq!(level.bounds(), Rect::new(178, -110, 212, 170));
        assert_eq!(level.floor_sprite().size(), (212, 170));
        assert_eq!(level.camera().position(), Vec2::ZERO);

        let (fx, fy) = level.player().body.foot_point();
        assert!(level.floor().is_floor(fx, fy));
        assert!(!level.floor().is_floor(level.bounds().right() + 5, fy));
    }

    #[test]
    fn markers_spawn_one_entity_each() {
        let level = build("PBSbG^XOL", LevelSetup::new("level1"));
        assert_eq!(level.enemies().len(), 4);
        assert_eq!(level.hazards().len(), 3);
        assert_eq!(level.ladders().len(), 1);
        assert_eq!(level.player().hp(), 100);
    }

    #[test]
    fn fully_transparent_floor_is_rejected() {
        let map = TileMap::parse("P").expect("valid map");
        let mut art = LevelArt::solid();
        let clear = Sprite::solid(TILE, TILE, [0, 0, 0, 0]);
        art.plates = [clear.clone(), clear];
        let error = Level::build(&map, &art, LevelSetup::new("level1")).expect_err("no floor");
        assert!(matches!(error, LevelError::InvisibleFloor { .. }));
    }

    #[test]
    fn carried_hp_is_applied() {
        let setup = LevelSetup {
            carried_hp: Some(35),
            ..LevelSetup::new("level2")
        };
        assert_eq!(build("P", setup).player().hp(), 35);
    }

    #[test]
    fn ladder_with_next_level_clears_forward() {
        let setup = LevelSetup {
            has_next: true,
            ..LevelSetup::new("level1")
        };
        let mut level = build("PL", setup);
        let mut audio = RecordingAudio::default();

        assert_eq!(
            level.step(DT, &idle(), &mut audio),
            Some(LevelOutcome::Cleared { has_next: true })
        );
        assert_eq!(level.step(DT, &idle(), &mut audio), None);
        assert_eq!(level.outcome(), Some(LevelOutcome::Cleared { has_next: true }));
    }

    #[test]
    fn ladder_on_last_level_wins() {
        let mut level = build("PL", LevelSetup::new("level9"));
        let mut audio = RecordingAudio::default();
        assert_eq!(
            level.step(DT, &idle(), &mut audio),
            Some(LevelOutcome::Cleared { has_next: false })
        );
    }

    #[test]
    fn lethal_hazard_ends_the_tick_once() {
        let setup = LevelSetup {
            carried_hp: Some(10),
            ..LevelSetup::new("level1")
        };
        let mut level = build("P^O", setup);
        let spike_tile = level.hazards()[0].hit_rect();
        level.player_mut().body.pos = Vec2::new(spike_tile.x as f32, spike_tile.y as f32);
        let mut audio = RecordingAudio::default();

        // One long tick lands the spike cycle in its open phase.
        assert_eq!(level.step(2.5, &idle(), &mut audio), Some(LevelOutcome::Lost));
        assert_eq!(level.player().hp(), -20);
        assert_eq!(audio.count(AudioCue::PlayerHurt), 1);

        assert_eq!(level.step(DT, &idle(), &mut audio), None);
        assert_eq!(level.player().hp(), -20);
    }

    #[test]
    fn floor_collapse_stays_armed_while_the_player_is_invulnerable() {
        let mut level = build("PX", LevelSetup::new("level1"));
        let trap_tile = level.hazards()[0].hit_rect();
        level.player_mut().body.pos = Vec2::new(trap_tile.x as f32, trap_tile.y as f32);
        let mut audio = RecordingAudio::default();

        assert_eq!(level.player_mut().apply_damage(1), DamageOutcome::Wounded);
        assert!(level.player().is_invulnerable());
        assert!(!level.resolve_hazards(&mut audio));
        assert_eq!(level.player().hp(), 99);
        assert_eq!(level.hazards()[0].contact_damage(), Some(COLLAPSE_DAMAGE));

        level.player.update(2.0, &idle(), &level.projection, &mut audio);
        assert!(!level.player().is_invulnerable());
        assert!(!level.resolve_hazards(&mut audio));
        assert_eq!(level.player().hp(), 99 - COLLAPSE_DAMAGE);
        assert_eq!(level.hazards()[0].contact_damage(), None);
    }

    #[test]
    fn closed_spikes_do_no_harm() {
        let mut level = build("P^", LevelSetup::new("level1"));
        let spike_tile = level.hazards()[0].hit_rect();
        level.player_mut().body.pos = Vec2::new(spike_tile.x as f32, spike_tile.y as f32);
        let mut audio = RecordingAudio::default();
        for _ in 0..60 {
            assert_eq!(level.step(DT, &idle(), &mut audio), None);
        }
        assert_eq!(level.player().hp(), 100);
    }

    #[test]
    fn live_hitbox_hurts_every_tick_and_one_swing_kills_a_skeleton() {
        let mut level = build("PS", LevelSetup::new("level1"));
        let skeleton = level.enemies()[0].body.pos;
        level.player_mut().body.pos = Vec2::new(skeleton.x - 32.0, skeleton.y);
        let mut audio = RecordingAudio::default();

        level.player_mut().start_attack();
        assert_eq!(level.player().state(), PlayerState::Attack);
        assert_eq!(level.resolve_player_attack(&mut audio), 0);
        assert_eq!(level.enemies()[0].hp(), Some(20));
        assert_eq!(level.resolve_player_attack(&mut audio), 1);
        assert!(level.enemies().is_empty());
        assert_eq!(level.score(), ENEMY_POINTS);
        assert_eq!(audio.count(AudioCue::EnemyKilled), 1);
    }

    #[test]
    fn spent_hitbox_window_does_no_damage() {
        let mut level = build("PS", LevelSetup::new("level1"));
        let skeleton = level.enemies()[0].body.pos;
        level.player_mut().body.pos = Vec2::new(skeleton.x - 32.0, skeleton.y);
        let mut audio = RecordingAudio::default();

        level.player_mut().start_attack();
        assert_eq!(level.resolve_player_attack(&mut audio), 0);
        level
            .player
            .update(0.2, &idle(), &level.projection, &mut audio);
        assert!(level.player().attack_hitbox().is_none());
        assert_eq!(level.resolve_player_attack(&mut audio), 0);
        assert_eq!(level.enemies()[0].hp(), Some(20));
    }

    #[test]
    fn enemy_contact_hurts_once_per_invulnerability_window() {
        let mut level = build("PG", LevelSetup::new("level1"));
        let mut audio = RecordingAudio::default();

        assert_eq!(level.step(DT, &idle(), &mut audio), None);
        assert_eq!(level.player().hp(), 100 - CONTACT_DAMAGE);
        for _ in 0..30 {
            level.step(DT, &idle(), &mut audio);
        }
        assert_eq!(level.player().hp(), 100 - CONTACT_DAMAGE);
    }

    #[test]
    fn player_far_below_world_loses() {
        let mut level = build("P", LevelSetup::new("level1"));
        level.player_mut().body.pos = Vec2::new(2000.0, 2000.0);
        let mut audio = RecordingAudio::default();
        assert_eq!(level.step(DT, &idle(), &mut audio), Some(LevelOutcome::Lost));
        assert!(level.player().body.falling);
    }

    #[test]
    fn stepping_off_the_floor_starts_a_fall() {
        let mut level = build("P", LevelSetup::new("level1"));
        let right = level.bounds().right() as f32;
        level.player_mut().body.pos.x = right + 10.0;
        let mut audio = RecordingAudio::default();

        assert_eq!(level.step(DT, &idle(), &mut audio), None);
        assert!(level.player().body.falling);
        let y = level.player().body.pos.y;
        level.step(DT, &idle(), &mut audio);
        assert!(level.player().body.pos.y > y);
    }

    #[test]
    fn fallen_enemies_are_removed_without_score() {
        let mut level = build("P.\n.B", LevelSetup::new("level1"));
        level.enemies_mut()[0].body.pos = Vec2::new(3000.0, 3000.0);
        let mut audio = RecordingAudio::default();

        level.step(DT, &idle(), &mut audio);
        assert!(level.enemies().is_empty());
        assert_eq!(level.score(), 0);
    }

    #[test]
    fn same_seed_gives_same_patrols() {
        let source = "P.........\n..........\n.....B....\n..........\n.........S";
        let setup = LevelSetup {
            seed: 42,
            ..LevelSetup::new("level1")
        };
        let mut first = build(source, setup.clone());
        let mut second = build(source, setup);
        let mut audio = RecordingAudio::default();
        for _ in 0..120 {
            first.step(DT, &idle(), &mut audio);
            second.step(DT, &idle(), &mut audio);
        }
        let positions = |level: &Level| -> Vec<Vec2> {
            level.enemies().iter().map(|enemy| enemy.body.pos).collect()
        };
        assert_eq!(positions(&first), positions(&second));
    }
}
