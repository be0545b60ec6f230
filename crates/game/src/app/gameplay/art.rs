use std::sync::Arc;

use iso_engine::assets::animation_frame_path;
use iso_engine::{AssetError, AssetSource, Sprite};
use tracing::info;

use super::TILE;

pub(crate) type Frames = Arc<[Sprite]>;

const PLATE_PATHS: [&str; 2] = ["iso_block/iso_plate_1.png", "iso_block/iso_plate_2.png"];
const LADDER_PATH: &str = "iso_lader/iso_lader.png";

const HERO_IDLE: (&str, usize) = ("iso_prince_hero", 3);
const HERO_RUN: (&str, usize) = ("iso_prince_hero_run", 3);
const HERO_CLIMB: (&str, usize) = ("iso_prince_hero_climb", 1);
const HERO_CROUCH: (&str, usize) = ("iso_prince_crouch", 1);
const HERO_ATTACK: (&str, usize) = ("iso_prince_hero_attack", 1);
const BANDIT: (&str, usize) = ("iso_bandit", 4);
const SKELETON: (&str, usize) = ("iso_skeleton_contrast", 2);
const BAT: (&str, usize) = ("iso_bat_contrast", 4);
const SPIKES: (&str, usize) = ("iso_spikes", 3);
const FLOOR_COLLAPSE: (&str, usize) = ("iso_floor_collapse", 2);
const BLADE_SPINNER: (&str, usize) = ("iso_blade_spinner", 4);

/// Source art is authored at tile resolution; actors and ladders draw at half size.
const ACTOR_SCALE: f32 = 0.5;

#[derive(Debug, Clone)]
pub(crate) struct PlayerArt {
    pub(crate) idle: Frames,
    pub(crate) run: Frames,
    pub(crate) climb: Frames,
    pub(crate) crouch: Frames,
    pub(crate) attack: Frames,
}

/// Every sprite a level needs, loaded and scaled once per session.
#[derive(Debug, Clone)]
pub(crate) struct LevelArt {
    pub(crate) plates: [Sprite; 2],
    pub(crate) player: PlayerArt,
    pub(crate) bandit: Frames,
    pub(crate) skeleton: Frames,
    pub(crate) bat: Frames,
    pub(crate) guard: Frames,
    pub(crate) ladder: Sprite,
    pub(crate) spikes: Frames,
    pub(crate) floor_collapse: Frames,
    pub(crate) blade_spinner: Frames,
}

impl LevelArt {
    pub(crate) fn load(assets: &mut dyn AssetSource) -> Result<Self, AssetError> {
        let plates = [
            assets.load_image(PLATE_PATHS[0])?,
            assets.load_image(PLATE_PATHS[1])?,
        ];
        let player = PlayerArt {
            idle: load_scaled(assets, HERO_IDLE, ACTOR_SCALE)?,
            run: load_scaled(assets, HERO_RUN, ACTOR_SCALE)?,
            climb: load_scaled(assets, HERO_CLIMB, ACTOR_SCALE)?,
            crouch: load_scaled(assets, HERO_CROUCH, ACTOR_SCALE)?,
            attack: load_scaled(assets, HERO_ATTACK, ACTOR_SCALE)?,
        };
        let art = Self {
            plates,
            player,
            bandit: load_scaled(assets, BANDIT, ACTOR_SCALE)?,
            skeleton: load_scaled(assets, SKELETON, ACTOR_SCALE)?,
            bat: load_scaled(assets, BAT, ACTOR_SCALE)?,
            guard: load_scaled(assets, BANDIT, 1.0)?,
            ladder: assets.load_image(LADDER_PATH)?.scaled(ACTOR_SCALE),
            spikes: load_scaled(assets, SPIKES, 1.0)?,
            floor_collapse: load_scaled(assets, FLOOR_COLLAPSE, 1.0)?,
            blade_spinner: load_scaled(assets, BLADE_SPINNER, 1.0)?,
        };
        info!(
            plate_size = ?art.plates[0].size(),
            player_size = ?art.player.idle[0].size(),
            "level_art_loaded"
        );
        Ok(art)
    }

    /// Opaque rectangles: tile-sized plates and hazards, half-tile actors.
    #[cfg(test)]
    pub(crate) fn solid() -> Self {
        let tile = Sprite::solid(TILE, TILE, [90, 80, 70, 255]);
        let actor = Sprite::solid(TILE / 2, TILE / 2, [200, 200, 200, 255]);
        let actor_frames: Frames = vec![actor.clone(), actor.clone()].into();
        let tile_frames: Frames = vec![tile.clone(); 4].into();
        Self {
            plates: [tile.clone(), tile.clone()],
            player: PlayerArt {
                idle: actor_frames.clone(),
                run: actor_frames.clone(),
                climb: actor_frames.clone(),
                crouch: actor_frames.clone(),
                attack: actor_frames.clone(),
            },
            bandit: actor_frames.clone(),
            skeleton: actor_frames.clone(),
            bat: actor_frames.clone(),
            guard: actor_frames,
            ladder: actor,
            spikes: tile_frames.clone(),
            floor_collapse: tile_frames.clone(),
            blade_spinner: tile_frames,
        }
    }
}

fn load_scaled(
    assets: &mut dyn AssetSource,
    (folder, count): (&str, usize),
    scale: f32,
) -> Result<Frames, AssetError> {
    let frames = assets.load_animation(folder, count)?;
    Ok(frames
        .iter()
        .map(|frame| frame.scaled(scale))
        .collect::<Vec<_>>()
        .into())
}

/// Placeholder art drawn in code, standing in when no image directory ships with the game.
/// Answers the same paths the disk layout uses.
#[derive(Debug, Default)]
pub(crate) struct ProceduralArt;

impl AssetSource for ProceduralArt {
    fn load_image(&mut self, path: &str) -> Result<Sprite, AssetError> {
        let missing = || AssetError::Missing { path: path.into() };
        if path == PLATE_PATHS[0] {
            return Ok(plate([92, 78, 66, 255], [60, 50, 42, 255]));
        }
        if path == PLATE_PATHS[1] {
            return Ok(plate([112, 96, 80, 255], [70, 60, 50, 255]));
        }
        if path == LADDER_PATH {
            return Ok(ladder());
        }

        let (folder, frame) = parse_frame_path(path).ok_or_else(missing)?;
        let sprite = match folder {
            f if f == HERO_IDLE.0 || f == HERO_CLIMB.0 || f == HERO_CROUCH.0 => {
                humanoid([60, 110, 220, 255], 0)
            }
            f if f == HERO_RUN.0 => humanoid([60, 110, 220, 255], frame as i32 * 4 - 4),
            f if f == HERO_ATTACK.0 => humanoid_with_blade([60, 110, 220, 255]),
            f if f == BANDIT.0 => humanoid([190, 60, 50, 255], (frame as i32 % 2) * 3),
            f if f == SKELETON.0 => humanoid([225, 225, 210, 255], (frame as i32 % 2) * 3),
            f if f == BAT.0 => bat(frame),
            f if f == SPIKES.0 => spikes(frame),
            f if f == FLOOR_COLLAPSE.0 => collapse(frame),
            f if f == BLADE_SPINNER.0 => blade(frame),
            _ => return Err(missing()),
        };
        Ok(sprite)
    }
}

/// Splits `folder/folder_N.png` into the folder and 1-based `N`.
fn parse_frame_path(path: &str) -> Option<(&str, usize)> {
    let (folder, file) = path.split_once('/')?;
    let stem = file.strip_suffix(".png")?;
    let index = stem.strip_prefix(folder)?.strip_prefix('_')?.parse().ok()?;
    (animation_frame_path(folder, index) == path).then_some((folder, index))
}

const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn in_diamond(x: f32, y: f32, cx: f32, cy: f32, half_w: f32, half_h: f32) -> bool {
    (x - cx).abs() / half_w + (y - cy).abs() / half_h <= 1.0
}

/// Iso block: a diamond top face over side faces that run down to the bottom edge.
fn plate(top: [u8; 4], side: [u8; 4]) -> Sprite {
    let size = TILE as f32;
    let (half_w, half_h) = (size / 2.0, size / 4.0);
    Sprite::from_fn(TILE, TILE, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        if in_diamond(px, py, half_w, half_h, half_w, half_h) {
            top
        } else if py >= half_h {
            side
        } else {
            CLEAR
        }
    })
}

fn humanoid(color: [u8; 4], sway: i32) -> Sprite {
    Sprite::from_fn(TILE, TILE, |x, y| {
        let (x, y) = (x as i32, y as i32);
        let head = (x - 64 - sway / 2).pow(2) + (y - 22).pow(2) <= 14 * 14;
        let torso = (46..82).contains(&(x - sway / 2)) && (36..90).contains(&y);
        let legs = (90..126).contains(&y)
            && ((48 - sway..60 - sway).contains(&x) || (68 + sway..80 + sway).contains(&x));
        if head || torso || legs {
            color
        } else {
            CLEAR
        }
    })
}

fn humanoid_with_blade(color: [u8; 4]) -> Sprite {
    let body = humanoid(color, 0);
    Sprite::from_fn(TILE, TILE, |x, y| {
        if (82..124).contains(&x) && (56..62).contains(&y) {
            [230, 230, 240, 255]
        } else {
            body.pixel(x, y)
        }
    })
}

fn bat(frame: usize) -> Sprite {
    let wing_lift = if frame % 2 == 0 { 0 } else { 18 };
    Sprite::from_fn(TILE, TILE, |x, y| {
        let (x, y) = (x as i32, y as i32);
        let body = (x - 64).pow(2) + (y - 64).pow(2) <= 16 * 16;
        let wing_y = 64 - wing_lift + (x - 64).abs() / 3;
        let wings = (10..118).contains(&x) && (wing_y - 8..wing_y + 8).contains(&y);
        if body || wings {
            [120, 60, 150, 255]
        } else {
            CLEAR
        }
    })
}

fn ladder() -> Sprite {
    Sprite::from_fn(TILE, TILE, |x, y| {
        let rail = (30..40).contains(&x) || (88..98).contains(&x);
        let rung = (40..88).contains(&x) && y % 24 < 6;
        if rail || rung {
            [150, 100, 50, 255]
        } else {
            CLEAR
        }
    })
}

fn spikes(frame: usize) -> Sprite {
    let height = match frame {
        1 => 0,
        2 => 14,
        _ => 34,
    };
    Sprite::from_fn(TILE, TILE, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        let on_top = in_diamond(px, py, 64.0, 32.0, 52.0, 26.0);
        if !on_top {
            return CLEAR;
        }
        let spike = height > 0 && x % 16 < 4 && (32 - height..32).contains(&(y as i32));
        if spike {
            [210, 210, 220, 255]
        } else {
            [70, 70, 80, 255]
        }
    })
}

fn collapse(frame: usize) -> Sprite {
    let collapsed = frame >= 2;
    Sprite::from_fn(TILE, TILE, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        if !in_diamond(px, py, 64.0, 32.0, 60.0, 30.0) {
            return CLEAR;
        }
        let crack = (x as i32 - y as i32 * 2).rem_euclid(23) < 2;
        match (collapsed, crack) {
            (true, _) => [30, 20, 15, 255],
            (false, true) => [50, 40, 30, 255],
            (false, false) => [120, 100, 80, 255],
        }
    })
}

fn blade(frame: usize) -> Sprite {
    let angle = (frame.saturating_sub(1) as f32) * std::f32::consts::FRAC_PI_4;
    let (sin, cos) = angle.sin_cos();
    Sprite::from_fn(TILE, TILE, |x, y| {
        let dx = x as f32 + 0.5 - 64.0;
        let dy = (y as f32 + 0.5 - 32.0) * 2.0;
        let along = dx * cos + dy * sin;
        let across = -dx * sin + dy * cos;
        if along.abs() <= 46.0 && across.abs() <= 5.0 {
            [200, 205, 215, 255]
        } else {
            CLEAR
        }
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use image::{Rgba, RgbaImage};
    use iso_engine::DiskAssets;

    use super::*;

    fn write_png(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        RgbaImage::from_pixel(8, 8, Rgba([120, 90, 60, 255]))
            .save(path)
            .expect("save png");
    }

    #[test]
    fn frame_paths_round_trip_through_parser() {
        assert_eq!(
            parse_frame_path("iso_bandit/iso_bandit_3.png"),
            Some(("iso_bandit", 3))
        );
        assert_eq!(parse_frame_path("iso_bandit/other_3.png"), None);
        assert_eq!(parse_frame_path("iso_bandit.png"), None);
    }

    #[test]
    fn procedural_source_loads_full_level_art() {
        let art = LevelArt::load(&mut ProceduralArt).expect("procedural art");
        assert_eq!(art.plates[0].size(), (TILE, TILE));
        assert_eq!(art.player.idle.len(), 3);
        assert_eq!(art.player.idle[0].size(), (TILE / 2, TILE / 2));
        assert_eq!(art.guard[0].size(), (TILE, TILE));
        assert_eq!(art.ladder.size(), (TILE / 2, TILE / 2));
        assert_eq!(art.spikes.len(), 3);
        assert_eq!(art.blade_spinner.len(), 4);
    }

    #[test]
    fn disk_layout_loads_every_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        for file in [
            "iso_block/iso_plate_1.png",
            "iso_block/iso_plate_2.png",
            "iso_lader/iso_lader.png",
        ] {
            write_png(&dir.path().join(file));
        }
        for (folder, count) in [
            ("iso_prince_hero", 3),
            ("iso_prince_hero_run", 3),
            ("iso_prince_hero_climb", 1),
            ("iso_prince_crouch", 1),
            ("iso_prince_hero_attack", 1),
            ("iso_bandit", 4),
            ("iso_skeleton_contrast", 2),
            ("iso_bat_contrast", 4),
            ("iso_spikes", 3),
            ("iso_floor_collapse", 2),
            ("iso_blade_spinner", 4),
        ] {
            for index in 1..=count {
                write_png(&dir.path().join(animation_frame_path(folder, index)));
            }
        }

        let art = LevelArt::load(&mut DiskAssets::new(dir.path())).expect("disk art");
        assert_eq!(art.player.climb.len(), 1);
        assert_eq!(art.player.climb[0].size(), (4, 4));
        assert_eq!(art.plates[1].size(), (8, 8));
        assert_eq!(art.floor_collapse.len(), 2);
    }

    #[test]
    fn unknown_paths_are_missing() {
        let error = ProceduralArt.load_image("iso_dragon/iso_dragon_1.png");
        assert!(matches!(error, Err(AssetError::Missing { .. })));
    }

    #[test]
    fn plate_covers_actor_foot_samples() {
        let plate = plate([1, 1, 1, 255], [2, 2, 2, 255]);
        let mask = plate.mask();
        // Player foot at the tile corner, walker foot line a half tile lower.
        assert!(mask.get(32, 63));
        assert!(mask.get(16, 126));
        assert!(mask.get(32, 126));
        assert!(mask.get(48, 126));
        assert!(!mask.get(0, 0));
        assert!(!mask.get(127, 0));
        assert!(!mask.get(4, 20));
    }
}
