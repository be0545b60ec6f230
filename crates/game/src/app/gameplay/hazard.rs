use iso_engine::{Rect, Sprite};

use super::art::Frames;

pub(crate) const SPIKE_DAMAGE: i32 = 30;
pub(crate) const BLADE_DAMAGE: i32 = 20;
pub(crate) const COLLAPSE_DAMAGE: i32 = 15;

const SPIKE_CYCLE_SECONDS: f32 = 3.0;
const SPIKE_PHASE_SECONDS: f32 = 1.0;
/// Closed, opening, open.
const SPIKE_OPEN_PHASE: usize = 2;
const BLADE_FRAMES_PER_SECOND: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum HazardKind {
    SpikeTrap { timer: f32 },
    FloorCollapse { triggered: bool },
    BladeSpinner { spin: f32 },
}

impl HazardKind {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            HazardKind::SpikeTrap { .. } => "spike_trap",
            HazardKind::FloorCollapse { .. } => "floor_collapse",
            HazardKind::BladeSpinner { .. } => "blade_spinner",
        }
    }
}

/// A trap sitting on one floor tile. Hits are tested against the plate under it, never
/// against the trap's own animation frame.
#[derive(Debug, Clone)]
pub(crate) struct Hazard {
    kind: HazardKind,
    tile: (i32, i32),
    frames: Frames,
    frame: usize,
    plate: Sprite,
}

impl Hazard {
    pub(crate) fn spike_trap(tile: (i32, i32), frames: Frames, plate: Sprite) -> Self {
        Self::new(HazardKind::SpikeTrap { timer: 0.0 }, tile, frames, plate)
    }

    pub(crate) fn floor_collapse(tile: (i32, i32), frames: Frames, plate: Sprite) -> Self {
        Self::new(HazardKind::FloorCollapse { triggered: false }, tile, frames, plate)
    }

    pub(crate) fn blade_spinner(tile: (i32, i32), frames: Frames, plate: Sprite) -> Self {
        Self::new(HazardKind::BladeSpinner { spin: 0.0 }, tile, frames, plate)
    }

    fn new(kind: HazardKind, tile: (i32, i32), frames: Frames, plate: Sprite) -> Self {
        Self {
            kind,
            tile,
            frames,
            frame: 0,
            plate,
        }
    }

    pub(crate) fn update(&mut self, dt: f32) {
        match &mut self.kind {
            HazardKind::SpikeTrap { timer } => {
                *timer = (*timer + dt) % SPIKE_CYCLE_SECONDS;
                self.frame = (*timer / SPIKE_PHASE_SECONDS) as usize;
            }
            HazardKind::FloorCollapse { triggered } => {
                self.frame = usize::from(*triggered);
            }
            HazardKind::BladeSpinner { spin } => {
                let frame_count = self.frames.len().max(1) as f32;
                *spin = (*spin + BLADE_FRAMES_PER_SECOND * dt) % frame_count;
                self.frame = *spin as usize;
            }
        }
    }

    pub(crate) fn kind(&self) -> HazardKind {
        self.kind
    }

    /// Spikes only hurt while fully open.
    pub(crate) fn damage_enabled(&self) -> bool {
        match self.kind {
            HazardKind::SpikeTrap { timer } => {
                (timer / SPIKE_PHASE_SECONDS) as usize == SPIKE_OPEN_PHASE
            }
            HazardKind::FloorCollapse { triggered } => !triggered,
            HazardKind::BladeSpinner { .. } => true,
        }
    }

    pub(crate) fn hit_rect(&self) -> Rect {
        Rect::new(self.tile.0, self.tile.1, self.plate.width(), self.plate.height())
    }

    /// World point test against the hit rect and then the plate's pixels.
    pub(crate) fn covers(&self, point: (i32, i32)) -> bool {
        let rect = self.hit_rect();
        rect.contains_point(point.0, point.1)
            && self.plate.mask().get(point.0 - rect.x, point.1 - rect.y)
    }

    /// Damage the trap deals to a foot resting on it right now.
    pub(crate) fn contact_damage(&self) -> Option<i32> {
        let damage = match self.kind {
            HazardKind::SpikeTrap { .. } => SPIKE_DAMAGE,
            HazardKind::FloorCollapse { .. } => COLLAPSE_DAMAGE,
            HazardKind::BladeSpinner { .. } => BLADE_DAMAGE,
        };
        self.damage_enabled().then_some(damage)
    }

    /// Called once the trap's damage has landed. A floor collapse stays collapsed from then on.
    pub(crate) fn spend(&mut self) {
        if let HazardKind::FloorCollapse { triggered } = &mut self.kind {
            *triggered = true;
        }
    }

    pub(crate) fn frame(&self) -> usize {
        self.frame
    }

    pub(crate) fn sprite(&self) -> Option<&Sprite> {
        if self.frames.is_empty() {
            return None;
        }
        self.frames.get(self.frame.min(self.frames.len() - 1))
    }

    pub(crate) fn draw_position(&self) -> (i32, i32) {
        self.tile
    }
}

/// Level exit.
#[derive(Debug, Clone)]
pub(crate) struct Ladder {
    tile: (i32, i32),
    sprite: Sprite,
}

impl Ladder {
    pub(crate) fn new(tile: (i32, i32), sprite: Sprite) -> Self {
        Self { tile, sprite }
    }

    pub(crate) fn rect(&self) -> Rect {
        Rect::new(self.tile.0, self.tile.1, self.sprite.width(), self.sprite.height())
    }

    pub(crate) fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::art::LevelArt;

    fn spike() -> Hazard {
        let art = LevelArt::solid();
        Hazard::spike_trap((0, 0), art.spikes.clone(), art.plates[0].clone())
    }

    #[test]
    fn spikes_hurt_only_in_third_second_of_cycle() {
        let mut trap = spike();
        let mut enabled_at = Vec::new();
        for tick in 1..=24 {
            trap.update(0.25);
            if trap.damage_enabled() {
                enabled_at.push(tick);
            }
        }
        assert_eq!(enabled_at, vec![8, 9, 10, 11, 20, 21, 22, 23]);
    }

    #[test]
    fn spike_frame_tracks_phase() {
        let mut trap = spike();
        trap.update(0.5);
        assert_eq!(trap.frame(), 0);
        trap.update(1.0);
        assert_eq!(trap.frame(), 1);
        trap.update(1.0);
        assert_eq!(trap.frame(), 2);
        assert_eq!(trap.contact_damage(), Some(SPIKE_DAMAGE));
        trap.update(1.0);
        assert_eq!(trap.frame(), 0);
        assert_eq!(trap.contact_damage(), None);
    }

    #[test]
    fn floor_collapse_triggers_once_and_stays_collapsed() {
        let art = LevelArt::solid();
        let mut trap =
            Hazard::floor_collapse((0, 0), art.floor_collapse.clone(), art.plates[0].clone());
        trap.update(0.1);
        assert_eq!(trap.frame(), 0);

        assert_eq!(trap.contact_damage(), Some(COLLAPSE_DAMAGE));
        assert_eq!(trap.contact_damage(), Some(COLLAPSE_DAMAGE), "armed until spent");
        trap.spend();
        assert_eq!(trap.contact_damage(), None);
        for _ in 0..10 {
            trap.update(0.5);
            assert_eq!(trap.frame(), 1);
        }
        assert_eq!(trap.kind(), HazardKind::FloorCollapse { triggered: true });
    }

    #[test]
    fn blade_spins_at_eight_frames_per_second() {
        let art = LevelArt::solid();
        let mut trap =
            Hazard::blade_spinner((0, 0), art.blade_spinner.clone(), art.plates[0].clone());
        trap.update(0.125);
        assert_eq!(trap.frame(), 1);
        trap.update(0.25);
        assert_eq!(trap.frame(), 3);
        trap.update(0.125);
        assert_eq!(trap.frame(), 0);
        assert_eq!(trap.contact_damage(), Some(BLADE_DAMAGE));
    }

    #[test]
    fn covers_uses_plate_pixels_inside_hit_rect() {
        let plate = Sprite::from_fn(4, 4, |x, _| if x < 2 { [9, 9, 9, 255] } else { [0; 4] });
        let trap = Hazard::spike_trap((10, 20), LevelArt::solid().spikes.clone(), plate);
        assert!(trap.covers((11, 21)));
        assert!(!trap.covers((13, 21)));
        assert!(!trap.covers((9, 21)));
        assert!(!trap.covers((11, 24)));
    }

    #[test]
    fn ladder_rect_matches_sprite() {
        let ladder = Ladder::new((5, 6), Sprite::solid(64, 64, [1, 1, 1, 255]));
        assert_eq!(ladder.rect(), Rect::new(5, 6, 64, 64));
    }
}
