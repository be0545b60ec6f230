use iso_engine::{Canvas, Rect, Sprite};

use super::gameplay::level::Level;

const BACKGROUND: [u8; 4] = [30, 10, 0, 255];
const HP_BAR: Rect = Rect::new(16, 16, 200, 14);
const HP_BAR_BACK: [u8; 4] = [40, 40, 40, 255];
const HP_BAR_FILL: [u8; 4] = [200, 30, 30, 255];
const BANNER: Rect = Rect::new(240, 220, 480, 100);
const TITLE_BANNER: [u8; 4] = [90, 70, 30, 255];
const WON_BANNER: [u8; 4] = [40, 140, 60, 255];
const LOST_BANNER: [u8; 4] = [140, 30, 30, 255];

struct Actor<'a> {
    sprite: &'a Sprite,
    rect: Rect,
    lift: i32,
    opacity: u8,
}

/// Draw order: falling actors, floor, hazards, standing actors by foot line, ladders, hp bar.
pub(crate) fn draw_level(level: &Level, canvas: &mut Canvas<'_>) {
    canvas.clear(BACKGROUND);
    let camera = level.camera().position();
    let (ox, oy) = (-(camera.x as i32), -(camera.y as i32));

    let mut falling = Vec::new();
    let mut standing = Vec::new();
    let player = level.player();
    if let Some(sprite) = player.sprite() {
        let actor = Actor {
            sprite,
            rect: player.body.rect(),
            lift: player.z_offset() as i32,
            opacity: player.opacity(),
        };
        if player.body.falling {
            falling.push(actor);
        } else {
            standing.push(actor);
        }
    }
    for enemy in level.enemies() {
        let Some(sprite) = enemy.sprite() else {
            continue;
        };
        let actor = Actor {
            sprite,
            rect: enemy.body.rect(),
            lift: 0,
            opacity: 255,
        };
        if enemy.body.falling {
            falling.push(actor);
        } else {
            standing.push(actor);
        }
    }
    falling.sort_by_key(|actor| actor.rect.bottom());
    standing.sort_by_key(|actor| actor.rect.bottom());

    for actor in &falling {
        draw_actor(canvas, actor, ox, oy);
    }

    let bounds = level.bounds();
    canvas.blit(level.floor_sprite(), bounds.x + ox, bounds.y + oy, 255);

    for hazard in level.hazards() {
        if let Some(sprite) = hazard.sprite() {
            let (x, y) = hazard.draw_position();
            canvas.blit(sprite, x + ox, y + oy, 255);
        }
    }

    for actor in &standing {
        draw_actor(canvas, actor, ox, oy);
    }

    for ladder in level.ladders() {
        let rect = ladder.rect();
        canvas.blit(ladder.sprite(), rect.x + ox, rect.y + oy, 255);
    }

    draw_hp_bar(canvas, level.player().hp(), level.player().max_hp());
}

pub(crate) fn draw_title(canvas: &mut Canvas<'_>) {
    canvas.clear(BACKGROUND);
    canvas.fill_rect(BANNER, TITLE_BANNER);
}

pub(crate) fn draw_game_over(canvas: &mut Canvas<'_>, won: bool) {
    canvas.clear([0, 0, 0, 255]);
    canvas.fill_rect(BANNER, if won { WON_BANNER } else { LOST_BANNER });
}

fn draw_actor(canvas: &mut Canvas<'_>, actor: &Actor<'_>, ox: i32, oy: i32) {
    canvas.blit(
        actor.sprite,
        actor.rect.x + ox,
        actor.rect.y + oy + actor.lift,
        actor.opacity,
    );
}

fn draw_hp_bar(canvas: &mut Canvas<'_>, hp: i32, max_hp: i32) {
    canvas.fill_rect(HP_BAR, HP_BAR_BACK);
    let filled = hp_fill_width(hp, max_hp, HP_BAR.w);
    if filled > 0 {
        canvas.fill_rect(Rect::new(HP_BAR.x, HP_BAR.y, filled, HP_BAR.h), HP_BAR_FILL);
    }
}

fn hp_fill_width(hp: i32, max_hp: i32, width: u32) -> u32 {
    if max_hp <= 0 {
        return 0;
    }
    let ratio = hp.clamp(0, max_hp) as f32 / max_hp as f32;
    (ratio * width as f32).round() as u32
}
