//! Frame renderer.
//!
//! Paints one frame from explicit inputs: store, camera, minimap, clock,
//! local player id. Layers go down in a fixed order, each finished before
//! the next starts:
//!
//! background → world border → weather → walls → trails → gifts → hazards
//! → projectiles → monster projectiles → monsters → decorations → hill ring
//! → light marker → light aura → players → (screen space) minimap.
//!
//! Sprites come from the [`AssetCache`]; anything not loaded yet is drawn
//! with primitives and reported back so the host can fetch it.

use std::collections::BTreeSet;

use frost_shared::{
    color::{team_color, PlayerColor, Rgba},
    math::{Rect, Vec2, Viewport},
    net::{DecorationKind, GiftKind, HazardKind, MonsterKind},
    render::{Canvas, SpriteKey},
    round::{RoundFeatures, RoundType},
};

use crate::{
    anim::{self, Direction8},
    assets::AssetCache,
    camera::CameraTransform,
    minimap::{self, MinimapTransform},
    store::{EntityStore, PlayerView, WorldState},
};

const PLAYER_RADIUS: f64 = 14.0;
const PLAYER_SPRITE: f64 = 32.0;
const GIFT_SIZE: f64 = 24.0;
const PROJECTILE_RADIUS: f64 = 6.0;
const FIREBALL_RADIUS: f64 = 7.0;
const LIGHT_RADIUS: f64 = 12.0;
const RING_BASE: f64 = 18.0;
const RING_STEP: f64 = 3.5;
const BORDER_WIDTH: f64 = 6.0;

const BORDER: Rgba = Rgba::rgb(60, 84, 120);
const WALL_EDGE: Rgba = Rgba::rgb(140, 148, 164);
const SHADOW: Rgba = Rgba::rgba(0, 0, 0, 50);
const OUTLINE: Rgba = Rgba::rgba(20, 24, 32, 220);
const TRUNK: Rgba = Rgba::rgb(110, 76, 48);
const PINE: Rgba = Rgba::rgb(38, 110, 64);
const FIRE: Rgba = Rgba::rgb(255, 120, 32);
const FIRE_CORE: Rgba = Rgba::rgb(255, 226, 120);
const HP_BACK: Rgba = Rgba::rgba(0, 0, 0, 140);
const HP_FILL: Rgba = Rgba::rgb(120, 220, 90);

/// Inputs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub store: &'a EntityStore,
    pub camera: CameraTransform,
    pub minimap: Option<MinimapTransform>,
    /// Monotonic local clock, seconds.
    pub clock: f64,
    pub local_player: Option<&'a str>,
    pub viewport: Viewport,
    /// Feature set of the current round.
    pub features: RoundFeatures,
    pub weather_particles: usize,
}

/// What a frame ended up drawing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameReport {
    /// Entities painted in world space.
    pub entities: usize,
    /// Sprites blitted from the cache.
    pub sprites: usize,
    /// Sprites that were missing and drawn as primitives.
    pub fallbacks: BTreeSet<SpriteKey>,
}

/// Paints one complete frame. Never fails; an empty store still yields a
/// background and border.
pub fn render<C: Canvas + ?Sized>(
    canvas: &mut C,
    frame: &Frame<'_>,
    assets: &AssetCache,
) -> FrameReport {
    let mut painter = Painter {
        canvas,
        assets,
        t: frame.clock,
        report: FrameReport::default(),
    };
    painter.paint(frame);
    painter.report
}

struct Painter<'c, 'a, C: Canvas + ?Sized> {
    canvas: &'c mut C,
    assets: &'a AssetCache,
    t: f64,
    report: FrameReport,
}

fn floor_color(round_type: RoundType) -> Rgba {
    match round_type {
        RoundType::Ice => Rgba::ICE,
        RoundType::Maze => Rgba::rgb(204, 212, 226),
        _ => Rgba::SNOW,
    }
}

impl<C: Canvas + ?Sized> Painter<'_, '_, C> {
    fn paint(&mut self, frame: &Frame<'_>) {
        let vp = frame.viewport;
        self.canvas.begin_frame(vp.width, vp.height);
        self.canvas
            .fill_rect(Rect::new(0.0, 0.0, vp.width, vp.height), Rgba::NIGHT);

        let store = frame.store;
        let round_type = store.round_context().round_type;
        let extent = store.extent();
        let cam = frame.camera;

        self.canvas.save();
        self.canvas.translate(cam.offset_x, cam.offset_y);
        self.canvas.scale(cam.scale, cam.scale);

        let world_rect = Rect::new(0.0, 0.0, extent.x, extent.y);
        self.canvas.fill_rect(world_rect, floor_color(round_type));
        self.canvas.stroke_rect(world_rect, BORDER, BORDER_WIDTH);

        if frame.features.contains(RoundFeatures::WEATHER) {
            self.weather(cam.visible_world_rect(vp), frame.weather_particles);
        }

        if let Some(world) = store.world() {
            self.walls(world);
            self.trails(world);
            self.gifts(world);
            self.hazards(world);
            self.projectiles(world);
            self.monster_projectiles(world);
            self.monsters(world);
            self.decorations(world);
            if frame.features.contains(RoundFeatures::HILL_ZONE) {
                self.hill(store, world);
            }
            self.light_marker(world);
            if frame.features.contains(RoundFeatures::LIGHT_AURA) {
                self.light_aura(store, world);
            }
            self.players(store, frame);
        }

        self.canvas.restore();

        if let Some(map) = &frame.minimap {
            let view = cam.visible_world_rect(vp);
            minimap::paint(&mut *self.canvas, store, map, Some(view), frame.local_player);
        }

        self.canvas.end_frame();
    }

    /// Blits `key` into `dest` if loaded, otherwise runs `fallback`.
    fn sprite_or(&mut self, key: SpriteKey, dest: Rect, fallback: impl FnOnce(&mut C)) {
        if self.assets.is_ready(key) {
            self.canvas.sprite(key, dest);
            self.report.sprites += 1;
        } else {
            self.report.fallbacks.insert(key);
            fallback(&mut *self.canvas);
        }
    }

    fn weather(&mut self, area: Rect, count: usize) {
        let flake = Rgba::WHITE.with_alpha(0.8);
        for i in 0..count {
            let (pos, radius) = anim::snowflake(i, self.t, area);
            self.canvas.fill_circle(pos, radius, flake);
        }
    }

    fn walls(&mut self, world: &WorldState) {
        for wall in &world.walls {
            let r = Rect::new(wall.x, wall.y, wall.w, wall.h);
            self.canvas.fill_rect(r, Rgba::STONE);
            self.canvas.stroke_rect(r, WALL_EDGE, 2.0);
            self.report.entities += 1;
        }
    }

    fn trails(&mut self, world: &WorldState) {
        for trail in &world.trails {
            let color = trail
                .color
                .parse::<PlayerColor>()
                .map(PlayerColor::rgba)
                .unwrap_or(Rgba::STONE);
            let alpha = if trail.alpha.is_finite() { trail.alpha } else { 1.0 };
            self.canvas
                .fill_circle(Vec2::new(trail.x, trail.y), 3.0, color.with_alpha(alpha * 0.45));
            self.report.entities += 1;
        }
    }

    fn gifts(&mut self, world: &WorldState) {
        for gift in &world.gifts {
            let bob = anim::gift_bob(self.t, gift.id, 3.0);
            let center = Vec2::new(gift.x, gift.y + bob);
            self.canvas
                .fill_circle(Vec2::new(gift.x, gift.y + GIFT_SIZE / 2.0), 8.0, SHADOW);
            let kind = gift.kind;
            self.sprite_or(SpriteKey::Gift(kind), Rect::centered(center, GIFT_SIZE), |c| {
                gift_fallback(c, kind, center)
            });
            self.report.entities += 1;
        }
    }

    fn hazards(&mut self, world: &WorldState) {
        for hazard in &world.hazards {
            let center = Vec2::new(hazard.x, hazard.y);
            let radius = hazard.radius();
            match hazard.kind {
                HazardKind::BigSnowball => {
                    self.canvas.fill_circle(
                        Vec2::new(center.x, center.y + radius * 0.6),
                        radius * 0.9,
                        SHADOW,
                    );
                    self.canvas.save();
                    self.canvas.translate(center.x, center.y);
                    self.canvas.rotate(anim::hazard_spin(self.t, hazard.id));
                    self.sprite_or(
                        SpriteKey::BigSnowball,
                        Rect::centered(Vec2::ZERO, radius * 2.0),
                        |c| {
                            c.fill_circle(Vec2::ZERO, radius, Rgba::WHITE);
                            c.stroke_circle(Vec2::ZERO, radius, OUTLINE, 2.0);
                            c.line(
                                Vec2::new(-radius * 0.6, 0.0),
                                Vec2::new(radius * 0.6, 0.0),
                                Rgba::ICE,
                                3.0,
                            );
                        },
                    );
                    self.canvas.restore();
                }
                HazardKind::Snowball | HazardKind::Unknown => {
                    self.canvas.fill_circle(
                        Vec2::new(center.x, center.y + radius),
                        radius * 0.6,
                        SHADOW,
                    );
                    self.sprite_or(
                        SpriteKey::Snowball,
                        Rect::centered(center, radius * 2.0),
                        |c| {
                            c.fill_circle(center, radius, Rgba::WHITE);
                            c.stroke_circle(center, radius, OUTLINE, 1.5);
                        },
                    );
                }
            }
            self.report.entities += 1;
        }
    }

    fn projectiles(&mut self, world: &WorldState) {
        for p in &world.projectiles {
            let center = Vec2::new(p.x, p.y);
            let rim = p
                .color
                .parse::<PlayerColor>()
                .map(PlayerColor::rgba)
                .unwrap_or(OUTLINE);
            self.sprite_or(
                SpriteKey::Snowball,
                Rect::centered(center, PROJECTILE_RADIUS * 2.0),
                |c| {
                    c.fill_circle(center, PROJECTILE_RADIUS, Rgba::WHITE);
                    c.stroke_circle(center, PROJECTILE_RADIUS, rim, 1.5);
                },
            );
            self.report.entities += 1;
        }
    }

    fn monster_projectiles(&mut self, world: &WorldState) {
        for p in &world.monster_projectiles {
            let center = Vec2::new(p.x, p.y);
            self.sprite_or(
                SpriteKey::Fireball,
                Rect::centered(center, FIREBALL_RADIUS * 2.0),
                |c| {
                    c.fill_circle(center, FIREBALL_RADIUS, FIRE);
                    c.fill_circle(center, FIREBALL_RADIUS * 0.5, FIRE_CORE);
                },
            );
            self.report.entities += 1;
        }
    }

    fn monsters(&mut self, world: &WorldState) {
        for m in &world.monsters {
            let pose = anim::monster_pose(self.t, m.id, m.dir_x);
            let radius = m.kind.radius();
            self.canvas
                .fill_circle(Vec2::new(m.x, m.y + radius * 0.8), radius * 0.7, SHADOW);

            self.canvas.save();
            self.canvas.translate(m.x, m.y + pose.bob);
            self.canvas.rotate(pose.wobble);
            if pose.flip {
                self.canvas.scale(-1.0, 1.0);
            }
            let kind = m.kind;
            self.sprite_or(
                SpriteKey::Monster(kind),
                Rect::centered(Vec2::ZERO, radius * 2.2),
                |c| monster_fallback(c, kind, radius),
            );
            self.canvas.restore();

            if m.max_hp > 1.0 && m.hp < m.max_hp {
                let frac = (m.hp / m.max_hp).clamp(0.0, 1.0);
                let bar = Rect::new(m.x - radius, m.y - radius - 8.0, radius * 2.0, 4.0);
                self.canvas.fill_rect(bar, HP_BACK);
                self.canvas
                    .fill_rect(Rect::new(bar.x, bar.y, bar.w * frac, bar.h), HP_FILL);
            }
            self.report.entities += 1;
        }
    }

    fn decorations(&mut self, world: &WorldState) {
        for d in &world.decorations {
            self.canvas.save();
            self.canvas.translate(d.x, d.y);
            self.canvas.rotate(anim::sway(self.t, d.id));
            match d.kind {
                DecorationKind::Tree | DecorationKind::Unknown => {
                    let size = d.size.draw_size();
                    self.sprite_or(
                        SpriteKey::Tree(d.size),
                        Rect::centered(Vec2::ZERO, size),
                        |c| {
                            c.fill_rect(
                                Rect::new(-size * 0.08, size * 0.2, size * 0.16, size * 0.3),
                                TRUNK,
                            );
                            c.fill_circle(Vec2::new(0.0, -size * 0.05), size * 0.36, PINE);
                        },
                    );
                }
                DecorationKind::Flag => {
                    self.sprite_or(SpriteKey::Flag, Rect::centered(Vec2::ZERO, GIFT_SIZE), |c| {
                        flag_fallback(c, Vec2::ZERO)
                    });
                }
            }
            self.canvas.restore();
            self.report.entities += 1;
        }
    }

    fn hill(&mut self, store: &EntityStore, world: &WorldState) {
        let Some(hill) = &world.hill else {
            return;
        };
        let tint = hill
            .holder
            .as_deref()
            .and_then(|id| store.player(id))
            .map(|p| p.color.rgba())
            .unwrap_or(Rgba::GOLD);
        let pulse = anim::pulse(self.t, 2.0);
        self.canvas
            .fill_circle(hill.pos, hill.radius, tint.with_alpha(0.18 + 0.08 * pulse));
        self.canvas
            .stroke_circle(hill.pos, hill.radius, tint, 3.0 + 2.0 * pulse);
        self.report.entities += 1;
    }

    fn light_marker(&mut self, world: &WorldState) {
        let Some(light) = world.light.as_ref().filter(|l| l.holder.is_none()) else {
            return;
        };
        let center = Vec2::new(light.pos.x, light.pos.y + (self.t * 2.0).sin() * 3.0);
        let glow = anim::pulse(self.t, 3.0);
        self.canvas.fill_circle(
            center,
            LIGHT_RADIUS * (1.6 + 0.3 * glow),
            Rgba::GOLD.with_alpha(0.25),
        );
        self.sprite_or(
            SpriteKey::LightOrb,
            Rect::centered(center, LIGHT_RADIUS * 2.0),
            |c| {
                c.fill_circle(center, LIGHT_RADIUS, Rgba::GOLD);
                c.fill_circle(center, LIGHT_RADIUS * 0.45, Rgba::WHITE);
            },
        );
        self.report.entities += 1;
    }

    fn light_aura(&mut self, store: &EntityStore, world: &WorldState) {
        let holder = world
            .light
            .as_ref()
            .and_then(|l| l.holder.as_deref())
            .and_then(|id| store.player(id))
            .or_else(|| store.players().find(|p| p.has_light));
        let Some(holder) = holder else {
            return;
        };
        let pulse = anim::pulse(self.t, 4.0);
        self.canvas.fill_circle(
            holder.pos,
            PLAYER_RADIUS * 3.0,
            Rgba::GOLD.with_alpha(0.12 + 0.1 * pulse),
        );
        self.canvas.stroke_circle(
            holder.pos,
            PLAYER_RADIUS * (2.0 + 0.3 * pulse),
            Rgba::GOLD,
            3.0,
        );
    }

    fn players(&mut self, store: &EntityStore, frame: &Frame<'_>) {
        let team_rings = frame.features.contains(RoundFeatures::TEAM_RINGS);
        for player in store.players() {
            if !player.alive {
                self.canvas.save();
                self.canvas.set_alpha(0.35);
            }
            self.player_body(&player);
            if team_rings {
                self.team_rings(&player);
            }
            self.facing_overlay(&player);
            if frame.local_player == Some(player.id) {
                let pulse = anim::pulse(self.t, 5.0);
                self.canvas.stroke_circle(
                    player.pos,
                    PLAYER_RADIUS + 8.0 + 2.0 * pulse,
                    Rgba::WHITE,
                    2.0,
                );
            }
            self.canvas.text(
                player.name,
                Vec2::new(player.pos.x, player.pos.y - PLAYER_RADIUS - 12.0),
                11.0,
                OUTLINE,
            );
            if !player.alive {
                self.canvas.restore();
            }
            self.report.entities += 1;
        }
    }

    fn player_body(&mut self, player: &PlayerView<'_>) {
        let center = player.pos;
        let fill = player.color.rgba();
        self.canvas.fill_circle(
            Vec2::new(center.x, center.y + PLAYER_RADIUS * 0.9),
            PLAYER_RADIUS * 0.7,
            SHADOW,
        );
        self.sprite_or(
            SpriteKey::Player(player.color),
            Rect::centered(center, PLAYER_SPRITE),
            |c| {
                c.fill_circle(center, PLAYER_RADIUS, fill);
                c.stroke_circle(center, PLAYER_RADIUS, OUTLINE, 2.0);
            },
        );
    }

    fn team_rings(&mut self, player: &PlayerView<'_>) {
        let color = team_color(player.team);
        for i in 0..player.rings_left.min(3) {
            self.canvas.stroke_circle(
                player.pos,
                RING_BASE + RING_STEP * f64::from(i),
                color,
                2.0,
            );
        }
    }

    /// Facing marker plus alternating feet while moving.
    fn facing_overlay(&mut self, player: &PlayerView<'_>) {
        let dir = Direction8::from_facing(player.facing).unit();
        let nose = player.pos + dir * (PLAYER_RADIUS * 0.65);
        self.canvas.fill_circle(nose, 3.0, Rgba::WHITE);
        self.canvas.stroke_circle(nose, 3.0, OUTLINE, 1.0);

        if !(player.moving && player.alive) {
            return;
        }
        let side = Vec2::new(-dir.y, dir.x);
        let stride = if anim::footstep_frame(self.t, player.id) == 0 {
            4.0
        } else {
            -4.0
        };
        let base = player.pos + dir * (PLAYER_RADIUS * 0.3);
        let left = base + side * 6.0 + dir * stride;
        let right = base - side * 6.0 - dir * stride;
        self.canvas.fill_circle(left, 3.0, OUTLINE);
        self.canvas.fill_circle(right, 3.0, OUTLINE);
    }
}

fn gift_fallback<C: Canvas + ?Sized>(c: &mut C, kind: GiftKind, center: Vec2) {
    match kind {
        GiftKind::Candy => {
            c.fill_circle(center, 8.0, Rgba::rgb(230, 40, 60));
            c.line(
                Vec2::new(center.x - 6.0, center.y - 6.0),
                Vec2::new(center.x + 6.0, center.y + 6.0),
                Rgba::WHITE,
                3.0,
            );
        }
        GiftKind::Present => {
            let body = Rect::centered(center, 18.0);
            c.fill_rect(body, Rgba::rgb(46, 160, 90));
            c.fill_rect(Rect::new(center.x - 2.0, body.y, 4.0, body.h), Rgba::GOLD);
            c.fill_rect(Rect::new(body.x, center.y - 2.0, body.w, 4.0), Rgba::GOLD);
        }
        GiftKind::Flag => flag_fallback(c, center),
        GiftKind::Unknown => c.fill_circle(center, 8.0, Rgba::GOLD),
    }
}

fn flag_fallback<C: Canvas + ?Sized>(c: &mut C, base: Vec2) {
    c.line(
        Vec2::new(base.x - 6.0, base.y + 12.0),
        Vec2::new(base.x - 6.0, base.y - 12.0),
        TRUNK,
        2.0,
    );
    c.fill_rect(Rect::new(base.x - 5.0, base.y - 12.0, 14.0, 9.0), Rgba::TEAM_RED);
}

fn monster_fallback<C: Canvas + ?Sized>(c: &mut C, kind: MonsterKind, radius: f64) {
    let body = match kind {
        MonsterKind::Small => Rgba::rgb(150, 90, 200),
        MonsterKind::Medium => Rgba::rgb(120, 60, 170),
        MonsterKind::Big => Rgba::rgb(90, 30, 130),
        MonsterKind::Yeti => Rgba::rgb(230, 240, 250),
        MonsterKind::Unknown => Rgba::STONE,
    };
    c.fill_circle(Vec2::ZERO, radius, body);
    c.stroke_circle(Vec2::ZERO, radius, OUTLINE, 2.0);
    // Eyes sit forward (+x), so a flipped monster looks left.
    let eye = radius * 0.22;
    c.fill_circle(Vec2::new(radius * 0.35, -radius * 0.25), eye, Rgba::WHITE);
    c.fill_circle(Vec2::new(radius * 0.35, radius * 0.15), eye, Rgba::WHITE);
}
