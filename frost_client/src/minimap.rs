//! Minimap projector.
//!
//! A small always-whole-world overview. Its transform is a plain linear map
//! from world units into a screen rectangle and has nothing to do with the
//! camera; the camera's visible area is only drawn into it as a box.

use frost_shared::{
    color::Rgba,
    math::{Rect, Vec2, Viewport},
    render::Canvas,
    round::{FeatureTable, RoundContext, RoundFeatures},
};

use crate::store::EntityStore;

pub const MIN_WIDTH: f64 = 90.0;
pub const MAX_WIDTH: f64 = 105.0;
/// Share of the viewport width the map would like to take.
pub const WIDTH_FRACTION: f64 = 0.12;
pub const MAX_HEIGHT: f64 = 72.0;
pub const MARGIN: f64 = 16.0;
/// Height of the HUD band the map sits under.
pub const HUD_BAND: f64 = 64.0;
/// Viewports shorter than this use the compact HUD layout.
pub const COMPACT_HUD_MAX_HEIGHT: f64 = 520.0;
pub const COMPACT_MARGIN: f64 = 8.0;

/// World → minimap linear map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapTransform {
    /// Screen-space rectangle of the map.
    pub rect: Rect,
    /// World extent `(W, H)` the map covers.
    pub world: Vec2,
}

impl MinimapTransform {
    pub fn new(rect: Rect, world: Vec2) -> Self {
        Self { rect, world }
    }

    pub fn to_map_x(&self, x: f64) -> f64 {
        self.rect.x + (x / self.world.x) * self.rect.w
    }

    pub fn to_map_y(&self, y: f64) -> f64 {
        self.rect.y + (y / self.world.y) * self.rect.h
    }

    pub fn to_map(&self, p: Vec2) -> Vec2 {
        Vec2::new(self.to_map_x(p.x), self.to_map_y(p.y))
    }

    pub fn from_map(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            (p.x - self.rect.x) / self.rect.w * self.world.x,
            (p.y - self.rect.y) / self.rect.h * self.world.y,
        )
    }

    /// World rectangle mapped onto the minimap, clipped to it.
    pub fn to_map_rect(&self, r: Rect) -> Rect {
        let x0 = self.to_map_x(r.x).max(self.rect.x);
        let y0 = self.to_map_y(r.y).max(self.rect.y);
        let x1 = self.to_map_x(r.right()).min(self.rect.right());
        let y1 = self.to_map_y(r.bottom()).min(self.rect.bottom());
        Rect::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }
}

pub fn is_compact_hud(viewport: Viewport) -> bool {
    viewport.height < COMPACT_HUD_MAX_HEIGHT
}

/// Sizes and places the map for a world extent and viewport.
///
/// The map always keeps the world's aspect ratio. When the height cap
/// applies, the width shrinks with it and may drop below `MIN_WIDTH`.
pub fn layout(world: Vec2, viewport: Viewport) -> MinimapTransform {
    let mut width = (viewport.width * WIDTH_FRACTION).clamp(MIN_WIDTH, MAX_WIDTH);
    let mut height = width * world.y / world.x;
    if height > MAX_HEIGHT {
        height = MAX_HEIGHT;
        width = height * world.x / world.y;
    }

    let (x, y) = if is_compact_hud(viewport) {
        (viewport.width - width - COMPACT_MARGIN, COMPACT_MARGIN)
    } else {
        (viewport.width - width - MARGIN, HUD_BAND + MARGIN)
    };
    MinimapTransform::new(Rect::new(x, y, width, height), world)
}

/// Minimap for the current frame, or `None` when the round has no overview.
pub fn project(
    store: &EntityStore,
    viewport: Viewport,
    round: RoundContext,
    features: &FeatureTable,
) -> Option<MinimapTransform> {
    if !viewport.is_drawable() || !features.has(round.round_type, RoundFeatures::MINIMAP) {
        return None;
    }
    store.world()?;
    Some(layout(store.extent(), viewport))
}

const PANEL: Rgba = Rgba::rgba(10, 18, 32, 190);
const PANEL_BORDER: Rgba = Rgba::rgba(255, 255, 255, 140);
const VIEW_BOX: Rgba = Rgba::rgba(255, 255, 255, 200);
const MONSTER_DOT: Rgba = Rgba::rgb(170, 60, 200);

/// Paints the overlay in screen space.
pub fn paint<C: Canvas + ?Sized>(
    canvas: &mut C,
    store: &EntityStore,
    map: &MinimapTransform,
    camera_view: Option<Rect>,
    local_player: Option<&str>,
) {
    let Some(world) = store.world() else {
        return;
    };

    canvas.fill_rect(map.rect, PANEL);

    for wall in &world.walls {
        let r = map.to_map_rect(Rect::new(wall.x, wall.y, wall.w, wall.h));
        canvas.fill_rect(Rect::new(r.x, r.y, r.w.max(1.0), r.h.max(1.0)), Rgba::STONE);
    }
    for monster in &world.monsters {
        canvas.fill_circle(map.to_map(Vec2::new(monster.x, monster.y)), 1.5, MONSTER_DOT);
    }
    if let Some(hill) = &world.hill {
        let r = hill.radius / world.width * map.rect.w;
        canvas.stroke_circle(map.to_map(hill.pos), r.max(2.0), Rgba::GOLD, 1.0);
    }
    if let Some(light) = world.light.as_ref().filter(|l| l.holder.is_none()) {
        canvas.fill_circle(map.to_map(light.pos), 2.5, Rgba::GOLD);
    }

    for player in store.players().filter(|p| p.alive) {
        let at = map.to_map(player.pos);
        if Some(player.id) == local_player {
            canvas.fill_circle(at, 3.5, Rgba::WHITE);
            canvas.fill_circle(at, 2.5, player.color.rgba());
        } else {
            canvas.fill_circle(at, 2.0, player.color.rgba());
        }
        if player.has_light {
            canvas.stroke_circle(at, 4.5, Rgba::GOLD, 1.0);
        }
    }

    if let Some(view) = camera_view {
        let r = map.to_map_rect(view);
        if r.w > 0.0 && r.h > 0.0 {
            canvas.stroke_rect(r, VIEW_BOX, 1.0);
        }
    }

    canvas.stroke_rect(map.rect, PANEL_BORDER, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use frost_shared::render::{DrawCmd, RecordingCanvas};
    use frost_shared::round::{RoomStatus, RoundType};

    #[test]
    fn linear_map_and_inverse() {
        let map = MinimapTransform::new(
            Rect::new(0.0, 0.0, 100.0, 56.25),
            Vec2::new(960.0, 540.0),
        );
        let p = map.to_map(Vec2::new(480.0, 270.0));
        assert_eq!(p, Vec2::new(50.0, 28.125));
        let back = map.from_map(p);
        assert!((back.x - 480.0).abs() < 1e-9);
        assert!((back.y - 270.0).abs() < 1e-9);
    }

    #[test]
    fn layout_matches_world_aspect() {
        let map = layout(Vec2::new(6000.0, 3600.0), Viewport::new(1280.0, 720.0));
        assert!(map.rect.w >= MIN_WIDTH && map.rect.w <= MAX_WIDTH);
        assert!((map.rect.h / map.rect.w - 0.6).abs() < 1e-9);
        assert_eq!(map.rect.right(), 1280.0 - MARGIN);
        assert_eq!(map.rect.y, HUD_BAND + MARGIN);
    }

    #[test]
    fn tall_worlds_are_height_capped() {
        let map = layout(Vec2::new(1000.0, 2000.0), Viewport::new(1280.0, 720.0));
        assert_eq!(map.rect.h, MAX_HEIGHT);
        assert!((map.rect.w - 36.0).abs() < 1e-9);
    }

    #[test]
    fn compact_hud_moves_the_map_up() {
        let map = layout(Vec2::new(2400.0, 1600.0), Viewport::new(640.0, 360.0));
        assert_eq!(map.rect.y, COMPACT_MARGIN);
        assert_eq!(map.rect.right(), 640.0 - COMPACT_MARGIN);
        assert_eq!(map.rect.w, MIN_WIDTH);
    }

    #[test]
    fn only_overview_rounds_get_a_minimap() {
        let mut store = EntityStore::new();
        store.ingest(crate::merge::Ingest::RoomUpdate(Default::default()));
        let table = FeatureTable::default();
        let vp = Viewport::new(1280.0, 720.0);
        let maze = RoundContext::new(RoomStatus::InRound, RoundType::Maze);
        let survival = RoundContext::new(RoomStatus::InRound, RoundType::Survival);
        assert!(project(&store, vp, maze, &table).is_some());
        assert!(project(&store, vp, survival, &table).is_none());
        assert!(project(&EntityStore::new(), vp, maze, &table).is_none());
    }

    #[test]
    fn view_box_is_clipped_to_map() {
        let map = MinimapTransform::new(Rect::new(10.0, 10.0, 100.0, 50.0), Vec2::new(1000.0, 500.0));
        let r = map.to_map_rect(Rect::new(-200.0, 100.0, 400.0, 1000.0));
        assert_eq!(r.x, 10.0);
        assert_eq!(r.bottom(), 60.0);
        assert!((r.w - 20.0).abs() < 1e-9);
    }

    #[test]
    fn paint_is_bracketed_by_panel() {
        let mut store = EntityStore::new();
        store.ingest(crate::merge::Ingest::RoomUpdate(Default::default()));
        let map = layout(store.extent(), Viewport::new(1280.0, 720.0));
        let mut canvas = RecordingCanvas::new();
        paint(&mut canvas, &store, &map, None, None);
        assert_eq!(
            canvas.commands().first(),
            Some(&DrawCmd::FillRect {
                rect: map.rect,
                color: PANEL
            })
        );
        assert!(matches!(canvas.commands().last(), Some(DrawCmd::StrokeRect { .. })));
    }
}
