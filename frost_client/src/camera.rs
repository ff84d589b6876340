//! Camera solver.
//!
//! Produces the world→screen affine transform for one frame. Each axis is
//! solved on its own: an axis where the whole world fits on screen is
//! letterboxed (centered, static); an axis where it does not pans to follow
//! the local player, clamped so the view never leaves the world.

use frost_shared::{
    math::{Rect, Vec2, Viewport},
    round::RoundContext,
};

use crate::store::{sanitize_extent, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH};

/// Worlds wider or taller than this get a fixed-size view window.
pub const OVERSIZED_WIDTH: f64 = 2000.0;
pub const OVERSIZED_HEIGHT: f64 = 1200.0;
/// View window (world units) used for oversized worlds.
pub const OVERSIZED_VIEW_WIDTH: f64 = 1200.0;
pub const OVERSIZED_VIEW_HEIGHT: f64 = 675.0;
/// Zoom applied to normal-sized worlds while a round is live.
pub const ROUND_ZOOM: f64 = 1.15;

const FIT_EPSILON: f64 = 1e-9;

/// `screen = world * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CameraTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
        )
    }

    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            (p.x - self.offset_x) / self.scale,
            (p.y - self.offset_y) / self.scale,
        )
    }

    /// World-space rectangle covered by the viewport.
    pub fn visible_world_rect(&self, viewport: Viewport) -> Rect {
        let top_left = self.screen_to_world(Vec2::ZERO);
        Rect::new(
            top_left.x,
            top_left.y,
            viewport.width / self.scale,
            viewport.height / self.scale,
        )
    }
}

/// Everything the solver looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraInput {
    /// World extent `(W, H)`.
    pub world: Vec2,
    pub viewport: Viewport,
    pub round: RoundContext,
    /// Local player position, if the player is in the store.
    pub focus: Option<Vec2>,
}

pub fn is_oversized(world: Vec2) -> bool {
    world.x > OVERSIZED_WIDTH || world.y > OVERSIZED_HEIGHT
}

/// Solves the camera for one frame. Never fails: degenerate worlds fall back
/// to 960×540 and a degenerate viewport yields the identity transform.
pub fn solve(input: &CameraInput) -> CameraTransform {
    if !input.viewport.is_drawable() {
        return CameraTransform::IDENTITY;
    }
    let world = Vec2::new(
        sanitize_extent(input.world.x, DEFAULT_WORLD_WIDTH),
        sanitize_extent(input.world.y, DEFAULT_WORLD_HEIGHT),
    );
    let (cw, ch) = (input.viewport.width, input.viewport.height);

    let oversized = is_oversized(world);
    let target = if oversized {
        Vec2::new(OVERSIZED_VIEW_WIDTH, OVERSIZED_VIEW_HEIGHT)
    } else {
        world
    };

    let base_scale = (cw / target.x).min(ch / target.y);
    let zoom = if !input.round.is_active_round() || oversized {
        1.0
    } else {
        ROUND_ZOOM
    };
    let scale = base_scale * zoom;

    let view = Vec2::new(cw / scale, ch / scale);
    let focus = input.focus.filter(|p| p.is_finite());

    CameraTransform {
        scale,
        offset_x: axis_offset(world.x, view.x, cw, scale, focus.map(|p| p.x)),
        offset_y: axis_offset(world.y, view.y, ch, scale, focus.map(|p| p.y)),
    }
}

/// Left (or top) edge of the view along one axis, in world units.
fn camera_edge(world_dim: f64, view_dim: f64, focus: Option<f64>) -> f64 {
    let Some(focus) = focus else {
        return 0.0;
    };
    let half = view_dim / 2.0;
    if world_dim <= view_dim {
        return 0.0;
    }
    focus.clamp(half, world_dim - half) - half
}

fn axis_offset(
    world_dim: f64,
    view_dim: f64,
    viewport_dim: f64,
    scale: f64,
    focus: Option<f64>,
) -> f64 {
    let projected = world_dim * scale;
    if projected <= viewport_dim + FIT_EPSILON {
        (viewport_dim - projected) / 2.0
    } else {
        -camera_edge(world_dim, view_dim, focus) * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frost_shared::round::{RoomStatus, RoundType};

    const EPS: f64 = 1e-4;

    fn lobby() -> RoundContext {
        RoundContext::new(RoomStatus::Lobby, RoundType::Lobby)
    }

    fn active(rt: RoundType) -> RoundContext {
        RoundContext::new(RoomStatus::InRound, rt)
    }

    #[test]
    fn letterbox_centering_exact_fit() {
        let t = solve(&CameraInput {
            world: Vec2::new(960.0, 540.0),
            viewport: Viewport::new(800.0, 450.0),
            round: lobby(),
            focus: None,
        });
        assert!((t.scale - 0.8333).abs() < EPS);
        assert!(t.offset_x.abs() < EPS);
        assert!(t.offset_y.abs() < EPS);
    }

    #[test]
    fn letterbox_centers_narrow_axis() {
        // 16:9 world in a 4:3 viewport: fits horizontally, bars top and bottom.
        let t = solve(&CameraInput {
            world: Vec2::new(960.0, 540.0),
            viewport: Viewport::new(800.0, 600.0),
            round: lobby(),
            focus: Some(Vec2::new(900.0, 500.0)),
        });
        assert!((t.scale - 800.0 / 960.0).abs() < EPS);
        assert!(t.offset_x.abs() < EPS);
        assert!((t.offset_y - 75.0).abs() < EPS);
    }

    #[test]
    fn panning_clamp_oversized_world() {
        let input = CameraInput {
            world: Vec2::new(3000.0, 1500.0),
            viewport: Viewport::new(800.0, 450.0),
            round: active(RoundType::Snowball),
            focus: Some(Vec2::new(100.0, 750.0)),
        };
        let t = solve(&input);
        assert!((t.scale - 0.6667).abs() < EPS);
        assert!((800.0 / t.scale - 1200.0).abs() < 1e-6);
        assert_eq!(t.offset_x, 0.0);
        // Vertically centered on the player: top edge 750 - 337.5.
        assert!((t.offset_y + 412.5 * t.scale).abs() < 1e-6);
    }

    #[test]
    fn panning_clamps_far_edge() {
        let t = solve(&CameraInput {
            world: Vec2::new(3000.0, 1500.0),
            viewport: Viewport::new(800.0, 450.0),
            round: active(RoundType::Maze),
            focus: Some(Vec2::new(2990.0, 1490.0)),
        });
        let visible = t.visible_world_rect(Viewport::new(800.0, 450.0));
        assert!((visible.right() - 3000.0).abs() < 1e-6);
        assert!((visible.bottom() - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn active_round_zooms_small_worlds() {
        let t = solve(&CameraInput {
            world: Vec2::new(960.0, 540.0),
            viewport: Viewport::new(960.0, 540.0),
            round: active(RoundType::Survival),
            focus: Some(Vec2::new(480.0, 270.0)),
        });
        assert!((t.scale - 1.15).abs() < EPS);
        // World no longer fits, so the camera pans around the centered player.
        let center = t.world_to_screen(Vec2::new(480.0, 270.0));
        assert!((center.x - 480.0).abs() < 1e-6);
        assert!((center.y - 270.0).abs() < 1e-6);
    }

    #[test]
    fn axes_are_solved_independently() {
        // Wide, short oversized world: pans horizontally, letterboxed vertically.
        let t = solve(&CameraInput {
            world: Vec2::new(2400.0, 600.0),
            viewport: Viewport::new(800.0, 450.0),
            round: lobby(),
            focus: Some(Vec2::new(1000.0, 300.0)),
        });
        assert!((t.scale - 0.6667).abs() < EPS);
        assert!((t.offset_x + 400.0 * t.scale).abs() < 1e-6);
        assert!((t.offset_y - 25.0).abs() < 1e-6);
    }

    #[test]
    fn missing_player_falls_back_to_origin() {
        let t = solve(&CameraInput {
            world: Vec2::new(6000.0, 3600.0),
            viewport: Viewport::new(1280.0, 720.0),
            round: active(RoundType::Light),
            focus: None,
        });
        assert_eq!(t.offset_x, 0.0);
        assert_eq!(t.offset_y, 0.0);
    }

    #[test]
    fn degenerate_inputs_never_panic() {
        let t = solve(&CameraInput {
            world: Vec2::new(f64::NAN, -5.0),
            viewport: Viewport::new(800.0, 450.0),
            round: lobby(),
            focus: Some(Vec2::new(f64::INFINITY, 0.0)),
        });
        assert!((t.scale - 0.8333).abs() < EPS);

        let t = solve(&CameraInput {
            world: Vec2::new(960.0, 540.0),
            viewport: Viewport::new(0.0, 450.0),
            round: lobby(),
            focus: None,
        });
        assert_eq!(t, CameraTransform::IDENTITY);
    }

    #[test]
    fn follow_is_continuous() {
        let mut last: Option<f64> = None;
        for step in 0..=600 {
            let x = step as f64 * 5.0;
            let t = solve(&CameraInput {
                world: Vec2::new(3000.0, 1500.0),
                viewport: Viewport::new(800.0, 450.0),
                round: active(RoundType::Snowball),
                focus: Some(Vec2::new(x, 750.0)),
            });
            if let Some(prev) = last {
                assert!((t.offset_x - prev).abs() <= 5.0 * t.scale + 1e-9);
            }
            last = Some(t.offset_x);
        }
    }

    #[test]
    fn screen_roundtrip() {
        let t = CameraTransform {
            scale: 0.75,
            offset_x: -120.0,
            offset_y: 33.0,
        };
        let p = Vec2::new(1234.5, 678.9);
        let back = t.screen_to_world(t.world_to_screen(p));
        assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);
    }
}
