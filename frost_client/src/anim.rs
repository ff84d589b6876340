//! Cosmetic animation.
//!
//! Every function here is pure in `(t, id)`: no counters, no per-entity
//! state. Rendering the same store at the same clock value always yields
//! the same pose, however many frames were dropped or snapshots replaced
//! in between.

use std::f64::consts::TAU;

use frost_shared::math::{Rect, Vec2};

/// Stable 32-bit FNV-1a hash of an entity id.
pub fn phase_seed(id: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in id.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Seed folded into a small float so it can offset a clock value without
/// swamping it.
pub fn phase_offset(id: &str) -> f64 {
    f64::from(phase_seed(id) % 1024)
}

/// Vertical bob for collectibles: `sin(t*3 + id) * amplitude`.
pub fn gift_bob(t: f64, id: u64, amplitude: f64) -> f64 {
    (t * 3.0 + id as f64).sin() * amplitude
}

/// Radians per id step, so neighbouring hazards don't spin in lockstep.
pub const SPIN_ID_STEP: f64 = 0.7;

/// Rotation for rolling hazards: `t*3 + id*const`.
pub fn hazard_spin(t: f64, id: u64) -> f64 {
    (t * 3.0 + id as f64 * SPIN_ID_STEP).rem_euclid(TAU)
}

/// Decoration sway angle in radians.
pub fn sway(t: f64, id: u64) -> f64 {
    (t * 1.5 + id as f64 * 0.9).sin() * 0.05
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonsterPose {
    /// Vertical offset in world units.
    pub bob: f64,
    /// Tilt in radians.
    pub wobble: f64,
    /// Mirror horizontally (walking left).
    pub flip: bool,
}

pub fn monster_pose(t: f64, id: u64, dir_x: f64) -> MonsterPose {
    let phase = id as f64;
    MonsterPose {
        bob: (t * 4.0 + phase).sin() * 2.0,
        wobble: (t * 6.0 + phase * 1.3).sin() * 0.08,
        flip: dir_x < 0.0,
    }
}

/// Eight compass buckets, `y` grows downward (south).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction8 {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction8 {
    /// Buckets a facing vector by sign and dominant axis. An axis counts as
    /// dominant when it is more than twice the other; otherwise the facing
    /// is diagonal. Zero facing reads as east.
    pub fn from_facing(facing: Vec2) -> Self {
        let (fx, fy) = (facing.x, facing.y);
        if !facing.is_finite() || (fx == 0.0 && fy == 0.0) {
            return Direction8::E;
        }
        let (ax, ay) = (fx.abs(), fy.abs());
        if ax > ay * 2.0 {
            return if fx > 0.0 { Direction8::E } else { Direction8::W };
        }
        if ay > ax * 2.0 {
            return if fy > 0.0 { Direction8::S } else { Direction8::N };
        }
        match (fx > 0.0, fy > 0.0) {
            (true, true) => Direction8::SE,
            (true, false) => Direction8::NE,
            (false, true) => Direction8::SW,
            (false, false) => Direction8::NW,
        }
    }

    /// Unit vector pointing in this direction.
    pub fn unit(self) -> Vec2 {
        const D: f64 = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            Direction8::N => Vec2::new(0.0, -1.0),
            Direction8::NE => Vec2::new(D, -D),
            Direction8::E => Vec2::new(1.0, 0.0),
            Direction8::SE => Vec2::new(D, D),
            Direction8::S => Vec2::new(0.0, 1.0),
            Direction8::SW => Vec2::new(-D, D),
            Direction8::W => Vec2::new(-1.0, 0.0),
            Direction8::NW => Vec2::new(-D, -D),
        }
    }
}

/// Two-frame footstep cycle: `floor((t*8 + hash(id)) mod 2)`.
pub fn footstep_frame(t: f64, id: &str) -> u8 {
    let v = (t * 8.0 + phase_offset(id)).rem_euclid(2.0);
    if v < 1.0 {
        0
    } else {
        1
    }
}

/// Position and radius of weather particle `index` inside `area`.
///
/// `(seed*k1 + t*speed) mod dimension`, so nothing about a flake is stored.
pub fn snowflake(index: usize, t: f64, area: Rect) -> (Vec2, f64) {
    const K1: f64 = 97.31;
    const K2: f64 = 57.17;
    let seed = index as f64;
    let lane = index % 3;
    let fall_speed = 28.0 + 14.0 * lane as f64;
    let drift_speed = 9.0 + 4.0 * lane as f64;

    let w = area.w.max(1.0);
    let h = area.h.max(1.0);
    let x = area.x + (seed * K1 + t * drift_speed).rem_euclid(w);
    let y = area.y + (seed * K2 + t * fall_speed).rem_euclid(h);
    (Vec2::new(x, y), 1.2 + 0.6 * lane as f64)
}

/// Slow pulse in `[0, 1]` for rings and markers.
pub fn pulse(t: f64, speed: f64) -> f64 {
    0.5 + 0.5 * (t * speed).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_seed_is_stable() {
        assert_eq!(phase_seed(""), 0x811c_9dc5);
        assert_eq!(phase_seed("abc"), phase_seed("abc"));
        assert_ne!(phase_seed("abc"), phase_seed("abd"));
    }

    #[test]
    fn direction_buckets() {
        assert_eq!(Direction8::from_facing(Vec2::new(1.0, 0.0)), Direction8::E);
        assert_eq!(Direction8::from_facing(Vec2::new(-1.0, 0.1)), Direction8::W);
        assert_eq!(Direction8::from_facing(Vec2::new(0.0, 1.0)), Direction8::S);
        assert_eq!(Direction8::from_facing(Vec2::new(0.2, -1.0)), Direction8::N);
        assert_eq!(Direction8::from_facing(Vec2::new(0.7, 0.7)), Direction8::SE);
        assert_eq!(Direction8::from_facing(Vec2::new(-0.7, -0.5)), Direction8::NW);
        assert_eq!(Direction8::from_facing(Vec2::ZERO), Direction8::E);
        assert_eq!(Direction8::from_facing(Vec2::new(f64::NAN, 1.0)), Direction8::E);
    }

    #[test]
    fn footsteps_alternate_every_eighth_second() {
        let id = "player-1";
        let a = footstep_frame(0.0, id);
        let b = footstep_frame(0.125, id);
        let c = footstep_frame(0.25, id);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn animation_is_pure_in_time_and_id() {
        for t in [0.0, 0.5, 13.37, 1_000.25] {
            assert_eq!(gift_bob(t, 7, 3.0), gift_bob(t, 7, 3.0));
            assert_eq!(monster_pose(t, 4, -1.0), monster_pose(t, 4, -1.0));
            assert_eq!(snowflake(11, t, Rect::new(0.0, 0.0, 800.0, 450.0)),
                       snowflake(11, t, Rect::new(0.0, 0.0, 800.0, 450.0)));
        }
    }

    #[test]
    fn monster_flips_on_negative_heading() {
        assert!(monster_pose(1.0, 1, -0.3).flip);
        assert!(!monster_pose(1.0, 1, 0.3).flip);
    }

    #[test]
    fn snowflakes_stay_inside_area() {
        let area = Rect::new(-50.0, 100.0, 300.0, 200.0);
        for i in 0..64 {
            for t in [0.0, 1.0, 99.9] {
                let (p, r) = snowflake(i, t, area);
                assert!(area.contains(p), "flake {i} at {p:?}");
                assert!(r > 0.0);
            }
        }
    }

    #[test]
    fn spin_wraps() {
        let a = hazard_spin(1_000_000.0, 3);
        assert!((0.0..TAU).contains(&a));
    }
}
