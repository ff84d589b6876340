//! Entity snapshot store.
//!
//! Holds exactly one contribution per channel:
//! - room channel: [`RoomMeta`] + roster (names, colors, scores, ready, team)
//! - world channel: [`WorldState`] (extent, every entity collection, player
//!   kinematics)
//!
//! The renderer reads players through [`EntityStore::players`], which joins
//! the two: kinematics from the world record, roster fields from the roster
//! record. Each half of a [`PlayerView`] therefore comes from a single
//! message.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use frost_shared::{
    color::PlayerColor,
    math::Vec2,
    net::{Decoration, Gift, Hazard, Monster, MonsterProjectile, Projectile, Trail, Wall},
    round::{RoomStatus, RoundContext, RoundType},
};

/// World extent used until a message says otherwise.
pub const DEFAULT_WORLD_WIDTH: f64 = 960.0;
pub const DEFAULT_WORLD_HEIGHT: f64 = 540.0;

/// Room metadata from the latest room-channel message (or world header).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoomMeta {
    pub code: String,
    pub status: RoomStatus,
    pub current_round: u32,
    pub max_rounds: u32,
    pub round_type: RoundType,
    /// Unix seconds; 0 while no timer runs.
    pub round_ends_at: f64,
    pub host_id: String,
}

impl RoomMeta {
    pub fn round_context(&self) -> RoundContext {
        RoundContext::new(self.status, self.round_type)
    }

    /// Seconds left on the round timer at wall-clock `now`. Recomputed on
    /// demand, so every room update corrects it.
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> f64 {
        if self.status != RoomStatus::InRound || self.round_ends_at <= 0.0 {
            return 0.0;
        }
        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        (self.round_ends_at - now_secs).max(0.0)
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        !self.host_id.is_empty() && self.host_id == player_id
    }
}

/// Roster fields for one player, owned by the room channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub color: PlayerColor,
    pub team: u8,
    pub score: i64,
    pub round_score: i64,
    pub ready: bool,
}

/// Player record as carried by the world (or placeholder) snapshot.
///
/// The roster-like fields here are only used for players the roster does
/// not know yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBody {
    pub id: String,
    pub name: String,
    pub color: PlayerColor,
    pub team: u8,
    pub score: i64,
    pub round_score: i64,
    pub pos: Vec2,
    pub facing: Vec2,
    pub moving: bool,
    pub alive: bool,
    pub has_light: bool,
    pub rings_left: u8,
}

/// Where the current player positions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    /// Seeded from a room roster before any world snapshot arrived.
    Placeholder,
    /// Set by a world snapshot; room messages no longer touch positions.
    World,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightPickup {
    pub pos: Vec2,
    /// Player currently carrying the light.
    pub holder: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HillZone {
    pub pos: Vec2,
    pub radius: f64,
    pub holder: Option<String>,
}

/// World-channel contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    pub width: f64,
    pub height: f64,
    pub source: PositionSource,
    pub players: Vec<PlayerBody>,
    pub projectiles: Vec<Projectile>,
    pub monster_projectiles: Vec<MonsterProjectile>,
    pub monsters: Vec<Monster>,
    pub decorations: Vec<Decoration>,
    pub hazards: Vec<Hazard>,
    pub gifts: Vec<Gift>,
    pub walls: Vec<Wall>,
    pub trails: Vec<Trail>,
    pub light: Option<LightPickup>,
    pub hill: Option<HillZone>,
}

impl WorldState {
    /// Empty world of the given extent.
    pub fn empty(width: f64, height: f64, source: PositionSource) -> Self {
        Self {
            width: sanitize_extent(width, DEFAULT_WORLD_WIDTH),
            height: sanitize_extent(height, DEFAULT_WORLD_HEIGHT),
            source,
            players: Vec::new(),
            projectiles: Vec::new(),
            monster_projectiles: Vec::new(),
            monsters: Vec::new(),
            decorations: Vec::new(),
            hazards: Vec::new(),
            gifts: Vec::new(),
            walls: Vec::new(),
            trails: Vec::new(),
            light: None,
            hill: None,
        }
    }

    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Total number of drawable entities of every kind.
    pub fn entity_count(&self) -> usize {
        self.players.len()
            + self.projectiles.len()
            + self.monster_projectiles.len()
            + self.monsters.len()
            + self.decorations.len()
            + self.hazards.len()
            + self.gifts.len()
            + self.walls.len()
            + self.trails.len()
            + usize::from(self.light.is_some())
            + usize::from(self.hill.is_some())
    }
}

pub(crate) fn sanitize_extent(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Player joined across both channels for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub color: PlayerColor,
    pub team: u8,
    pub score: i64,
    pub round_score: i64,
    pub ready: bool,
    pub pos: Vec2,
    pub facing: Vec2,
    pub moving: bool,
    pub alive: bool,
    pub has_light: bool,
    pub rings_left: u8,
}

/// Latest known state of everything the client draws.
#[derive(Debug, Default, Clone)]
pub struct EntityStore {
    pub(crate) room: Option<RoomMeta>,
    pub(crate) roster: Vec<RosterEntry>,
    pub(crate) roster_index: HashMap<String, usize>,
    pub(crate) world: Option<WorldState>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entity; nothing survives a session boundary.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.room.is_none() && self.world.is_none()
    }

    pub fn room(&self) -> Option<&RoomMeta> {
        self.room.as_ref()
    }

    pub fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn roster_entry(&self, id: &str) -> Option<&RosterEntry> {
        self.roster_index.get(id).and_then(|&i| self.roster.get(i))
    }

    /// True once a world snapshot (not a roster placeholder) set positions.
    pub fn has_world_positions(&self) -> bool {
        matches!(
            self.world.as_ref().map(|w| w.source),
            Some(PositionSource::World)
        )
    }

    pub fn round_context(&self) -> RoundContext {
        self.room
            .as_ref()
            .map(RoomMeta::round_context)
            .unwrap_or_default()
    }

    /// World extent, defaulting to 960×540 before any message.
    pub fn extent(&self) -> Vec2 {
        self.world
            .as_ref()
            .map(WorldState::extent)
            .unwrap_or(Vec2::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT))
    }

    /// Players in world-message order.
    pub fn players(&self) -> impl Iterator<Item = PlayerView<'_>> + '_ {
        self.world
            .iter()
            .flat_map(|w| w.players.iter())
            .map(move |body| self.join(body))
    }

    pub fn player(&self, id: &str) -> Option<PlayerView<'_>> {
        self.world
            .as_ref()?
            .players
            .iter()
            .find(|b| b.id == id)
            .map(|body| self.join(body))
    }

    fn join<'a>(&'a self, body: &'a PlayerBody) -> PlayerView<'a> {
        let kinematics = PlayerView {
            id: &body.id,
            name: &body.name,
            color: body.color,
            team: body.team,
            score: body.score,
            round_score: body.round_score,
            ready: false,
            pos: body.pos,
            facing: body.facing,
            moving: body.moving,
            alive: body.alive,
            has_light: body.has_light,
            rings_left: body.rings_left,
        };
        match self.roster_entry(&body.id) {
            Some(entry) => PlayerView {
                name: &entry.name,
                color: entry.color,
                team: entry.team,
                score: entry.score,
                round_score: entry.round_score,
                ready: entry.ready,
                ..kinematics
            },
            None => kinematics,
        }
    }
}
