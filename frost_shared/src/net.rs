//! Wire types.
//!
//! Goals:
//! - Mirror the JSON the game server emits (camelCase fields, snake_case
//!   event names) closely enough that payloads decode without a shim.
//! - Only identity and type tags are required. Everything else defaults,
//!   because the server omits or blanks fields freely (`"light": {}`,
//!   `"color": ""`, rooms without `width`).
//! - Keep the codec explicit: JSON over bytes, one envelope per frame.

use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::round::{RoomStatus, RoundType};

/// Connection epoch. Bumped by the transport on every (re)join so late
/// messages from an earlier room can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// Message as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub session: SessionId,
    pub message: ServerEvent,
}

impl Envelope {
    pub fn new(session: SessionId, message: ServerEvent) -> Self {
        Self { session, message }
    }
}

/// Named server events, `{"event": "...", "data": {...}}` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Join confirmation; carries the local player's id.
    RoomJoined {
        room: RoomPayload,
        #[serde(rename = "youId")]
        you_id: String,
    },
    RoomUpdate {
        room: RoomPayload,
    },
    /// High-frequency world tick. The server prepends a room header
    /// without players.
    WorldState {
        #[serde(default)]
        room: Option<RoomPayload>,
        world: WorldPayload,
    },
    RoundStarted {
        room: RoomPayload,
    },
    RoundEnded {
        room: RoomPayload,
    },
    GameOver {
        room: RoomPayload,
    },
    ServerError {
        #[serde(default)]
        message: String,
    },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::RoomJoined { .. } => "room_joined",
            ServerEvent::RoomUpdate { .. } => "room_update",
            ServerEvent::WorldState { .. } => "world_state",
            ServerEvent::RoundStarted { .. } => "round_started",
            ServerEvent::RoundEnded { .. } => "round_ended",
            ServerEvent::GameOver { .. } => "game_over",
            ServerEvent::ServerError { .. } => "server_error",
        }
    }
}

/// Room channel payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomPayload {
    pub code: String,
    pub status: RoomStatus,
    pub current_round: u32,
    pub max_rounds: u32,
    pub round_type: RoundType,
    /// Unix seconds; 0 while no round timer runs.
    pub round_ends_at: f64,
    pub host_id: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub players: Vec<PlayerPayload>,
}

/// A player as either channel reports it.
///
/// The room channel fills the roster fields and may carry stale positions;
/// the world channel fills positions, facing and liveness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_facing_x")]
    pub fx: f64,
    #[serde(default)]
    pub fy: f64,
    #[serde(default)]
    pub moving: bool,
    #[serde(default = "default_true")]
    pub alive: bool,
    #[serde(default)]
    pub team: u8,
    #[serde(default)]
    pub rings_left: u8,
    #[serde(default)]
    pub has_light: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub round_score: i64,
    #[serde(default)]
    pub ready: bool,
}

impl PlayerPayload {
    /// Minimal record with every optional field at its default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            color: String::new(),
            x: 0.0,
            y: 0.0,
            fx: default_facing_x(),
            fy: 0.0,
            moving: false,
            alive: true,
            team: 0,
            rings_left: 0,
            has_light: false,
            score: 0,
            round_score: 0,
            ready: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_facing_x() -> f64 {
    1.0
}

/// World channel payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldPayload {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub players: Vec<PlayerPayload>,
    pub projectiles: Vec<Projectile>,
    pub monster_projectiles: Vec<MonsterProjectile>,
    pub monsters: Vec<Monster>,
    pub decorations: Vec<Decoration>,
    pub hazards: Vec<Hazard>,
    pub gifts: Vec<Gift>,
    pub walls: Vec<Wall>,
    pub trails: Vec<Trail>,
    pub light: Option<LightPayload>,
    pub hill: Option<HillPayload>,
}

/// Player-thrown snowball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub owner: String,
}

/// Fireball thrown by a maze monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterProjectile {
    pub id: u64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterKind {
    Small,
    Medium,
    Big,
    Yeti,
    #[serde(other)]
    Unknown,
}

impl MonsterKind {
    /// Collision radius used by the server; doubles as draw radius.
    pub fn radius(self) -> f64 {
        match self {
            MonsterKind::Small => 12.0,
            MonsterKind::Medium => 16.0,
            MonsterKind::Big => 22.0,
            MonsterKind::Yeti => 18.0,
            MonsterKind::Unknown => 14.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: MonsterKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub hp: f64,
    #[serde(default)]
    pub max_hp: f64,
    #[serde(default)]
    pub dir_x: f64,
    #[serde(default)]
    pub dir_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationKind {
    Tree,
    Flag,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TreeSize {
    Small,
    #[default]
    Medium,
    Large,
    #[serde(other)]
    Unknown,
}

impl TreeSize {
    /// Sprite edge length in world units.
    pub fn draw_size(self) -> f64 {
        match self {
            TreeSize::Small => 32.0,
            TreeSize::Medium | TreeSize::Unknown => 48.0,
            TreeSize::Large => 64.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: DecorationKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub size: TreeSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    /// Falling snowball from the survival round.
    #[default]
    Snowball,
    /// Rolling boulder; drawn spinning.
    BigSnowball,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: HazardKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub radius: Option<f64>,
}

impl Hazard {
    pub fn radius(&self) -> f64 {
        self.radius.unwrap_or(match self.kind {
            HazardKind::BigSnowball => 26.0,
            HazardKind::Snowball | HazardKind::Unknown => 14.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftKind {
    Candy,
    Present,
    Flag,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: GiftKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub vy: f64,
}

/// Axis-aligned maze wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Wall {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Ski-track segment left behind on the ice round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_alpha() -> f64 {
    1.0
}

/// Light pickup. The server sends `{}` when no light exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LightPayload {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub holder: String,
}

/// Capture zone for the hill round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HillPayload {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_hill_radius")]
    pub radius: f64,
    #[serde(default)]
    pub holder: String,
}

fn default_hill_radius() -> f64 {
    90.0
}

/// Convenience codec helpers.
pub fn encode_to_bytes(envelope: &Envelope) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(envelope).context("serialize envelope")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes(b: &[u8]) -> anyhow::Result<Envelope> {
    serde_json::from_slice(b).context("deserialize envelope")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_room_update_from_server_shape() {
        let raw = r#"{"event":"room_update","data":{"room":{
            "code":"ABCD","status":"in_round","currentRound":2,"hostId":"h",
            "players":[{"id":"p1","name":"Ada","color":"teal","x":40.0,"y":40.0,
                        "score":3,"roundScore":1,"ready":true,"team":0,"alive":true,"ringsLeft":0}],
            "roundEndsAt":1700000000.5,"maxRounds":5,"roundType":"maze","width":960,"height":540}}}"#;
        let msg: ServerEvent = serde_json::from_str(raw).unwrap();
        let ServerEvent::RoomUpdate { room } = msg else {
            panic!("expected room_update");
        };
        assert_eq!(room.code, "ABCD");
        assert_eq!(room.status, RoomStatus::InRound);
        assert_eq!(room.round_type, RoundType::Maze);
        assert_eq!(room.players[0].round_score, 1);
        assert!(room.players[0].ready);
        assert_eq!(room.width, Some(960.0));
    }

    #[test]
    fn world_state_tolerates_missing_collections() {
        let raw = r#"{"event":"world_state","data":{"world":{"width":6000,"height":3600,
            "players":[{"id":"p1","x":1.5,"y":2.5}],"light":{}}}}"#;
        let msg: ServerEvent = serde_json::from_str(raw).unwrap();
        let ServerEvent::WorldState { room, world } = msg else {
            panic!("expected world_state");
        };
        assert!(room.is_none());
        assert!(world.monsters.is_empty());
        assert!(world.hill.is_none());
        assert_eq!(world.light, Some(LightPayload::default()));
        let p = &world.players[0];
        assert!(p.alive);
        assert_eq!((p.fx, p.fy), (1.0, 0.0));
    }

    #[test]
    fn unknown_variant_tags_do_not_fail() {
        let raw = r#"{"id":9,"type":"dragon","x":1,"y":2}"#;
        let m: Monster = serde_json::from_str(raw).unwrap();
        assert_eq!(m.kind, MonsterKind::Unknown);
        let raw = r#"{"id":3,"x":1,"y":2}"#;
        let h: Hazard = serde_json::from_str(raw).unwrap();
        assert_eq!(h.kind, HazardKind::Snowball);
        assert_eq!(h.radius(), 14.0);
    }

    #[test]
    fn envelope_roundtrip_bytes() {
        let env = Envelope::new(
            SessionId(7),
            ServerEvent::ServerError {
                message: "Room is full".into(),
            },
        );
        let bytes = encode_to_bytes(&env).unwrap();
        assert_eq!(decode_from_bytes(&bytes).unwrap(), env);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_from_bytes(b"{not json").is_err());
    }
}
