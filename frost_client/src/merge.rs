//! Snapshot merge engine.
//!
//! Precedence rules:
//! - A room update replaces room metadata and the roster wholesale.
//! - A world snapshot replaces every entity collection and all player
//!   kinematics wholesale.
//! - Positions belong to the world channel. A room update may only seed
//!   placeholder positions while no world snapshot has arrived, so a late
//!   or reordered room update can never move a player backwards.
//!
//! Wire defaulting happens here and nowhere else: the store only holds
//! sanitised values.

use std::collections::HashMap;

use frost_shared::{
    color::PlayerColor,
    math::Vec2,
    net::{HillPayload, LightPayload, PlayerPayload, RoomPayload, WorldPayload},
};
use tracing::{debug, trace};

use crate::store::{
    sanitize_extent, EntityStore, HillZone, LightPickup, PlayerBody, PositionSource, RoomMeta,
    RosterEntry, WorldState, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
};

/// Name shown for players that never sent one.
const FALLBACK_NAME: &str = "Player";
const FALLBACK_COLOR: PlayerColor = PlayerColor::Gray;

/// One channel message, ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Ingest {
    RoomUpdate(RoomPayload),
    WorldSnapshot {
        world: WorldPayload,
        /// Room header riding along with the world tick (no roster).
        header: Option<RoomPayload>,
    },
}

impl EntityStore {
    /// Applies one message. Never fails and never renders.
    pub fn ingest(&mut self, msg: Ingest) {
        match msg {
            Ingest::RoomUpdate(room) => self.apply_room(room),
            Ingest::WorldSnapshot { world, header } => {
                if let Some(header) = header {
                    self.room = Some(room_meta(&header));
                }
                self.apply_world(world);
            }
        }
    }

    fn apply_room(&mut self, room: RoomPayload) {
        self.room = Some(room_meta(&room));

        if !self.has_world_positions() {
            let mut world = WorldState::empty(
                room.width.unwrap_or(DEFAULT_WORLD_WIDTH),
                room.height.unwrap_or(DEFAULT_WORLD_HEIGHT),
                PositionSource::Placeholder,
            );
            world.players = room.players.iter().map(player_body).collect();
            debug!(players = world.players.len(), "Seeded placeholder world from roster");
            self.world = Some(world);
        }

        self.roster = room.players.into_iter().map(roster_entry).collect();
        self.roster_index = self
            .roster
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect::<HashMap<_, _>>();
    }

    fn apply_world(&mut self, world: WorldPayload) {
        let previous = self.world.as_ref().map(WorldState::extent);
        let fallback = previous.unwrap_or(Vec2::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT));

        let next = WorldState {
            width: sanitize_extent(world.width.unwrap_or(fallback.x), fallback.x),
            height: sanitize_extent(world.height.unwrap_or(fallback.y), fallback.y),
            source: PositionSource::World,
            players: world.players.iter().map(player_body).collect(),
            projectiles: world.projectiles,
            monster_projectiles: world.monster_projectiles,
            monsters: world.monsters,
            decorations: world.decorations,
            hazards: world.hazards,
            gifts: world.gifts,
            walls: world.walls,
            trails: world.trails,
            light: world.light.and_then(light_pickup),
            hill: world.hill.and_then(hill_zone),
        };

        if previous != Some(next.extent()) {
            debug!(width = next.width, height = next.height, "World extent changed");
        }
        trace!(entities = next.entity_count(), "Applied world snapshot");
        self.world = Some(next);
    }
}

fn room_meta(room: &RoomPayload) -> RoomMeta {
    RoomMeta {
        code: room.code.clone(),
        status: room.status,
        current_round: room.current_round,
        max_rounds: room.max_rounds,
        round_type: room.round_type,
        round_ends_at: if room.round_ends_at.is_finite() {
            room.round_ends_at
        } else {
            0.0
        },
        host_id: room.host_id.clone(),
    }
}

fn display_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name.chars().take(16).collect()
    }
}

fn parse_color(raw: &str) -> PlayerColor {
    raw.parse().unwrap_or(FALLBACK_COLOR)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn roster_entry(p: PlayerPayload) -> RosterEntry {
    RosterEntry {
        name: display_name(&p.name),
        color: parse_color(&p.color),
        team: p.team.min(1),
        score: p.score,
        round_score: p.round_score,
        ready: p.ready,
        id: p.id,
    }
}

fn player_body(p: &PlayerPayload) -> PlayerBody {
    PlayerBody {
        id: p.id.clone(),
        name: display_name(&p.name),
        color: parse_color(&p.color),
        team: p.team.min(1),
        score: p.score,
        round_score: p.round_score,
        pos: Vec2::new(finite_or(p.x, 0.0), finite_or(p.y, 0.0)),
        facing: Vec2::new(finite_or(p.fx, 1.0), finite_or(p.fy, 0.0)),
        moving: p.moving,
        alive: p.alive,
        has_light: p.has_light,
        rings_left: p.rings_left.min(3),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn light_pickup(light: LightPayload) -> Option<LightPickup> {
    let pos = Vec2::new(light.x?, light.y?);
    pos.is_finite().then(|| LightPickup {
        pos,
        holder: non_empty(light.holder),
    })
}

fn hill_zone(hill: HillPayload) -> Option<HillZone> {
    let pos = Vec2::new(hill.x, hill.y);
    (pos.is_finite() && hill.radius.is_finite() && hill.radius > 0.0).then(|| HillZone {
        pos,
        radius: hill.radius,
        holder: non_empty(hill.holder),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use frost_shared::{
        net::{Monster, MonsterKind},
        round::{RoomStatus, RoundType},
    };

    fn roster_player(id: &str, x: f64, score: i64) -> PlayerPayload {
        PlayerPayload {
            name: format!("name-{id}"),
            color: "blue".into(),
            x,
            y: 40.0,
            score,
            ..PlayerPayload::new(id)
        }
    }

    fn room_with(players: Vec<PlayerPayload>) -> RoomPayload {
        RoomPayload {
            code: "QWER".into(),
            status: RoomStatus::Lobby,
            players,
            ..RoomPayload::default()
        }
    }

    fn world_with(players: Vec<PlayerPayload>) -> WorldPayload {
        WorldPayload {
            width: Some(960.0),
            height: Some(540.0),
            players,
            ..WorldPayload::default()
        }
    }

    #[test]
    fn room_update_seeds_placeholder_world() {
        let mut store = EntityStore::new();
        store.ingest(Ingest::RoomUpdate(room_with(vec![roster_player("a", 40.0, 0)])));

        let world = store.world().unwrap();
        assert_eq!(world.source, PositionSource::Placeholder);
        assert_eq!(world.extent(), Vec2::new(960.0, 540.0));
        assert!(world.monsters.is_empty());
        assert_eq!(store.player("a").unwrap().pos, Vec2::new(40.0, 40.0));
    }

    #[test]
    fn placeholder_uses_room_extent_when_sent() {
        let mut store = EntityStore::new();
        let mut room = room_with(vec![]);
        room.width = Some(2400.0);
        room.height = Some(1600.0);
        store.ingest(Ingest::RoomUpdate(room));
        assert_eq!(store.extent(), Vec2::new(2400.0, 1600.0));
    }

    #[test]
    fn world_positions_survive_later_room_updates() {
        let mut store = EntityStore::new();
        store.ingest(Ingest::RoomUpdate(room_with(vec![roster_player("a", 40.0, 1)])));
        store.ingest(Ingest::WorldSnapshot {
            world: world_with(vec![PlayerPayload {
                x: 300.0,
                y: 200.0,
                ..PlayerPayload::new("a")
            }]),
            header: None,
        });
        store.ingest(Ingest::RoomUpdate(room_with(vec![roster_player("a", 40.0, 7)])));

        let a = store.player("a").unwrap();
        assert_eq!(a.pos, Vec2::new(300.0, 200.0));
        assert_eq!(a.score, 7);
        assert_eq!(a.name, "name-a");
    }

    #[test]
    fn world_snapshot_replaces_collections_wholesale() {
        let mut store = EntityStore::new();
        let mut first = world_with(vec![]);
        first.monsters = vec![Monster {
            id: 1,
            kind: MonsterKind::Big,
            x: 1.0,
            y: 1.0,
            hp: 4.0,
            max_hp: 4.0,
            dir_x: 0.0,
            dir_y: 0.0,
        }];
        store.ingest(Ingest::WorldSnapshot {
            world: first,
            header: None,
        });
        assert_eq!(store.world().unwrap().monsters.len(), 1);

        store.ingest(Ingest::WorldSnapshot {
            world: world_with(vec![]),
            header: None,
        });
        assert!(store.world().unwrap().monsters.is_empty());
    }

    #[test]
    fn world_header_updates_round_context_not_roster() {
        let mut store = EntityStore::new();
        store.ingest(Ingest::RoomUpdate(room_with(vec![roster_player("a", 0.0, 3)])));
        let header = RoomPayload {
            status: RoomStatus::InRound,
            round_type: RoundType::Ice,
            current_round: 2,
            ..RoomPayload::default()
        };
        store.ingest(Ingest::WorldSnapshot {
            world: world_with(vec![PlayerPayload::new("a")]),
            header: Some(header),
        });

        let room = store.room().unwrap();
        assert_eq!(room.round_type, RoundType::Ice);
        assert_eq!(room.current_round, 2);
        assert_eq!(store.roster().len(), 1);
        assert_eq!(store.player("a").unwrap().score, 3);
    }

    #[test]
    fn missing_world_extent_keeps_previous() {
        let mut store = EntityStore::new();
        store.ingest(Ingest::WorldSnapshot {
            world: WorldPayload {
                width: Some(6000.0),
                height: Some(3600.0),
                ..WorldPayload::default()
            },
            header: None,
        });
        store.ingest(Ingest::WorldSnapshot {
            world: WorldPayload::default(),
            header: None,
        });
        assert_eq!(store.extent(), Vec2::new(6000.0, 3600.0));
    }

    #[test]
    fn light_needs_coordinates() {
        assert!(light_pickup(LightPayload::default()).is_none());
        let held = light_pickup(LightPayload {
            x: Some(10.0),
            y: Some(20.0),
            holder: "p2".into(),
        })
        .unwrap();
        assert_eq!(held.holder.as_deref(), Some("p2"));
        let free = light_pickup(LightPayload {
            x: Some(10.0),
            y: Some(20.0),
            holder: String::new(),
        })
        .unwrap();
        assert!(free.holder.is_none());
    }

    #[test]
    fn wire_values_are_sanitised() {
        let p = PlayerPayload {
            name: "   ".into(),
            color: "".into(),
            rings_left: 9,
            team: 4,
            x: f64::NAN,
            ..PlayerPayload::new("z")
        };
        let body = player_body(&p);
        assert_eq!(body.name, "Player");
        assert_eq!(body.color, PlayerColor::Gray);
        assert_eq!(body.rings_left, 3);
        assert_eq!(body.team, 1);
        assert_eq!(body.pos.x, 0.0);
    }

    #[test]
    fn ingest_is_idempotent_for_identical_messages() {
        let mut once = EntityStore::new();
        let mut many = EntityStore::new();
        let world = world_with(vec![roster_player("a", 12.0, 0)]);
        once.ingest(Ingest::WorldSnapshot {
            world: world.clone(),
            header: None,
        });
        for _ in 0..5 {
            many.ingest(Ingest::WorldSnapshot {
                world: world.clone(),
                header: None,
            });
        }
        assert_eq!(once.world(), many.world());
    }
}
