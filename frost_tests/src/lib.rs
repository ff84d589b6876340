//! Shared fixtures for the integration tests.

use frost_shared::{
    net::{Envelope, PlayerPayload, RoomPayload, ServerEvent, SessionId, WorldPayload},
    round::{RoomStatus, RoundType},
};

/// Recorded demo session, same file the headless client plays by default.
pub const DEMO_REPLAY: &str = include_str!("../../demos/session.jsonl");

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Ids `p0..pN`.
pub fn player_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("p{i}")).collect()
}

/// Roster entry with a name derived from its id and a spawn position.
pub fn roster_player(id: &str, x: f64, y: f64) -> PlayerPayload {
    PlayerPayload {
        name: format!("Name-{id}"),
        color: "blue".into(),
        x,
        y,
        ..PlayerPayload::new(id)
    }
}

/// World-channel player record.
pub fn world_player(id: &str, x: f64, y: f64) -> PlayerPayload {
    PlayerPayload {
        x,
        y,
        moving: true,
        ..PlayerPayload::new(id)
    }
}

pub fn room(status: RoomStatus, round_type: RoundType, players: Vec<PlayerPayload>) -> RoomPayload {
    RoomPayload {
        code: "TEST".into(),
        status,
        round_type,
        max_rounds: 3,
        players,
        ..RoomPayload::default()
    }
}

pub fn world(width: f64, height: f64, players: Vec<PlayerPayload>) -> WorldPayload {
    WorldPayload {
        width: Some(width),
        height: Some(height),
        players,
        ..WorldPayload::default()
    }
}

pub fn joined(session: u64, room: RoomPayload, you: &str) -> Envelope {
    Envelope::new(
        SessionId(session),
        ServerEvent::RoomJoined {
            room,
            you_id: you.to_string(),
        },
    )
}

pub fn room_update(session: u64, room: RoomPayload) -> Envelope {
    Envelope::new(SessionId(session), ServerEvent::RoomUpdate { room })
}

pub fn world_state(session: u64, world: WorldPayload) -> Envelope {
    Envelope::new(SessionId(session), ServerEvent::WorldState { room: None, world })
}
