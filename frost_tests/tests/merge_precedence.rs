//! Room/world channel precedence across arbitrary interleavings.

use frost_client::{EntityStore, Ingest};
use frost_shared::{
    math::Vec2,
    net::RoomPayload,
    round::{RoomStatus, RoundType},
};
use frost_tests::{player_ids, room, roster_player, world, world_player};

fn roster_room(ids: &[String], score: i64) -> RoomPayload {
    let players = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let mut p = roster_player(id, 10.0 * i as f64, 10.0);
            p.score = score;
            p
        })
        .collect();
    room(RoomStatus::InRound, RoundType::Survival, players)
}

fn world_tick(ids: &[String], step: f64) -> frost_shared::net::WorldPayload {
    let players = ids
        .iter()
        .enumerate()
        .map(|(i, id)| world_player(id, 100.0 + step + i as f64, 200.0 + step))
        .collect();
    world(960.0, 540.0, players)
}

#[test]
fn eight_players_world_positions_win() {
    let ids = player_ids(8);
    let mut store = EntityStore::new();

    store.ingest(Ingest::RoomUpdate(roster_room(&ids, 0)));
    assert!(!store.has_world_positions());
    assert_eq!(store.players().count(), 8);

    store.ingest(Ingest::WorldSnapshot {
        world: world_tick(&ids, 50.0),
        header: None,
    });
    for (i, id) in ids.iter().enumerate() {
        let p = store.player(id).expect("player present");
        assert_eq!(p.pos, Vec2::new(150.0 + i as f64, 250.0));
        assert_eq!(p.name, format!("Name-{id}"));
    }

    // A stale room update arrives after the world tick: scores change,
    // positions must not move back to the roster's spawn points.
    store.ingest(Ingest::RoomUpdate(roster_room(&ids, 5)));
    for (i, id) in ids.iter().enumerate() {
        let p = store.player(id).expect("player present");
        assert_eq!(p.pos, Vec2::new(150.0 + i as f64, 250.0));
        assert_eq!(p.score, 5);
    }
}

#[test]
fn final_state_depends_only_on_last_message_per_channel() {
    let ids = player_ids(8);
    let rooms = [roster_room(&ids, 1), roster_room(&ids, 2), roster_room(&ids, 3)];
    let worlds = [world_tick(&ids, 1.0), world_tick(&ids, 2.0), world_tick(&ids, 3.0)];

    // Every interleaving of the two ordered streams that starts with a world
    // tick ends in the same state.
    let orders: [&[u8]; 4] = [
        &[1, 0, 1, 0, 1, 0],
        &[1, 1, 1, 0, 0, 0],
        &[1, 0, 0, 0, 1, 1],
        &[1, 1, 0, 0, 1, 0],
    ];
    let mut snapshots = Vec::new();
    for order in orders {
        let mut store = EntityStore::new();
        let (mut r, mut w) = (0, 0);
        for &channel in order {
            if channel == 0 {
                store.ingest(Ingest::RoomUpdate(rooms[r].clone()));
                r += 1;
            } else {
                store.ingest(Ingest::WorldSnapshot {
                    world: worlds[w].clone(),
                    header: None,
                });
                w += 1;
            }
        }
        let view: Vec<(String, Vec2, i64)> = store
            .players()
            .map(|p| (p.id.to_string(), p.pos, p.score))
            .collect();
        snapshots.push(view);
    }
    assert!(snapshots.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(snapshots[0][0].1, Vec2::new(103.0, 203.0));
    assert_eq!(snapshots[0][0].2, 3);
}

#[test]
fn world_header_refreshes_room_but_not_roster() {
    let ids = player_ids(2);
    let mut store = EntityStore::new();
    store.ingest(Ingest::RoomUpdate(roster_room(&ids, 4)));

    let header = room(RoomStatus::BetweenRounds, RoundType::Maze, Vec::new());
    store.ingest(Ingest::WorldSnapshot {
        world: world_tick(&ids, 0.0),
        header: Some(header),
    });

    let meta = store.room().expect("room meta");
    assert_eq!(meta.status, RoomStatus::BetweenRounds);
    assert_eq!(meta.round_type, RoundType::Maze);
    assert_eq!(store.roster().len(), 2);
    assert_eq!(store.player("p1").map(|p| p.score), Some(4));
}

#[test]
fn players_missing_from_world_disappear() {
    let ids = player_ids(3);
    let mut store = EntityStore::new();
    store.ingest(Ingest::RoomUpdate(roster_room(&ids, 0)));
    store.ingest(Ingest::WorldSnapshot {
        world: world_tick(&ids[..2], 0.0),
        header: None,
    });
    assert_eq!(store.players().count(), 2);
    assert!(store.player("p2").is_none());
    // Still on the roster.
    assert!(store.roster_entry("p2").is_some());
}
