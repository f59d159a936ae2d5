//! End-to-end checks: building levels from a source description and
//! walking the result.

use proptest::prelude::*;

use qd_core::collectibles::factory::DrawStrategy;
use qd_core::dungeon::{RoomKind, Visibility};
use qd_core::events::MemoryEventStore;
use qd_core::generator::source::{
    CollectibleDef, DoorDef, HallwayDef, LayoutDef, LayoutRoomRow, LevelSource, MessageDef,
    MessageDescriptor, PoolSelector, RewardPoolDef, RewardPoolSection, RiddleDescriptor,
    RewardSource, RobotDef, RoomDef, ShopDescriptor, StvPoolDef, StvPoolSection, StvSource,
};
use qd_core::logic::Amplitude;
use qd_core::navigation::{Coordinate, Direction};
use qd_core::tiles::Tile;
use qd_core::LevelGenerator;

/// A 2x2 level: spawn and arena on top, vault and market below.
fn sample_source() -> LevelSource {
    LevelSource {
        name: "sample".to_string(),
        robot: RobotDef {
            num_qubits: 2,
            gates: vec!["h".to_string(), "cx".to_string()],
        },
        messages: vec![MessageDef {
            id: "welcome".to_string(),
            speaker: None,
            text: "Mind the decoherence.".to_string(),
            event_condition: None,
            alt_message: None,
        }],
        reward_pools: RewardPoolSection {
            pools: vec![RewardPoolDef {
                id: "loot".to_string(),
                strategy: DrawStrategy::Random,
                collectibles: vec![
                    CollectibleDef::Coin(2),
                    CollectibleDef::Key(1),
                    CollectibleDef::Health(1),
                ],
            }],
            default: PoolSelector {
                id: "loot".to_string(),
                ordered: false,
            },
        },
        stv_pools: StvPoolSection {
            pools: vec![StvPoolDef {
                id: "easy".to_string(),
                ordered: false,
                states: vec![
                    vec![
                        Amplitude::ONE,
                        Amplitude::ZERO,
                        Amplitude::ZERO,
                        Amplitude::ZERO,
                    ],
                    vec![
                        Amplitude::ZERO,
                        Amplitude::ONE,
                        Amplitude::ZERO,
                        Amplitude::ZERO,
                    ],
                ],
                reward_pool: None,
            }],
            default: PoolSelector {
                id: "easy".to_string(),
                ordered: false,
            },
        },
        hallways: vec![
            HallwayDef {
                id: "he".to_string(),
                door: DoorDef::default(),
            },
            HallwayDef {
                id: "hv".to_string(),
                door: DoorDef {
                    direction: Direction::South,
                    ..DoorDef::default()
                },
            },
            HallwayDef {
                id: "hb".to_string(),
                door: DoorDef::default(),
            },
        ],
        rooms: vec![
            RoomDef {
                id: "start".to_string(),
                kind: RoomKind::Spawn,
                rows: vec!["_____".to_string(); 5],
                ..RoomDef::default()
            },
            RoomDef {
                id: "arena".to_string(),
                kind: RoomKind::Wild,
                rows: vec![
                    "_2_2_".to_string(),
                    "_____".to_string(),
                    "__0__".to_string(),
                    "_____".to_string(),
                    "_c_e_".to_string(),
                ],
                ..RoomDef::default()
            },
            RoomDef {
                id: "vault".to_string(),
                kind: RoomKind::Riddle,
                rows: vec![
                    "r_m__".to_string(),
                    "_____".to_string(),
                    "_____".to_string(),
                    "_____".to_string(),
                    "_____".to_string(),
                ],
                riddles: vec![RiddleDescriptor {
                    target: StvSource::Explicit(vec![Amplitude::ONE, Amplitude::ZERO]),
                    reward: RewardSource::Explicit(CollectibleDef::Key(2)),
                    attempts: Some(3),
                }],
                messages: vec![MessageDescriptor {
                    id: "welcome".to_string(),
                    times: 1,
                }],
                ..RoomDef::default()
            },
            RoomDef {
                id: "market".to_string(),
                kind: RoomKind::Shop,
                rows: vec![
                    "_____".to_string(),
                    "_____".to_string(),
                    "__$__".to_string(),
                    "_____".to_string(),
                    "_____".to_string(),
                ],
                shops: vec![ShopDescriptor {
                    pool: Some("loot".to_string()),
                    num_items: 2,
                }],
                ..RoomDef::default()
            },
        ],
        layout: LayoutDef {
            room_rows: vec![
                LayoutRoomRow {
                    rooms: vec![Some("start".to_string()), Some("arena".to_string())],
                    connectors: vec![Some("he".to_string())],
                },
                LayoutRoomRow {
                    rooms: vec![Some("vault".to_string()), Some("market".to_string())],
                    connectors: vec![Some("hb".to_string())],
                },
            ],
            hallway_rows: vec![vec![Some("hv".to_string()), None]],
        },
    }
}

#[test]
fn test_generation_is_deterministic() {
    let source = sample_source();
    let first = LevelGenerator::new(1234, false)
        .generate_from_source(&source)
        .unwrap();
    let second = LevelGenerator::new(1234, false)
        .generate_from_source(&source)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sample_builds_without_warnings() {
    let map = LevelGenerator::new(7, false)
        .generate_from_source(&sample_source())
        .unwrap();
    assert!(map.warnings().is_empty(), "{:?}", map.warnings());
    assert_eq!(map.hallways().len(), 3);
}

#[test]
fn test_hallway_room_links_are_mutual() {
    let map = LevelGenerator::new(3, false)
        .generate_from_source(&sample_source())
        .unwrap();

    for (idx, hallway) in map.hallways().iter().enumerate() {
        let first = hallway.room(true).expect("first side connected");
        let second = hallway.room(false).expect("second side connected");
        let (first_dir, second_dir) = if hallway.connects_horizontally() {
            (Direction::East, Direction::West)
        } else {
            (Direction::South, Direction::North)
        };
        assert_eq!(
            map.room_at(first).expect("first room").hallway(first_dir),
            Some(idx)
        );
        assert_eq!(
            map.room_at(second).expect("second room").hallway(second_dir),
            Some(idx)
        );
    }
}

#[test]
fn test_descriptor_driven_tiles() {
    let map = LevelGenerator::new(21, false)
        .generate_from_source(&sample_source())
        .unwrap();

    let vault = map.room_at(Coordinate::new(0, 1)).unwrap();
    match vault.area().tile(1, 1) {
        Some(Tile::Riddler { riddle, .. }) => {
            assert_eq!(riddle.attempts(), 3);
            assert!(riddle.is_active());
        }
        other => panic!("expected a riddler, found {other:?}"),
    }
    match vault.area().tile(3, 1) {
        Some(Tile::Message { times, .. }) => assert_eq!(*times, 1),
        other => panic!("expected a message tile, found {other:?}"),
    }

    let market = map.room_at(Coordinate::new(1, 1)).unwrap();
    match market.area().tile(3, 3) {
        Some(Tile::ShopKeeper { inventory, .. }) => assert_eq!(inventory.len(), 2),
        other => panic!("expected a shopkeeper, found {other:?}"),
    }
}

#[test]
fn test_walks_are_reproducible() {
    let source = sample_source();
    let moves = [
        Direction::East,
        Direction::East,
        Direction::East,
        Direction::South,
        Direction::East,
        Direction::South,
        Direction::South,
        Direction::West,
        Direction::South,
    ];

    let run = || {
        let mut map = LevelGenerator::new(99, false)
            .generate_from_source(&source)
            .unwrap();
        let mut store = MemoryEventStore::new();
        let mut accepted = Vec::new();
        for direction in moves {
            accepted.push(map.move_player(direction, &mut store));
        }
        let events = map.take_events();
        (map, accepted, events)
    };

    let (map_a, accepted_a, events_a) = run();
    let (map_b, accepted_b, events_b) = run();
    assert_eq!(accepted_a, accepted_b);
    assert_eq!(events_a, events_b);
    assert_eq!(map_a, map_b);
}

fn visibility_rank(visibility: Visibility) -> u8 {
    match visibility {
        Visibility::Void => 0,
        Visibility::InSight => 1,
        Visibility::Visible => 2,
    }
}

proptest! {
    // Fog of war only ever lifts: no walk sequence may decrease any
    // area's visibility.
    #[test]
    fn test_visibility_is_monotonic(steps in prop::collection::vec(0usize..4, 0..60)) {
        let mut map = LevelGenerator::new(5, false)
            .generate_from_source(&sample_source())
            .unwrap();
        let mut store = MemoryEventStore::new();

        let snapshot = |map: &qd_core::LevelMap| -> Vec<u8> {
            let mut ranks = Vec::new();
            for y in 0..2 {
                for x in 0..2 {
                    if let Some(room) = map.room_at(Coordinate::new(x, y)) {
                        ranks.push(visibility_rank(room.area().visibility()));
                    }
                }
            }
            for hallway in map.hallways() {
                ranks.push(visibility_rank(hallway.area().visibility()));
            }
            ranks
        };

        let mut before = snapshot(&map);
        for step in steps {
            let direction = Direction::CARDINALS[step];
            map.move_player(direction, &mut store);
            let after = snapshot(&map);
            for (b, a) in before.iter().zip(after.iter()) {
                prop_assert!(a >= b, "visibility dropped from {b} to {a}");
            }
            before = after;
        }
    }
}
