//! Floor generation: lay out the tiles, then decide what stands on them.
//!
//! Generation never touches the entity world. It hands back a
//! [`FloorLayout`] whose spawn requests the engine turns into entities.

pub mod maze;
pub mod rooms;

use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use tracing::info;

use crate::{
    config::{GameConfig, GenerationConfig},
    data::{floor_params, items::ItemTemplate, monsters::MonsterTemplate, tiles::tiles},
    error::GenerationError,
    map::{FloorId, GameMap, chebyshev},
};

use self::rooms::{RoomPlan, generate_room_layout};

#[derive(Clone, Debug)]
pub enum SpawnRequest {
    Monster {
        template: MonsterTemplate,
        point: Point,
    },
    Item {
        template: ItemTemplate,
        point: Point,
    },
}

impl SpawnRequest {
    pub fn point(&self) -> Point {
        match self {
            SpawnRequest::Monster { point, .. } | SpawnRequest::Item { point, .. } => *point,
        }
    }
}

#[derive(Debug)]
pub struct FloorLayout {
    pub map: GameMap,
    pub player_start: Point,
    pub spawns: Vec<SpawnRequest>,
}

/// Fisher-Yates, driven by the game's RNG so seeds stay reproducible.
pub(crate) fn shuffle<T>(items: &mut [T], rng: &mut RandomNumberGenerator) {
    for i in (1..items.len()).rev() {
        let j = rng.range(0, i as i32 + 1) as usize;
        items.swap(i, j);
    }
}

/// Generate floor number `floor`: a maze on the configured maze floors,
/// rooms everywhere else, then chunked population.
pub fn generate_floor(
    config: &GameConfig,
    floor: u32,
    rng: &mut RandomNumberGenerator,
) -> Result<FloorLayout, GenerationError> {
    let settings = &config.generation;
    let id = FloorId(floor);
    let (map, player_start) = if settings.maze_floors.contains(&floor) {
        maze::generate_maze(config.map_width, config.map_height, id, settings, rng)?
    } else {
        let params = floor_params(floor);
        let plan = RoomPlan {
            room_target: rng.range(params.room_count.0, params.room_count.1 + 1),
            size: params.room_size,
            chained: params.chained,
            first_room_at: None,
        };
        let layout =
            generate_room_layout(config.map_width, config.map_height, id, &plan, settings, rng)?;
        (layout.map, layout.player_start)
    };

    let spawns = populate(&map, player_start, floor, settings, rng);
    info!(
        floor,
        rooms = map.rooms.len(),
        spawns = spawns.len(),
        "floor generated"
    );
    Ok(FloorLayout {
        map,
        player_start,
        spawns,
    })
}

/// Walk the map in square chunks and give each chunk one monster attempt and
/// one item attempt. Each attempt looks at a single random cell and gives up
/// if it is unsuitable, so sparse chunks mostly stay empty.
pub fn populate(
    map: &GameMap,
    player_start: Point,
    floor: u32,
    settings: &GenerationConfig,
    rng: &mut RandomNumberGenerator,
) -> Vec<SpawnRequest> {
    let monsters = MonsterTemplate::for_floor(floor);
    let items = ItemTemplate::all();
    let step = settings.chunk_size.max(1) as usize;

    let mut taken: HashSet<(i32, i32)> = HashSet::new();
    taken.insert((player_start.x, player_start.y));
    let mut item_cells: HashSet<(i32, i32)> = HashSet::new();
    let mut spawns = Vec::new();

    for cx in (0..map.width).step_by(step) {
        for cy in (0..map.height).step_by(step) {
            let chunk: Vec<Point> = (cx..(cx + step as i32).min(map.width))
                .flat_map(|x| (cy..(cy + step as i32).min(map.height)).map(move |y| Point::new(x, y)))
                .collect();

            let mut candidates = chunk.clone();
            shuffle(&mut candidates, rng);
            if let Some(&point) = candidates.first() {
                let key = (point.x, point.y);
                let rejected = map.tile_name(point) != "floor"
                    || taken.contains(&key)
                    || item_cells.contains(&key)
                    || chebyshev(map.upstairs, point) < settings.spawn_exclusion_radius;
                if !rejected && !monsters.is_empty() {
                    let template = monsters[rng.range(0, monsters.len() as i32) as usize].clone();
                    taken.insert(key);
                    spawns.push(SpawnRequest::Monster { template, point });
                }
            }

            let mut floor_cells: Vec<Point> = chunk
                .into_iter()
                .filter(|point| map.tile_name(*point) == "floor")
                .collect();
            shuffle(&mut floor_cells, rng);
            if let Some(&point) = floor_cells.first() {
                let key = (point.x, point.y);
                let rejected = map.tile_at(point) == Some(tiles().down_stairs)
                    || point == player_start
                    || item_cells.contains(&key);
                if rejected || rng.range(0.0_f64, 1.0) < settings.item_reject_chance {
                    continue;
                }
                let template = items[rng.range(0, items.len() as i32) as usize].clone();
                item_cells.insert(key);
                spawns.push(SpawnRequest::Item { template, point });
            }
        }
    }
    spawns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tests::room_map;

    #[test]
    fn shuffle_keeps_every_element() {
        let mut rng = RandomNumberGenerator::seeded(5);
        let mut values: Vec<i32> = (0..20).collect();
        shuffle(&mut values, &mut rng);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn monsters_keep_clear_of_the_upstairs() {
        let mut map = room_map(40, 40, 1, 1, 38, 38);
        map.upstairs = Point::new(5, 5);
        let settings = GenerationConfig {
            item_reject_chance: 1.0,
            ..GenerationConfig::default()
        };
        for seed in 0..5 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let spawns = populate(&map, map.upstairs, 2, &settings, &mut rng);
            assert!(!spawns.is_empty());
            for spawn in &spawns {
                let SpawnRequest::Monster { point, .. } = spawn else {
                    panic!("items are gated off: {spawn:?}");
                };
                assert!(chebyshev(map.upstairs, *point) >= 10);
                assert_eq!(map.tile_name(*point), "floor");
            }
        }
    }

    #[test]
    fn at_most_one_monster_and_item_per_chunk() {
        let mut map = room_map(36, 36, 1, 1, 34, 34);
        map.upstairs = Point::new(2, 2);
        let settings = GenerationConfig {
            item_reject_chance: 0.0,
            spawn_exclusion_radius: 0,
            ..GenerationConfig::default()
        };
        let mut rng = RandomNumberGenerator::seeded(8);
        // Start the player inside a wall so no chunk loses its item to it.
        let spawns = populate(&map, Point::new(0, 0), 1, &settings, &mut rng);

        let mut monsters = HashSet::new();
        let mut items = HashSet::new();
        for spawn in &spawns {
            let point = spawn.point();
            let chunk = (point.x / 6, point.y / 6);
            let fresh = match spawn {
                SpawnRequest::Monster { .. } => monsters.insert(chunk),
                SpawnRequest::Item { .. } => items.insert(chunk),
            };
            assert!(fresh, "two spawns of a kind in chunk {chunk:?}");
        }
        // With the gate open every chunk with floor gets an item.
        assert_eq!(items.len(), 36);
    }

    #[test]
    fn walls_never_spawn_anything() {
        let map = GameMap::new(30, 30, FloorId(1));
        let settings = GenerationConfig {
            item_reject_chance: 0.0,
            spawn_exclusion_radius: 0,
            ..GenerationConfig::default()
        };
        let mut rng = RandomNumberGenerator::seeded(2);
        assert!(populate(&map, Point::new(0, 0), 1, &settings, &mut rng).is_empty());
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let config = GameConfig::default();
        let mut a = RandomNumberGenerator::seeded(77);
        let mut b = RandomNumberGenerator::seeded(77);
        let first = generate_floor(&config, 1, &mut a).unwrap();
        let second = generate_floor(&config, 1, &mut b).unwrap();
        assert_eq!(first.player_start, second.player_start);
        assert_eq!(first.map.downstairs, second.map.downstairs);
        assert_eq!(first.spawns.len(), second.spawns.len());
        assert!(first.map.terrain_walkable(first.player_start));
    }

    #[test]
    fn maze_floor_has_no_rooms() {
        let config = GameConfig::default();
        let mut rng = RandomNumberGenerator::seeded(6);
        let layout = generate_floor(&config, 6, &mut rng).unwrap();
        assert!(layout.map.rooms.is_empty());
        assert_eq!(layout.map.floor, FloorId(6));
        assert_eq!(layout.player_start, layout.map.upstairs);
    }
}
