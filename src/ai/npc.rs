use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

use super::DecisionContext;
use crate::{
    actions::Action,
    ecs::EcsWorld,
    map::{
        DIRECTIONS, GameMap, RoomArea, RoomKind, chebyshev,
        pathing::{CostGrid, compute_path},
    },
};

const SMALL_TALK: [&str; 6] = [
    "Is it lunch yet?",
    "Did anyone else hear that?",
    "I should really call my mother.",
    "Where did I leave my badge?",
    "Quiet day today.",
    "Something smells off in here.",
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NpcState {
    pub target_tile: Option<Point>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReliefState {
    /// Restroom index into the map's rooms, once one is picked.
    pub room: Option<usize>,
    pub target: Option<Point>,
    /// Turns still to spend inside the restroom.
    pub remaining: u32,
}

impl ReliefState {
    pub fn new(duration: u32) -> Self {
        Self {
            room: None,
            target: None,
            remaining: duration,
        }
    }
}

/// A civilian's ordinary turn: chat, mutter, head for the scheduled room, or
/// mill about.
pub fn decide(state: &mut NpcState, actor: Entity, ctx: &mut DecisionContext) -> Vec<Action> {
    let Some(origin) = ctx.ecs.position(actor) else {
        return vec![Action::Wait { actor }];
    };

    if let Some((dx, dy)) = adjacent_actor(actor, origin, ctx) {
        if ctx.rng.range(0, 10) == 0 {
            return vec![Action::Bump { actor, dx, dy }];
        }
    }

    let mut intent = Vec::new();
    if ctx.rng.range(0, 10) == 0 && ctx.rng.range(0, 10) == 0 {
        let line = SMALL_TALK[ctx.rng.range(0, SMALL_TALK.len() as i32) as usize];
        intent.push(Action::Talk {
            actor,
            dx: 0,
            dy: 0,
            line: Some(line),
        });
    }

    follow_schedule(state, actor, origin, ctx);

    if let Some(target) = state.target_tile {
        let steps = walk_toward(actor, origin, target, ctx);
        if steps.is_empty() {
            state.target_tile = None;
        } else {
            intent.extend(steps);
            return intent;
        }
    }

    if ctx.rng.range(0, 2) == 0 {
        let (dx, dy) = DIRECTIONS[ctx.rng.range(0, DIRECTIONS.len() as i32) as usize];
        intent.push(Action::Movement { actor, dx, dy });
    } else {
        intent.push(Action::Wait { actor });
    }
    intent
}

/// Drop a reached target; inside the scheduled room there is nowhere to go,
/// outside it an idle NPC heads back in.
fn follow_schedule(state: &mut NpcState, actor: Entity, origin: Point, ctx: &mut DecisionContext) {
    if state.target_tile == Some(origin) {
        state.target_tile = None;
    }
    let map = ctx.map;
    let Some(room) = ctx
        .ecs
        .routine(actor)
        .and_then(|routine| routine.scheduled_room(ctx.hour))
        .and_then(|idx| map.rooms.get(idx))
    else {
        return;
    };
    if room.contains(origin) {
        state.target_tile = None;
    } else if state.target_tile.is_none() {
        state.target_tile = random_open_point(room, ctx);
    }
}

/// Head for an empty restroom and stay there until the timer runs out.
pub fn relieve(state: &mut ReliefState, actor: Entity, ctx: &mut DecisionContext) -> Vec<Action> {
    let wait = vec![Action::Wait { actor }];
    let Some(origin) = ctx.ecs.position(actor) else {
        return wait;
    };

    let map = ctx.map;
    let inside = state
        .room
        .and_then(|idx| map.rooms.get(idx))
        .is_some_and(|room| room.contains(origin));
    if inside {
        state.remaining = state.remaining.saturating_sub(1);
        return wait;
    }

    let stale = match state.room {
        Some(idx) => occupied_by_other(map, ctx.ecs, idx, actor),
        None => true,
    };
    if stale {
        state.room = free_restroom(map, ctx.ecs, actor, origin);
        state.target = None;
    }
    let Some(room) = state.room.and_then(|idx| map.rooms.get(idx)) else {
        return wait;
    };
    if state.target.is_none() {
        state.target = random_open_point(room, ctx);
    }
    let Some(target) = state.target else {
        return wait;
    };

    let steps = walk_toward(actor, origin, target, ctx);
    if steps.is_empty() {
        state.target = None;
        return wait;
    }
    steps
}

/// Whether a relieving NPC still has somewhere to go: its picked restroom is
/// still free, or another one is.
pub(crate) fn restroom_reachable(
    state: &ReliefState,
    map: &GameMap,
    ecs: &EcsWorld,
    actor: Entity,
) -> bool {
    let Some(origin) = ecs.position(actor) else {
        return false;
    };
    let kept = state
        .room
        .is_some_and(|idx| !occupied_by_other(map, ecs, idx, actor));
    kept || free_restroom(map, ecs, actor, origin).is_some()
}

fn adjacent_actor(actor: Entity, origin: Point, ctx: &DecisionContext) -> Option<(i32, i32)> {
    DIRECTIONS.into_iter().find(|(dx, dy)| {
        let point = Point::new(origin.x + dx, origin.y + dy);
        ctx.map
            .actor_at(ctx.ecs, point)
            .is_some_and(|other| other != actor)
    })
}

/// Up to `move_speed` bumps along the path, stopping short of anything in the
/// way.
fn walk_toward(actor: Entity, origin: Point, target: Point, ctx: &DecisionContext) -> Vec<Action> {
    let grid = CostGrid::for_route(ctx.map, ctx.ecs, target, false, ctx.config.path_penalty);
    let speed = ctx.ecs.move_speed(actor).max(0) as usize;
    let mut steps = Vec::new();
    let mut cursor = origin;
    for step in compute_path(origin, target, &grid).into_iter().take(speed) {
        if !ctx.map.tile_is_walkable(ctx.ecs, step) {
            break;
        }
        steps.push(Action::Bump {
            actor,
            dx: step.x - cursor.x,
            dy: step.y - cursor.y,
        });
        cursor = step;
    }
    steps
}

fn random_open_point(room: &RoomArea, ctx: &mut DecisionContext) -> Option<Point> {
    let open: Vec<Point> = room
        .points()
        .into_iter()
        .filter(|point| ctx.map.terrain_walkable(*point))
        .collect();
    if open.is_empty() {
        return None;
    }
    Some(open[ctx.rng.range(0, open.len() as i32) as usize])
}

fn occupied_by_other(map: &GameMap, ecs: &EcsWorld, room_idx: usize, actor: Entity) -> bool {
    let Some(room) = map.rooms.get(room_idx) else {
        return true;
    };
    ecs.living_actors(map.floor).into_iter().any(|other| {
        other != actor && ecs.position(other).is_some_and(|point| room.contains(point))
    })
}

/// Nearest unoccupied restroom, measured to its center.
pub(crate) fn free_restroom(
    map: &GameMap,
    ecs: &EcsWorld,
    actor: Entity,
    origin: Point,
) -> Option<usize> {
    map.rooms
        .iter()
        .enumerate()
        .filter(|(idx, room)| {
            room.kind == RoomKind::Restroom && !occupied_by_other(map, ecs, *idx, actor)
        })
        .min_by_key(|(_, room)| chebyshev(origin, room.center()))
        .map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ai::tests::context,
        config::GameConfig,
        data::monsters::MonsterTemplate,
        ecs::{EcsWorld, components::Routine},
        map::{FloorId, GameMap, tests::room_map},
    };
    use bracket_geometry::prelude::Rect;
    use bracket_random::prelude::RandomNumberGenerator;

    fn office() -> GameMap {
        let mut map = room_map(30, 12, 1, 1, 28, 10);
        map.rooms.push(RoomArea {
            name: "Quarters".to_string(),
            kind: RoomKind::Quarters,
            interior: Rect::with_exact(20, 2, 25, 7),
        });
        map.rooms.push(RoomArea {
            name: "Restroom".to_string(),
            kind: RoomKind::Restroom,
            interior: Rect::with_exact(2, 6, 6, 10),
        });
        map
    }

    fn civilian(map: &GameMap, ecs: &mut EcsWorld, at: Point, schedule: Vec<(u32, usize)>) -> Entity {
        let mut rng = RandomNumberGenerator::seeded(3);
        let npc = ecs.spawn_monster(&MonsterTemplate::civilian(), at, map, &mut rng);
        ecs.set_routine(
            npc,
            Routine {
                schedule,
                turns_since_relief: 0,
            },
        );
        npc
    }

    #[test]
    fn reached_target_is_cleared() {
        let map = office();
        let mut ecs = EcsWorld::new(Point::new(27, 10), FloorId(1));
        let npc = civilian(&map, &mut ecs, Point::new(10, 3), Vec::new());
        let config = GameConfig::default();

        for seed in 0..20 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let mut state = NpcState {
                target_tile: Some(Point::new(10, 3)),
            };
            let mut ctx = context(&map, &ecs, &config, &mut rng);
            decide(&mut state, npc, &mut ctx);
            assert_eq!(state.target_tile, None, "seed {seed}");
        }
    }

    #[test]
    fn entering_the_scheduled_room_clears_the_target() {
        let map = office();
        let mut ecs = EcsWorld::new(Point::new(27, 10), FloorId(1));
        let npc = civilian(&map, &mut ecs, Point::new(21, 3), vec![(8, 0), (22, 0)]);
        let config = GameConfig::default();
        let mut rng = RandomNumberGenerator::seeded(8);

        let mut state = NpcState {
            target_tile: Some(Point::new(24, 6)),
        };
        let mut ctx = context(&map, &ecs, &config, &mut rng);
        decide(&mut state, npc, &mut ctx);
        assert_eq!(state.target_tile, None);
    }

    #[test]
    fn outside_the_room_heads_back_in() {
        let map = office();
        let mut ecs = EcsWorld::new(Point::new(27, 10), FloorId(1));
        let npc = civilian(&map, &mut ecs, Point::new(10, 4), vec![(8, 0), (22, 0)]);
        let config = GameConfig::default();

        // No adjacent actors, so only the ambient roll can prepend a line.
        for seed in 0..10 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let mut state = NpcState::default();
            let mut ctx = context(&map, &ecs, &config, &mut rng);
            let intent = decide(&mut state, npc, &mut ctx);
            let target = state.target_tile.expect("bound for the scheduled room");
            assert!(map.rooms[0].contains(target));
            let last = intent.last().expect("non-empty intent");
            assert!(matches!(last, Action::Bump { dx: 1, .. }), "seed {seed}: {last:?}");
        }
    }

    #[test]
    fn relief_walks_to_the_restroom_then_counts_down() {
        let map = office();
        let mut ecs = EcsWorld::new(Point::new(27, 10), FloorId(1));
        let npc = civilian(&map, &mut ecs, Point::new(12, 3), Vec::new());
        let config = GameConfig::default();
        let mut rng = RandomNumberGenerator::seeded(5);

        let mut state = ReliefState::new(10);
        {
            let mut ctx = context(&map, &ecs, &config, &mut rng);
            let intent = relieve(&mut state, npc, &mut ctx);
            assert_eq!(state.room, Some(1));
            assert!(matches!(intent.as_slice(), [Action::Bump { dx: -1, .. }]));
            assert_eq!(state.remaining, 10);
        }

        ecs.set_position(npc, Point::new(3, 7));
        let mut ctx = context(&map, &ecs, &config, &mut rng);
        assert_eq!(relieve(&mut state, npc, &mut ctx), vec![Action::Wait { actor: npc }]);
        assert_eq!(state.remaining, 9);
    }

    #[test]
    fn occupied_restroom_is_skipped() {
        let map = office();
        let mut ecs = EcsWorld::new(Point::new(4, 8), FloorId(1));
        let npc = civilian(&map, &mut ecs, Point::new(12, 3), Vec::new());
        let config = GameConfig::default();
        let mut rng = RandomNumberGenerator::seeded(5);

        let mut state = ReliefState::new(10);
        let mut ctx = context(&map, &ecs, &config, &mut rng);
        assert_eq!(relieve(&mut state, npc, &mut ctx), vec![Action::Wait { actor: npc }]);
        assert_eq!(state.room, None);
        assert_eq!(state.remaining, 10);
    }
}
