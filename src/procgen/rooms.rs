//! Room-and-corridor floors.
//!
//! Rooms are grown outward from a door on an existing room's wall, one cell at
//! a time, until they reach their target area or run out of room. Neighbours
//! share a wall and the door is punched through it.

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use tracing::{debug, warn};

use super::shuffle;
use crate::{
    config::GenerationConfig,
    data::tiles::tiles,
    error::GenerationError,
    map::{FloorId, GameMap, RoomArea, RoomKind},
};

/// A room under construction. Walls run along `x1..=x2` and `y1..=y2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub x1: i32,
    pub x2: i32,
    pub y1: i32,
    pub y2: i32,
    pub door: Point,
    pub door2: Option<Point>,
    pub target_area: i32,
}

impl Room {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    pub fn has_tile(&self, point: Point) -> bool {
        (self.x1..=self.x2).contains(&point.x) && (self.y1..=self.y2).contains(&point.y)
    }

    fn is_corner(&self, point: Point) -> bool {
        (point.x == self.x1 || point.x == self.x2) && (point.y == self.y1 || point.y == self.y2)
    }

    /// Big enough, grown to its target, and reachable through a wall rather
    /// than a corner.
    pub fn is_valid(&self) -> bool {
        self.width() >= 5
            && self.height() >= 5
            && self.area() >= self.target_area
            && !self.is_corner(self.door)
    }

    /// Floor cells inside the walls.
    pub fn interior(&self) -> Rect {
        Rect::with_exact(self.x1 + 1, self.y1 + 1, self.x2, self.y2)
    }

    fn overlaps(&self, x1: i32, x2: i32, y1: i32, y2: i32) -> bool {
        x1 < self.x2 && x2 > self.x1 && y1 < self.y2 && y2 > self.y1
    }

    /// Grow a room outward from `door`. It never grows back against
    /// `direction` or into `placed`, and stays inside `bounds`.
    fn grow(
        door: Point,
        direction: (i32, i32),
        door2: Option<Point>,
        bounds: (i32, i32),
        size: (i32, i32),
        placed: &[Room],
        rng: &mut RandomNumberGenerator,
    ) -> Self {
        let side = rng.range(size.0, size.1 + 1);
        let mut room = Room {
            x1: door.x,
            x2: door.x,
            y1: door.y,
            y2: door.y,
            door,
            door2,
            target_area: side * side,
        };
        let (width, height) = bounds;

        while room.area() < room.target_area {
            let mut growths = Vec::with_capacity(4);
            for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
                if (dx + direction.0, dy + direction.1) == (0, 0)
                    || (dx < 0 && room.x1 < 1)
                    || (dx > 0 && room.x2 >= width - 1)
                    || (dy < 0 && room.y1 < 1)
                    || (dy > 0 && room.y2 >= height - 1)
                {
                    continue;
                }
                let x1 = room.x1 + dx.min(0);
                let x2 = room.x2 + dx.max(0);
                let y1 = room.y1 + dy.min(0);
                let y2 = room.y2 + dy.max(0);
                if placed.iter().any(|other| other.overlaps(x1, x2, y1, y2)) {
                    continue;
                }
                growths.push((x1, x2, y1, y2));
            }
            if growths.is_empty() {
                break;
            }
            let (x1, x2, y1, y2) = growths[rng.range(0, growths.len() as i32) as usize];
            room.x1 = x1;
            room.x2 = x2;
            room.y1 = y1;
            room.y2 = y2;
        }
        room
    }
}

/// Layout knobs for one floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomPlan {
    pub room_target: u32,
    /// Inclusive side-length range; the target area is the square of a draw.
    pub size: (i32, i32),
    /// Grow every room off the previous one instead of a random one.
    pub chained: bool,
    /// Grow the first room around this cell instead of a random one; it ends
    /// up inside the room's walls.
    pub first_room_at: Option<Point>,
}

#[derive(Debug)]
pub struct RoomLayout {
    pub map: GameMap,
    pub rooms: Vec<Room>,
    pub player_start: Point,
    /// Whole layouts thrown away before this one converged.
    pub restarts: u32,
}

pub fn generate_room_layout(
    width: i32,
    height: i32,
    floor: FloorId,
    plan: &RoomPlan,
    settings: &GenerationConfig,
    rng: &mut RandomNumberGenerator,
) -> Result<RoomLayout, GenerationError> {
    if width < 12 || height < 12 {
        return Err(GenerationError::MapTooSmall {
            width,
            height,
            what: "a room layout",
        });
    }
    if let Some(anchor) = plan.first_room_at {
        if anchor.x < 1 || anchor.x >= width - 1 || anchor.y < 1 || anchor.y >= height - 1 {
            return Err(GenerationError::AnchorOutOfBounds {
                x: anchor.x,
                y: anchor.y,
                width,
                height,
            });
        }
    }

    for restart in 0..=settings.max_restarts {
        if let Some((mut map, rooms)) = try_layout(width, height, floor, plan, settings, rng) {
            let player_start = finish(&mut map, &rooms);
            debug!(floor = floor.0, rooms = rooms.len(), restart, "room layout placed");
            return Ok(RoomLayout {
                map,
                rooms,
                player_start,
                restarts: restart,
            });
        }
        warn!(floor = floor.0, restart, "room layout ran out of attempts; starting over");
    }
    Err(GenerationError::RestartsExhausted {
        floor: floor.0,
        restarts: settings.max_restarts,
    })
}

/// One pass at placing `plan.room_target` rooms; `None` when the attempt cap
/// runs out first.
fn try_layout(
    width: i32,
    height: i32,
    floor: FloorId,
    plan: &RoomPlan,
    settings: &GenerationConfig,
    rng: &mut RandomNumberGenerator,
) -> Option<(GameMap, Vec<Room>)> {
    let mut map = GameMap::new(width, height, floor);
    let mut rooms: Vec<Room> = Vec::new();
    let target = plan.room_target as usize;
    let mut attempts = 0;

    while rooms.len() < target && attempts < settings.max_attempts {
        attempts += 1;

        let (door, direction, door2) = if rooms.is_empty() {
            let door = plan.first_room_at.unwrap_or_else(|| {
                Point::new(rng.range(2, width - 2), rng.range(2, height - 2))
            });
            (door, (0, 0), None)
        } else {
            let anchor = if plan.chained {
                &rooms[rooms.len() - 1]
            } else {
                &rooms[rng.range(0, rooms.len() as i32) as usize]
            };
            pick_doors(anchor, rng)
        };

        let room = Room::grow(door, direction, door2, (width, height), plan.size, &rooms, rng);
        if !room.is_valid() {
            continue;
        }
        let misses_anchor = plan
            .first_room_at
            .is_some_and(|at| !room.interior().point_in_rect(at));
        if rooms.is_empty() && misses_anchor {
            continue;
        }

        let floor_tile = tiles().floor;
        let interior = room.interior();
        for y in interior.y1..interior.y2 {
            for x in interior.x1..interior.x2 {
                map.set_tile(Point::new(x, y), floor_tile);
            }
        }
        if !rooms.is_empty() {
            map.set_tile(room.door, floor_tile);
            if let Some(second) = room.door2.filter(|second| room.has_tile(*second)) {
                map.set_tile(second, floor_tile);
            }
        }
        rooms.push(room);
    }

    (rooms.len() >= target).then_some((map, rooms))
}

/// Two distinct cells on one wall of `anchor` (never its corners) and the
/// direction to grow away from it.
fn pick_doors(anchor: &Room, rng: &mut RandomNumberGenerator) -> (Point, (i32, i32), Option<Point>) {
    let horizontal_wall = rng.range(0, 2) == 0;
    let (low, high) = if horizontal_wall {
        (anchor.x1, anchor.x2)
    } else {
        (anchor.y1, anchor.y2)
    };
    let mut options: Vec<i32> = (low + 1..high - 1).collect();
    shuffle(&mut options, rng);
    let first = options.pop().unwrap_or(low + 1);
    let second = options.pop();

    if horizontal_wall {
        let top = rng.range(0, 2) == 0;
        let y = if top { anchor.y1 } else { anchor.y2 };
        let dir = if top { -1 } else { 1 };
        (Point::new(first, y), (0, dir), second.map(|x| Point::new(x, y)))
    } else {
        let left = rng.range(0, 2) == 0;
        let x = if left { anchor.x1 } else { anchor.x2 };
        let dir = if left { -1 } else { 1 };
        (Point::new(x, first), (dir, 0), second.map(|y| Point::new(x, y)))
    }
}

/// Place the stairs and name the rooms. Returns the player's start.
fn finish(map: &mut GameMap, rooms: &[Room]) -> Point {
    let Some(first) = rooms.first() else {
        return map.upstairs;
    };
    let start = first.center();
    map.upstairs = start;
    if let Some(last) = rooms.last() {
        map.downstairs = last.center();
        map.set_tile(map.downstairs, tiles().down_stairs);
    }

    // The smallest room after the hall is the restroom.
    let restroom = rooms
        .iter()
        .enumerate()
        .skip(1)
        .min_by_key(|(_, room)| room.area())
        .map(|(idx, _)| idx);

    let mut quarters = 0;
    map.rooms = rooms
        .iter()
        .enumerate()
        .map(|(idx, room)| {
            let (name, kind) = if idx == 0 {
                ("Main Hall".to_string(), RoomKind::Hall)
            } else if Some(idx) == restroom {
                ("Restroom".to_string(), RoomKind::Restroom)
            } else {
                quarters += 1;
                (format!("Office {quarters}"), RoomKind::Quarters)
            };
            RoomArea {
                name,
                kind,
                interior: room.interior(),
            }
        })
        .collect();
    start
}
