pub mod pathing;

use bracket_geometry::prelude::{Point, Rect};
use specs::prelude::Entity;

use crate::{
    config::GameConfig,
    data::tiles::{Glyph, TileRecord, mapped, shroud, tiles},
    ecs::EcsWorld,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloorId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoomKind {
    Hall,
    Quarters,
    Restroom,
}

/// Footprint of a generated room, kept for NPC routines.
#[derive(Clone, Debug)]
pub struct RoomArea {
    pub name: String,
    pub kind: RoomKind,
    /// Walkable interior; `x2`/`y2` are exclusive.
    pub interior: Rect,
}

impl RoomArea {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.interior.x1
            && point.x < self.interior.x2
            && point.y >= self.interior.y1
            && point.y < self.interior.y2
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.interior.x1 + self.interior.x2 - 1) / 2,
            (self.interior.y1 + self.interior.y2 - 1) / 2,
        )
    }

    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for y in self.interior.y1..self.interior.y2 {
            for x in self.interior.x1..self.interior.x2 {
                points.push(Point::new(x, y));
            }
        }
        points
    }
}

/// One floor: terrain, what the player has seen of it, and where its stairs
/// are. Entities live in the ECS, tagged with this map's `floor`.
#[derive(Clone, Debug)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    pub floor: FloorId,
    pub tiles: Vec<TileRecord>,
    pub visible: Vec<bool>,
    pub explored: Vec<bool>,
    pub mapped: Vec<bool>,
    pub upstairs: Point,
    pub downstairs: Point,
    pub rooms: Vec<RoomArea>,
}

impl GameMap {
    pub fn new(width: i32, height: i32, floor: FloorId) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            floor,
            tiles: vec![tiles().wall; size],
            visible: vec![false; size],
            explored: vec![false; size],
            mapped: vec![false; size],
            upstairs: Point::new(0, 0),
            downstairs: Point::new(0, 0),
            rooms: Vec::new(),
        }
    }

    pub fn floor_number(&self) -> u32 {
        self.floor.0
    }

    pub fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn tile_at(&self, point: Point) -> Option<TileRecord> {
        self.idx(point).map(|idx| self.tiles[idx])
    }

    pub fn set_tile(&mut self, point: Point, tile: TileRecord) {
        if let Some(idx) = self.idx(point) {
            self.tiles[idx] = tile;
        }
    }

    pub fn tile_name(&self, point: Point) -> &'static str {
        match self.tile_at(point) {
            Some(tile) => tiles().name_of(&tile),
            None => "",
        }
    }

    /// Terrain only; ignores who is standing there.
    pub fn terrain_walkable(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(|tile| tile.walkable)
    }

    pub fn is_transparent(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(|tile| tile.transparent)
    }

    /// Walkable terrain with no blocking entity on it.
    pub fn tile_is_walkable(&self, ecs: &EcsWorld, point: Point) -> bool {
        self.terrain_walkable(point) && self.blocking_entity_at(ecs, point).is_none()
    }

    pub fn blocking_entity_at(&self, ecs: &EcsWorld, point: Point) -> Option<Entity> {
        if !self.in_bounds(point) {
            return None;
        }
        ecs.blocking_entity_at(self.floor, point)
    }

    pub fn actor_at(&self, ecs: &EcsWorld, point: Point) -> Option<Entity> {
        if !self.in_bounds(point) {
            return None;
        }
        ecs.actor_at(self.floor, point)
    }

    pub fn item_at(&self, ecs: &EcsWorld, point: Point) -> Option<Entity> {
        if !self.in_bounds(point) {
            return None;
        }
        ecs.item_at(self.floor, point)
    }

    /// Whether `subject` can be sensed from `observer` without line of sight.
    /// `through_walls` asks for the closer range at which identity is clear.
    pub fn smellable(
        &self,
        observer: Point,
        subject: Point,
        through_walls: bool,
        config: &GameConfig,
    ) -> bool {
        let distance = chebyshev(observer, subject);
        if through_walls {
            distance <= config.identity_radius
        } else {
            distance <= config.scent_radius
        }
    }

    /// Replace the visible plane with `fov`, then fold it into `explored`.
    pub fn update_visibility(&mut self, fov: &[bool]) {
        for (idx, visible) in self.visible.iter_mut().enumerate() {
            *visible = fov.get(idx).copied().unwrap_or(false);
        }
        for (explored, visible) in self.explored.iter_mut().zip(&self.visible) {
            *explored |= *visible;
        }
    }

    pub fn is_visible(&self, point: Point) -> bool {
        self.idx(point).is_some_and(|idx| self.visible[idx])
    }

    pub fn is_explored(&self, point: Point) -> bool {
        self.idx(point).is_some_and(|idx| self.explored[idx])
    }

    pub fn is_mapped(&self, point: Point) -> bool {
        self.idx(point).is_some_and(|idx| self.mapped[idx])
    }

    /// Reveal the floor plan as if read off a map: every non-wall cell becomes
    /// mapped and the downstairs count as explored.
    pub fn make_mapped(&mut self) {
        let wall = tiles().wall;
        for idx in 0..self.tiles.len() {
            if self.tiles[idx] != wall {
                self.mapped[idx] = true;
            }
        }
        if let Some(idx) = self.idx(self.downstairs) {
            self.explored[idx] = true;
        }
    }

    /// What a display shows for `point`: the lit glyph in view, the dark one
    /// once explored, the map glyph if only mapped, otherwise shroud.
    pub fn glyph_at(&self, point: Point) -> Glyph {
        let Some(tile) = self.tile_at(point) else {
            return shroud();
        };
        if self.is_visible(point) {
            tile.light
        } else if self.is_explored(point) {
            tile.dark
        } else if self.is_mapped(point) {
            mapped()
        } else {
            shroud()
        }
    }

    pub fn mark_blood(&mut self, point: Point) {
        if self.tile_at(point) == Some(tiles().floor) {
            self.set_tile(point, tiles().bloody_floor);
        }
    }

    pub fn room_at(&self, point: Point) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(point))
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let point = Point::new(x, y);
                if self.terrain_walkable(point) {
                    points.push(point);
                }
            }
        }
        points
    }

    pub fn walkable_mask(&self) -> Vec<bool> {
        self.tiles.iter().map(|tile| tile.walkable).collect()
    }

    pub fn transparency_mask(&self) -> Vec<bool> {
        self.tiles.iter().map(|tile| tile.transparent).collect()
    }
}

pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// The eight compass steps, north first.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::monsters::MonsterTemplate;

    /// A walled map with a single open room covering `x1..=x2`, `y1..=y2`.
    pub(crate) fn room_map(width: i32, height: i32, x1: i32, y1: i32, x2: i32, y2: i32) -> GameMap {
        let mut map = GameMap::new(width, height, FloorId(1));
        for y in y1..=y2 {
            for x in x1..=x2 {
                map.set_tile(Point::new(x, y), tiles().floor);
            }
        }
        map
    }

    #[test]
    fn out_of_bounds_is_absent() {
        let map = room_map(10, 10, 1, 1, 8, 8);
        let ecs = EcsWorld::new(Point::new(2, 2), FloorId(1));
        for point in [
            Point::new(-1, 0),
            Point::new(0, -1),
            Point::new(10, 5),
            Point::new(5, 10),
            Point::new(i32::MIN, i32::MAX),
        ] {
            assert!(!map.tile_is_walkable(&ecs, point));
            assert!(map.blocking_entity_at(&ecs, point).is_none());
            assert!(map.actor_at(&ecs, point).is_none());
            assert!(map.item_at(&ecs, point).is_none());
            assert!(!map.is_visible(point));
        }
    }

    #[test]
    fn occupancy_blocks_walking() {
        let mut map = room_map(10, 10, 1, 1, 8, 8);
        let mut ecs = EcsWorld::new(Point::new(2, 2), FloorId(1));
        assert!(!map.tile_is_walkable(&ecs, Point::new(2, 2)));
        assert!(map.tile_is_walkable(&ecs, Point::new(3, 2)));
        assert!(!map.tile_is_walkable(&ecs, Point::new(0, 0)));

        let mut rng = bracket_random::prelude::RandomNumberGenerator::seeded(3);
        let npc = ecs.spawn_monster(&MonsterTemplate::guard(), Point::new(5, 5), &map, &mut rng);
        assert_eq!(map.actor_at(&ecs, Point::new(5, 5)), Some(npc));
        assert!(!map.tile_is_walkable(&ecs, Point::new(5, 5)));
        map.mark_blood(Point::new(5, 5));
        assert_eq!(map.tile_name(Point::new(5, 5)), "floor");
        assert!(map.terrain_walkable(Point::new(5, 5)));
    }

    #[test]
    fn explored_never_shrinks() {
        let mut map = room_map(6, 6, 1, 1, 4, 4);
        let mut first = vec![false; 36];
        first[7] = true;
        first[8] = true;
        map.update_visibility(&first);
        assert!(map.explored[7] && map.explored[8]);

        let mut second = vec![false; 36];
        second[20] = true;
        map.update_visibility(&second);
        assert!(!map.visible[7]);
        assert!(map.visible[20]);
        assert!(map.explored[7] && map.explored[8] && map.explored[20]);

        map.update_visibility(&[]);
        assert!(map.visible.iter().all(|v| !v));
        assert_eq!(map.explored.iter().filter(|e| **e).count(), 3);
    }

    #[test]
    fn smell_uses_chebyshev_radius() {
        let map = room_map(20, 20, 1, 1, 18, 18);
        let config = GameConfig {
            scent_radius: 3,
            identity_radius: 1,
            ..GameConfig::default()
        };
        let origin = Point::new(5, 5);
        assert!(map.smellable(origin, Point::new(8, 7), false, &config));
        assert!(!map.smellable(origin, Point::new(9, 5), false, &config));
        assert!(map.smellable(origin, Point::new(6, 6), true, &config));
        assert!(!map.smellable(origin, Point::new(7, 5), true, &config));
    }

    #[test]
    fn make_mapped_marks_open_cells() {
        let mut map = room_map(6, 6, 1, 1, 4, 4);
        map.downstairs = Point::new(3, 3);
        map.set_tile(map.downstairs, tiles().down_stairs);
        map.make_mapped();
        assert!(map.is_mapped(Point::new(2, 2)));
        assert!(!map.is_mapped(Point::new(0, 0)));
        assert!(map.is_explored(Point::new(3, 3)));
    }

    #[test]
    fn glyphs_follow_what_is_known() {
        let mut map = room_map(6, 6, 1, 1, 4, 4);
        let lit = Point::new(1, 1);
        let seen = Point::new(2, 2);
        let charted = Point::new(4, 4);
        assert_eq!(map.glyph_at(charted), shroud());

        let mut fov = vec![false; 36];
        fov[map.idx(seen).unwrap()] = true;
        map.update_visibility(&fov);
        let mut fov = vec![false; 36];
        fov[map.idx(lit).unwrap()] = true;
        map.update_visibility(&fov);
        map.make_mapped();

        assert_eq!(map.glyph_at(lit), tiles().floor.light);
        assert_eq!(map.glyph_at(seen), tiles().floor.dark);
        assert_eq!(map.glyph_at(charted), mapped());
        assert_eq!(map.glyph_at(Point::new(0, 0)), shroud());
        assert_eq!(map.glyph_at(Point::new(-3, 9)), shroud());
    }
}
