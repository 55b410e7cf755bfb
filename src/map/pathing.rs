//! Weighted grid paths and field of view over `bracket_pathfinding` grids.
//!
//! Paths are exact cheapest routes (Dijkstra on integer costs). Field of view
//! is symmetric shadowcasting: if one open cell sees another, the reverse
//! holds too.

use std::{cmp::Reverse, collections::BinaryHeap};

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap};
use smallvec::SmallVec;

use super::{DIRECTIONS, GameMap};
use crate::ecs::EcsWorld;

pub const CARDINAL_COST: i32 = 3;
pub const DIAGONAL_COST: i32 = 4;

/// Per-cell entry cost; zero is impassable.
#[derive(Clone, Debug)]
pub struct CostGrid {
    width: i32,
    height: i32,
    costs: Vec<i32>,
}

impl CostGrid {
    pub fn from_walkable(width: i32, height: i32, walkable: &[bool]) -> Self {
        let size = (width * height) as usize;
        let costs = (0..size)
            .map(|idx| i32::from(walkable.get(idx).copied().unwrap_or(false)))
            .collect();
        Self {
            width,
            height,
            costs,
        }
    }

    pub fn open(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            costs: vec![1; (width * height) as usize],
        }
    }

    /// Grid for an actor heading to `destination`. Cells holding a blocking
    /// entity cost `penalty` more instead of being walls, so crowds queue up
    /// and long detours only win once the queue is deep. The destination is
    /// never penalized, so a path can always end on a known occupant.
    pub fn for_route(
        map: &GameMap,
        ecs: &EcsWorld,
        destination: Point,
        ignore_terrain: bool,
        penalty: i32,
    ) -> Self {
        let mut grid = if ignore_terrain {
            Self::open(map.width, map.height)
        } else {
            Self::from_walkable(map.width, map.height, &map.walkable_mask())
        };
        for point in ecs.blocking_points(map.floor) {
            if point != destination {
                grid.add_penalty(point, penalty);
            }
        }
        grid
    }

    fn index(&self, point: Point) -> Option<usize> {
        if point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn cost(&self, point: Point) -> i32 {
        self.index(point).map_or(0, |idx| self.costs[idx])
    }

    /// Walls stay walls.
    pub fn add_penalty(&mut self, point: Point, penalty: i32) {
        if let Some(idx) = self.index(point) {
            if self.costs[idx] > 0 {
                self.costs[idx] += penalty;
            }
        }
    }

    fn step_cost(&self, from: Point, to: Point) -> i32 {
        let diagonal = from.x != to.x && from.y != to.y;
        self.cost(to) * if diagonal { DIAGONAL_COST } else { CARDINAL_COST }
    }
}

impl BaseMap for CostGrid {
    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for (dx, dy) in DIRECTIONS {
            let dest = Point::new(point.x + dx, point.y + dy);
            if self.cost(dest) > 0 {
                exits.push((
                    self.point2d_to_index(dest),
                    self.step_cost(point, dest) as f32,
                ));
            }
        }
        exits
    }
}

impl Algorithm2D for CostGrid {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

/// Cheapest path from `origin` to `destination`, without the origin. Empty if
/// there is none. Ties go to whichever route the search settles first, which
/// is fixed for a given grid.
pub fn compute_path(origin: Point, destination: Point, grid: &CostGrid) -> Vec<Point> {
    if origin == destination || !grid.in_bounds(origin) || grid.cost(destination) == 0 {
        return Vec::new();
    }
    let start = grid.point2d_to_index(origin);
    let goal = grid.point2d_to_index(destination);
    let mut best = vec![i32::MAX; grid.costs.len()];
    let mut came_from: Vec<Option<usize>> = vec![None; grid.costs.len()];
    let mut frontier = BinaryHeap::new();
    best[start] = 0;
    frontier.push(Reverse((0, start)));

    while let Some(Reverse((spent, idx))) = frontier.pop() {
        if idx == goal {
            break;
        }
        if spent > best[idx] {
            continue;
        }
        for (next, step) in grid.get_available_exits(idx) {
            let total = spent + step as i32;
            if total < best[next] {
                best[next] = total;
                came_from[next] = Some(idx);
                frontier.push(Reverse((total, next)));
            }
        }
    }
    if best[goal] == i32::MAX {
        return Vec::new();
    }

    let mut steps = vec![destination];
    let mut cursor = goal;
    while let Some(prev) = came_from[cursor] {
        if prev == start {
            break;
        }
        steps.push(grid.index_to_point2d(prev));
        cursor = prev;
    }
    steps.reverse();
    steps
}

/// Total cost of walking `path` from `origin`.
pub fn path_cost(origin: Point, path: &[Point], grid: &CostGrid) -> i32 {
    let mut cursor = origin;
    let mut total = 0;
    for &step in path {
        total += grid.step_cost(cursor, step);
        cursor = step;
    }
    total
}

struct SightGrid<'a> {
    width: i32,
    height: i32,
    transparent: &'a [bool],
}

impl BaseMap for SightGrid<'_> {
    fn is_opaque(&self, idx: usize) -> bool {
        !self.transparent.get(idx).copied().unwrap_or(false)
    }
}

impl Algorithm2D for SightGrid<'_> {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

/// A slope `num / den` through the middle of a row, with `den > 0`.
#[derive(Clone, Copy)]
struct Slope {
    num: i32,
    den: i32,
}

impl Slope {
    /// Slope to the near edge of the cell at (`depth`, `col`).
    fn edge(depth: i32, col: i32) -> Self {
        Self {
            num: 2 * col - 1,
            den: 2 * depth,
        }
    }
}

#[derive(Clone, Copy)]
struct Row {
    depth: i32,
    start: Slope,
    end: Slope,
}

impl Row {
    fn min_col(&self) -> i32 {
        // depth * start, rounded half up
        (2 * self.depth * self.start.num + self.start.den).div_euclid(2 * self.start.den)
    }

    fn max_col(&self) -> i32 {
        // depth * end, rounded half down
        -(self.end.den - 2 * self.depth * self.end.num).div_euclid(2 * self.end.den)
    }

    /// Whether the cell's center lies inside the row's sector.
    fn is_symmetric(&self, col: i32) -> bool {
        col * self.start.den >= self.depth * self.start.num
            && col * self.end.den <= self.depth * self.end.num
    }

    fn next(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }
}

/// Map cell at (`depth`, `col`) in one of the four quadrants around `origin`.
fn quadrant_point(origin: Point, quadrant: usize, depth: i32, col: i32) -> Point {
    match quadrant {
        0 => Point::new(origin.x + col, origin.y - depth),
        1 => Point::new(origin.x + col, origin.y + depth),
        2 => Point::new(origin.x + depth, origin.y + col),
        _ => Point::new(origin.x - depth, origin.y + col),
    }
}

/// Cells visible from `origin` within `radius` (Euclidean), as a mask over
/// the grid. Opaque cells bounding the view are included. Off-grid cells
/// block sight.
pub fn compute_fov(
    transparent: &[bool],
    width: i32,
    height: i32,
    origin: Point,
    radius: i32,
) -> Vec<bool> {
    let grid = SightGrid {
        width,
        height,
        transparent,
    };
    let mut mask = vec![false; (width * height) as usize];
    if !grid.in_bounds(origin) {
        return mask;
    }
    mask[grid.point2d_to_index(origin)] = true;

    let blocks =
        |point: Point| !grid.in_bounds(point) || grid.is_opaque(grid.point2d_to_index(point));
    for quadrant in 0..4 {
        let mut rows = vec![Row {
            depth: 1,
            start: Slope { num: -1, den: 1 },
            end: Slope { num: 1, den: 1 },
        }];
        while let Some(mut row) = rows.pop() {
            if row.depth > radius {
                continue;
            }
            let mut prev_wall = None;
            for col in row.min_col()..=row.max_col() {
                let point = quadrant_point(origin, quadrant, row.depth, col);
                let wall = blocks(point);
                let in_range = row.depth * row.depth + col * col <= radius * radius;
                if in_range && grid.in_bounds(point) && (wall || row.is_symmetric(col)) {
                    mask[grid.point2d_to_index(point)] = true;
                }
                if prev_wall == Some(true) && !wall {
                    row.start = Slope::edge(row.depth, col);
                }
                if prev_wall == Some(false) && wall {
                    let mut next = row.next();
                    next.end = Slope::edge(row.depth, col);
                    rows.push(next);
                }
                prev_wall = Some(wall);
            }
            if prev_wall == Some(false) {
                rows.push(row.next());
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::monsters::MonsterTemplate,
        map::{FloorId, chebyshev, tests::room_map},
    };
    use bracket_random::prelude::RandomNumberGenerator;

    #[test]
    fn blocker_adds_exactly_the_penalty() {
        let map = room_map(12, 12, 1, 1, 10, 10);
        let mut ecs = EcsWorld::new(Point::new(1, 1), FloorId(1));
        let mut rng = RandomNumberGenerator::seeded(1);
        let blocker = Point::new(5, 5);
        ecs.spawn_monster(&MonsterTemplate::guard(), blocker, &map, &mut rng);

        let elsewhere = CostGrid::for_route(&map, &ecs, Point::new(9, 9), false, 10);
        assert_eq!(elsewhere.cost(blocker), 1 + 10);
        assert_eq!(elsewhere.cost(Point::new(6, 5)), 1);
        assert_eq!(elsewhere.cost(Point::new(0, 0)), 0);

        let onto = CostGrid::for_route(&map, &ecs, blocker, false, 10);
        assert_eq!(onto.cost(blocker), 1);
        // The player is a blocker too, and it is not the destination here.
        assert_eq!(onto.cost(Point::new(1, 1)), 11);
    }

    #[test]
    fn ignoring_terrain_opens_walls() {
        let map = room_map(8, 8, 1, 1, 6, 6);
        let ecs = EcsWorld::new(Point::new(1, 1), FloorId(1));
        let grid = CostGrid::for_route(&map, &ecs, Point::new(6, 6), true, 10);
        assert_eq!(grid.cost(Point::new(0, 0)), 1);
    }

    #[test]
    fn path_excludes_origin() {
        let grid = CostGrid::open(10, 10);
        let path = compute_path(Point::new(2, 2), Point::new(2, 5), &grid);
        assert_eq!(
            path,
            vec![Point::new(2, 3), Point::new(2, 4), Point::new(2, 5)]
        );
        assert!(compute_path(Point::new(2, 2), Point::new(2, 2), &grid).is_empty());
    }

    #[test]
    fn diagonals_cost_four_thirds() {
        let grid = CostGrid::open(10, 10);
        let diagonal = compute_path(Point::new(0, 0), Point::new(3, 3), &grid);
        assert_eq!(diagonal.len(), 3);
        assert_eq!(path_cost(Point::new(0, 0), &diagonal, &grid), 12);

        let straight = compute_path(Point::new(0, 0), Point::new(3, 0), &grid);
        assert_eq!(path_cost(Point::new(0, 0), &straight, &grid), 9);
    }

    #[test]
    fn unreachable_is_empty() {
        let mut walkable = vec![true; 25];
        for y in 0..5 {
            walkable[y * 5 + 2] = false;
        }
        let grid = CostGrid::from_walkable(5, 5, &walkable);
        assert!(compute_path(Point::new(0, 0), Point::new(4, 4), &grid).is_empty());
        assert!(compute_path(Point::new(0, 0), Point::new(2, 2), &grid).is_empty());
        assert!(compute_path(Point::new(0, 0), Point::new(40, 4), &grid).is_empty());
    }

    #[test]
    fn corridor_queues_through_crowd() {
        // One-cell corridor: the occupied cell is expensive but still passable.
        let map = room_map(9, 3, 1, 1, 7, 1);
        let mut ecs = EcsWorld::new(Point::new(1, 1), FloorId(1));
        let mut rng = RandomNumberGenerator::seeded(2);
        ecs.spawn_monster(&MonsterTemplate::guard(), Point::new(4, 1), &map, &mut rng);

        let grid = CostGrid::for_route(&map, &ecs, Point::new(7, 1), false, 10);
        let path = compute_path(Point::new(1, 1), Point::new(7, 1), &grid);
        assert_eq!(path.len(), 6);
        assert!(path.contains(&Point::new(4, 1)));
    }

    #[test]
    fn open_ground_flanks_around_crowd() {
        let map = room_map(9, 5, 1, 1, 7, 3);
        let mut ecs = EcsWorld::new(Point::new(1, 2), FloorId(1));
        let mut rng = RandomNumberGenerator::seeded(2);
        ecs.spawn_monster(&MonsterTemplate::guard(), Point::new(4, 2), &map, &mut rng);

        let grid = CostGrid::for_route(&map, &ecs, Point::new(7, 2), false, 10);
        let path = compute_path(Point::new(1, 2), Point::new(7, 2), &grid);
        assert_eq!(path.len(), 6);
        assert!(!path.contains(&Point::new(4, 2)));
    }

    #[test]
    fn fov_is_walled_in() {
        let map = room_map(12, 12, 1, 1, 4, 4);
        let mask = compute_fov(
            &map.transparency_mask(),
            map.width,
            map.height,
            Point::new(2, 2),
            8,
        );
        let at = |x: i32, y: i32| mask[(y * map.width + x) as usize];
        assert!(at(2, 2));
        assert!(at(4, 4));
        assert!(at(5, 2), "bounding wall is lit");
        assert!(!at(7, 2), "nothing past the wall");
    }

    #[test]
    fn fov_respects_radius() {
        let open = vec![true; 30 * 30];
        let mask = compute_fov(&open, 30, 30, Point::new(15, 15), 3);
        assert!(mask[15 * 30 + 17]);
        assert!(!mask[15 * 30 + 25]);
        assert!(compute_fov(&open, 30, 30, Point::new(-1, 3), 3)
            .iter()
            .all(|v| !v));
    }

    /// Cheapest cost to every cell by repeated relaxation, no heap involved.
    fn relaxed_costs(origin: Point, grid: &CostGrid) -> Vec<i32> {
        let mut best = vec![i32::MAX; (grid.width * grid.height) as usize];
        best[grid.point2d_to_index(origin)] = 0;
        let mut changed = true;
        while changed {
            changed = false;
            for idx in 0..best.len() {
                if best[idx] == i32::MAX {
                    continue;
                }
                let from = grid.index_to_point2d(idx);
                for (dx, dy) in DIRECTIONS {
                    let to = Point::new(from.x + dx, from.y + dy);
                    if grid.cost(to) == 0 {
                        continue;
                    }
                    let total = best[idx] + grid.step_cost(from, to);
                    let to_idx = grid.point2d_to_index(to);
                    if total < best[to_idx] {
                        best[to_idx] = total;
                        changed = true;
                    }
                }
            }
        }
        best
    }

    fn scattered_grid(rng: &mut RandomNumberGenerator) -> CostGrid {
        let mut grid = CostGrid::open(20, 20);
        for idx in 0..grid.costs.len() {
            match rng.range(0, 10) {
                0..=1 => grid.costs[idx] = 0,
                2..=3 => grid.costs[idx] += rng.range(1, 16),
                _ => {}
            }
        }
        grid
    }

    #[test]
    fn paths_are_the_cheapest_available() {
        for seed in 0..12 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let grid = scattered_grid(&mut rng);
            for _ in 0..15 {
                let origin = Point::new(rng.range(0, 20), rng.range(0, 20));
                let destination = Point::new(rng.range(0, 20), rng.range(0, 20));
                if origin == destination || grid.cost(destination) == 0 {
                    continue;
                }
                let optimum = relaxed_costs(origin, &grid)[grid.point2d_to_index(destination)];
                let path = compute_path(origin, destination, &grid);
                if optimum == i32::MAX {
                    assert!(path.is_empty(), "seed {seed}: {origin:?} -> {destination:?}");
                    continue;
                }
                assert_eq!(path.last(), Some(&destination));
                let mut cursor = origin;
                for step in &path {
                    assert!(chebyshev(cursor, *step) == 1 && grid.cost(*step) > 0);
                    cursor = *step;
                }
                assert_eq!(
                    path_cost(origin, &path, &grid),
                    optimum,
                    "seed {seed}: {origin:?} -> {destination:?}"
                );
            }
        }
    }

    #[test]
    fn fov_is_symmetric_between_open_cells() {
        for seed in 0..4 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let (width, height) = (20, 20);
            let transparent: Vec<bool> = (0..width * height).map(|_| rng.range(0, 4) != 0).collect();
            let open: Vec<Point> = (0..width * height)
                .filter(|idx| transparent[*idx as usize])
                .map(|idx| Point::new(idx % width, idx / width))
                .collect();
            let masks: Vec<Vec<bool>> = open
                .iter()
                .map(|origin| compute_fov(&transparent, width, height, *origin, 8))
                .collect();
            for (i, a) in open.iter().enumerate() {
                for (j, b) in open.iter().enumerate() {
                    let a_sees_b = masks[i][(b.y * width + b.x) as usize];
                    let b_sees_a = masks[j][(a.y * width + a.x) as usize];
                    assert_eq!(a_sees_b, b_sees_a, "seed {seed}: {a:?} and {b:?}");
                }
            }
        }
    }
}
