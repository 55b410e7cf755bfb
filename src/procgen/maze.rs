//! Maze floors: a randomized depth-first carve over a grid of 5×5 cells,
//! stamped into the middle of the map.

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use tracing::debug;

use crate::{
    config::GenerationConfig,
    data::tiles::tiles,
    error::GenerationError,
    map::{FloorId, GameMap},
};

const CELL: i32 = 5;
/// Chance that a freshly carved cell also opens into one of its visited
/// neighbours, turning the tree into a maze with loops.
const LOOP_CHANCE: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MazeCell {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub visited: bool,
}

#[derive(Clone, Debug)]
pub struct Maze {
    pub width: i32,
    pub height: i32,
    cells: Vec<MazeCell>,
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl Maze {
    fn blank(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![MazeCell::default(); (width * height) as usize],
            start: (0, 0),
            end: (0, 0),
        }
    }

    fn idx(&self, (x, y): (i32, i32)) -> usize {
        (y * self.width + x) as usize
    }

    pub fn cell(&self, at: (i32, i32)) -> MazeCell {
        self.cells[self.idx(at)]
    }

    fn neighbours(&self, (x, y): (i32, i32)) -> Vec<(i32, i32)> {
        [(0, 1), (0, -1), (1, 0), (-1, 0)]
            .into_iter()
            .map(|(dx, dy)| (x + dx, y + dy))
            .filter(|&(nx, ny)| nx >= 0 && nx < self.width && ny >= 0 && ny < self.height)
            .collect()
    }

    fn unvisited_neighbours(&self, at: (i32, i32)) -> Vec<(i32, i32)> {
        self.neighbours(at)
            .into_iter()
            .filter(|n| !self.cell(*n).visited)
            .collect()
    }

    fn visited_neighbours(&self, at: (i32, i32)) -> Vec<(i32, i32)> {
        self.neighbours(at)
            .into_iter()
            .filter(|n| self.cell(*n).visited)
            .collect()
    }

    /// Open the wall between two adjacent cells and mark `to` visited.
    fn connect(&mut self, from: (i32, i32), to: (i32, i32)) {
        let (a, b) = (self.idx(from), self.idx(to));
        match (to.0 - from.0, to.1 - from.1) {
            (1, 0) => {
                self.cells[a].right = true;
                self.cells[b].left = true;
            }
            (-1, 0) => {
                self.cells[a].left = true;
                self.cells[b].right = true;
            }
            (0, 1) => {
                self.cells[a].down = true;
                self.cells[b].up = true;
            }
            (0, -1) => {
                self.cells[a].up = true;
                self.cells[b].down = true;
            }
            _ => return,
        }
        self.cells[b].visited = true;
    }

    /// Carve a `width × height` maze. With `ends_at_edge` the start and end
    /// sit on opposite side columns; otherwise the end is the last cell
    /// carved.
    pub fn carve(
        width: i32,
        height: i32,
        ends_at_edge: bool,
        rng: &mut RandomNumberGenerator,
    ) -> Self {
        let mut maze = Self::blank(width, height);
        let start = (rng.range(0, width), rng.range(0, height));
        let first = maze.idx(start);
        maze.cells[first].visited = true;

        let mut last = start;
        let mut path: Vec<(i32, i32)> = Vec::new();
        let mut remaining = width * height - 1;

        while remaining > 0 {
            let from = if maze.unvisited_neighbours(last).is_empty() {
                // Backtrack to the newest cell that still has somewhere to go.
                path.iter()
                    .rev()
                    .copied()
                    .chain(std::iter::once(start))
                    .find(|cell| !maze.unvisited_neighbours(*cell).is_empty())
            } else {
                Some(last)
            };
            let Some(from) = from else {
                break;
            };

            let options = maze.unvisited_neighbours(from);
            let step = options[rng.range(0, options.len() as i32) as usize];
            maze.connect(from, step);
            remaining -= 1;
            last = step;
            path.push(step);

            if rng.range(0.0_f64, 1.0) < LOOP_CHANCE {
                let visited = maze.visited_neighbours(step);
                if visited.len() > 1 {
                    let other = visited[rng.range(0, visited.len() as i32) as usize];
                    maze.connect(step, other);
                }
            }
        }

        maze.start = start;
        maze.end = last;
        if ends_at_edge {
            let left = rng.range(0, 2) == 0;
            let (start_x, end_x) = if left { (0, width - 1) } else { (width - 1, 0) };
            maze.start = (start_x, rng.range(0, height));
            maze.end = (end_x, rng.range(0, height));
        }
        maze
    }

    /// Map cell at the middle of a maze cell.
    pub fn map_point(&self, (x, y): (i32, i32), x_offset: i32) -> Point {
        Point::new(x * CELL + 2 + x_offset, y * CELL + 2)
    }

    /// Stamp every cell as a 5×5 block: open floor with a wall along the top
    /// unless it opens upward, and along the right unless it opens right.
    /// Left and bottom edges come from the neighbouring blocks.
    pub fn stamp(&self, map: &mut GameMap, x_offset: i32) {
        let floor = tiles().floor;
        let wall = tiles().wall;
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell((x, y));
                for row in 0..CELL {
                    for col in 0..CELL {
                        let solid = (row == 0 && (!cell.up || col == CELL - 1))
                            || (col == CELL - 1 && !cell.right);
                        let point = Point::new(x * CELL + col + x_offset, y * CELL + row);
                        map.set_tile(point, if solid { wall } else { floor });
                    }
                }
            }
        }
    }
}

/// Build a maze floor. Returns the map and the player's start.
pub fn generate_maze(
    width: i32,
    height: i32,
    floor: FloorId,
    settings: &GenerationConfig,
    rng: &mut RandomNumberGenerator,
) -> Result<(GameMap, Point), GenerationError> {
    let maze_width = (width - 1) / (CELL * 2);
    let maze_height = (height - 1) / CELL;
    if maze_width < 1 || maze_height < 1 {
        return Err(GenerationError::MapTooSmall {
            width,
            height,
            what: "a maze",
        });
    }
    let x_offset = width / 2 - maze_width * CELL / 2;

    let maze = Maze::carve(maze_width, maze_height, settings.maze_ends_at_edge, rng);
    let mut map = GameMap::new(width, height, floor);
    maze.stamp(&mut map, x_offset);

    let start = maze.map_point(maze.start, x_offset);
    map.upstairs = start;
    map.downstairs = maze.map_point(maze.end, x_offset);
    map.set_tile(map.downstairs, tiles().down_stairs);
    debug!(floor = floor.0, maze_width, maze_height, "maze carved");
    Ok((map, start))
}
