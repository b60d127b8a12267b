use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::ops::Range;

use crate::constants::{MAZE_BORDER, MAZE_MARGIN, MAZE_OFFSET, TILE_SCALE, WALL_BLOCK};
use crate::tiles::TileGrid;
use crate::types::{Direction, Point};

type Span = (Range<usize>, Range<usize>);

/// Fine walkable/wall grid derived from a mirrored tile grid. Each tile is a
/// `2x2` wall block; 4-adjacent tiles of one piece close the gap between
/// their blocks, so corridors run between different pieces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeGrid {
    width: usize,
    height: usize,
    walls: Vec<Vec<bool>>,
}

impl MazeGrid {
    pub fn from_tiles(tiles: &TileGrid) -> Self {
        let tiles = tiles.mirrored();
        let height = tiles.height() * TILE_SCALE + MAZE_MARGIN;
        let width = tiles.width() * TILE_SCALE + MAZE_MARGIN;
        let mut maze = Self {
            width,
            height,
            walls: vec![vec![false; width]; height],
        };

        for row in 0..tiles.height() {
            for col in 0..tiles.width() {
                maze.fill(wall_span((row, col), (row, col)));
                let Some(id) = tiles.get(row as i32, col as i32) else {
                    continue;
                };
                // Unclaimed frontier cells belong to no piece yet.
                if id == 0 {
                    continue;
                }
                for (nr, nc) in [(row, col + 1), (row + 1, col)] {
                    if tiles.get(nr as i32, nc as i32) == Some(id) {
                        maze.fill(wall_span((row, col), (nr, nc)));
                    }
                }
            }
        }

        maze.seal_border();
        maze
    }

    #[cfg(test)]
    pub(crate) fn solid(height: usize, width: usize) -> Self {
        Self {
            width,
            height,
            walls: vec![vec![true; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn walls(&self) -> &[Vec<bool>] {
        &self.walls
    }

    /// Out-of-bounds reads as wall.
    pub fn is_wall(&self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return true;
        }
        self.walls[row as usize][col as usize]
    }

    pub fn is_walkable(&self, row: i32, col: i32) -> bool {
        !self.is_wall(row, col)
    }

    pub fn is_walkable_at(&self, point: Point) -> bool {
        self.is_walkable(point.row, point.col)
    }

    pub fn walkable_count(&self) -> usize {
        self.walls.iter().flatten().filter(|wall| !**wall).count()
    }

    pub fn reachable_from(&self, start: Point) -> HashSet<Point> {
        let mut out = HashSet::new();
        if !self.is_walkable_at(start) {
            return out;
        }

        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            for dir in Direction::CARDINAL {
                let next = cell.step(dir);
                if !self.is_walkable_at(next) {
                    continue;
                }
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        out
    }

    fn fill(&mut self, (rows, cols): Span) {
        for row in rows {
            let Some(line) = self.walls.get_mut(row) else {
                continue;
            };
            for col in cols.clone() {
                if let Some(cell) = line.get_mut(col) {
                    *cell = true;
                }
            }
        }
    }

    fn seal_border(&mut self) {
        let (height, width) = (self.height, self.width);
        let border = MAZE_BORDER.min(height).min(width);
        self.fill((0..border, 0..width));
        self.fill((height - border..height, 0..width));
        self.fill((0..height, 0..border));
        self.fill((0..height, width - border..width));
    }
}

impl fmt::Display for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.walls {
            let line: String = row.iter().map(|wall| if *wall { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn wall_span(a: (usize, usize), b: (usize, usize)) -> Span {
    let (r0, r1) = (a.0.min(b.0), a.0.max(b.0));
    let (c0, c1) = (a.1.min(b.1), a.1.max(b.1));
    (
        r0 * TILE_SCALE + MAZE_OFFSET..r1 * TILE_SCALE + MAZE_OFFSET + WALL_BLOCK,
        c0 * TILE_SCALE + MAZE_OFFSET..c1 * TILE_SCALE + MAZE_OFFSET + WALL_BLOCK,
    )
}
