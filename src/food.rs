use crate::constants::TILE_SCALE;
use crate::maze::MazeGrid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoodField {
    cells: Vec<Vec<bool>>,
}

impl FoodField {
    pub fn from_maze(maze: &MazeGrid) -> Self {
        let cells = maze
            .walls()
            .iter()
            .map(|row| row.iter().map(|wall| !wall).collect())
            .collect();
        Self { cells }
    }

    pub fn cells(&self) -> &[Vec<bool>] {
        &self.cells
    }

    pub fn has_food(&self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        self.cells
            .get(row as usize)
            .and_then(|line| line.get(col as usize))
            .copied()
            .unwrap_or(false)
    }

    pub fn consume(&mut self, row: i32, col: i32) -> bool {
        if !self.has_food(row, col) {
            return false;
        }
        self.cells[row as usize][col as usize] = false;
        true
    }

    pub fn remaining(&self) -> usize {
        self.cells.iter().flatten().filter(|food| **food).count()
    }

    /// Follows the maze one tile row down. The bottom rows fall off and fresh
    /// rows arrive full; every other cell inherits the flag of the cell one
    /// tile row above it in `previous`, and keeps food only if it is still
    /// floor in `maze`. The one exception is a source cell that was wall in
    /// `previous`: it had no flag to inherit, so it counts as uneaten and
    /// floor opened up by the new tiles starts full.
    pub fn scroll(&mut self, previous: &MazeGrid, maze: &MazeGrid) {
        let cells = (0..maze.height())
            .map(|row| {
                (0..maze.width())
                    .map(|col| {
                        let (row, col) = (row as i32, col as i32);
                        let prior = row - TILE_SCALE as i32;
                        let uneaten = prior < 0
                            || self.has_food(prior, col)
                            || previous.is_wall(prior, col);
                        uneaten && maze.is_walkable(row, col)
                    })
                    .collect()
            })
            .collect();
        self.cells = cells;
    }
}
