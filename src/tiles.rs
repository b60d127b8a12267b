use std::fmt;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::constants::next_piece_id;
use crate::error::GenerationError;
use crate::pieces::{Piece, PIECES, SINGLE};

/// Coarse grid of piece ids. Row 0 is the newest (top) row; `0` marks a cell
/// no piece has claimed yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    rows: Vec<Vec<u16>>,
}

impl TileGrid {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            width,
            rows: vec![vec![0; width]; height],
        }
    }

    pub fn from_rows(rows: Vec<Vec<u16>>) -> Self {
        let width = rows.iter().map(Vec::len).min().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.truncate(width);
                row
            })
            .collect();
        Self { width, rows }
    }

    #[cfg(test)]
    pub(crate) fn lattice(height: usize, width: usize) -> Self {
        let rows = (0..height)
            .map(|row| (0..width).map(|col| (row * width + col + 1) as u16).collect())
            .collect();
        Self { width, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &[Vec<u16>] {
        &self.rows
    }

    pub fn is_inside(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height() && (col as usize) < self.width
    }

    pub fn get(&self, row: i32, col: i32) -> Option<u16> {
        if !self.is_inside(row, col) {
            return None;
        }
        Some(self.rows[row as usize][col as usize])
    }

    pub fn max_id(&self) -> u16 {
        self.rows.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Reflects every row around column 0 and concatenates, so column 0
    /// becomes the shared centre column of a `2W - 1` wide grid.
    pub fn mirrored(&self) -> TileGrid {
        if self.width == 0 {
            return self.clone();
        }
        let rows = self
            .rows
            .iter()
            .map(|row| row[1..].iter().rev().chain(row.iter()).copied().collect())
            .collect();
        TileGrid {
            width: self.width * 2 - 1,
            rows,
        }
    }

    pub fn push_front_row(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.rows.pop();
        self.rows.insert(0, vec![0; self.width]);
    }

    fn fits(&self, row: usize, col: usize, piece: &Piece) -> bool {
        piece.cells.iter().all(|&(dr, dc)| {
            let r = row as i32 + dr;
            let c = col as i32 + dc;
            self.get(r, c) == Some(0)
        })
    }

    fn stamp(&mut self, row: usize, col: usize, piece: &Piece, id: u16) {
        for &(dr, dc) in piece.cells {
            let r = (row as i32 + dr) as usize;
            let c = (col as i32 + dc) as usize;
            self.rows[r][c] = id;
        }
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|id| format!("{id:3}")).collect();
            writeln!(f, "{}", line.join(""))?;
        }
        Ok(())
    }
}

struct Frame {
    row: usize,
    col: usize,
    id: u16,
    candidates: Vec<&'static Piece>,
    next: usize,
    placed: Option<&'static Piece>,
}

/// Backtracking tiler. Scans from the bottom-right cell leftwards, then row by
/// row upwards, and never anchors a piece inside the top `frontier_rows`.
#[derive(Clone, Copy, Debug)]
pub struct TileGenerator {
    pub frontier_rows: usize,
    pub id_bound: u16,
}

impl TileGenerator {
    pub fn new(frontier_rows: usize, id_bound: u16) -> Self {
        Self {
            frontier_rows,
            id_bound,
        }
    }

    pub fn fill<R: RngCore + ?Sized>(
        &self,
        grid: &mut TileGrid,
        next_id: u16,
        rng: &mut R,
    ) -> Result<u16, GenerationError> {
        if grid.height() == 0 || grid.width() == 0 {
            return Ok(next_id);
        }
        self.generate(grid, grid.height() - 1, grid.width() - 1, next_id, rng)
    }

    pub fn generate<R: RngCore + ?Sized>(
        &self,
        grid: &mut TileGrid,
        start_row: usize,
        start_col: usize,
        next_id: u16,
        rng: &mut R,
    ) -> Result<u16, GenerationError> {
        if start_row >= grid.height() || start_col >= grid.width() {
            return Err(GenerationError::StartOutOfBounds {
                row: start_row,
                col: start_col,
                height: grid.height(),
                width: grid.width(),
            });
        }

        let mut stack: Vec<Frame> = Vec::new();
        let mut cursor = (start_row >= self.frontier_rows).then_some((start_row, start_col));
        let mut id = next_id;

        while let Some((row, col)) = cursor {
            if grid.rows[row][col] != 0 {
                cursor = self.advance(grid, row, col);
                continue;
            }

            let mut candidates: Vec<&'static Piece> = PIECES.iter().collect();
            candidates.shuffle(rng);
            candidates.push(&SINGLE);
            stack.push(Frame {
                row,
                col,
                id,
                candidates,
                next: 0,
                placed: None,
            });

            loop {
                let Some(frame) = stack.last_mut() else {
                    return Err(GenerationError::Exhausted {
                        row: start_row,
                        col: start_col,
                    });
                };
                if let Some(piece) = frame.placed.take() {
                    grid.stamp(frame.row, frame.col, piece, 0);
                }

                while frame.next < frame.candidates.len() {
                    let piece = frame.candidates[frame.next];
                    frame.next += 1;
                    if grid.fits(frame.row, frame.col, piece) {
                        grid.stamp(frame.row, frame.col, piece, frame.id);
                        frame.placed = Some(piece);
                        break;
                    }
                }

                if frame.placed.is_some() {
                    cursor = self.advance(grid, frame.row, frame.col);
                    id = next_piece_id(frame.id, self.id_bound);
                    break;
                }
                stack.pop();
            }
        }

        Ok(id)
    }

    fn advance(&self, grid: &TileGrid, row: usize, col: usize) -> Option<(usize, usize)> {
        let (row, col) = if col == 0 {
            (row.checked_sub(1)?, grid.width() - 1)
        } else {
            (row, col - 1)
        };
        (row >= self.frontier_rows).then_some((row, col))
    }
}
