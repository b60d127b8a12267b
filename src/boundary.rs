use crate::maze::MazeGrid;
use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollView {
    pub maze_height: usize,
    pub scroll_offset: u32,
    pub cell_size: u32,
}

/// Presentation-owned rule for which cells an agent may enter, on top of the
/// maze walls. Queries must be pure.
pub trait BoundaryOracle {
    fn contains(&self, view: &ScrollView, pos: Point) -> bool;
}

impl<F> BoundaryOracle for F
where
    F: Fn(&ScrollView, Point) -> bool,
{
    fn contains(&self, view: &ScrollView, pos: Point) -> bool {
        self(view, pos)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleRows {
    pub half_rows: f32,
}

impl BoundaryOracle for VisibleRows {
    fn contains(&self, view: &ScrollView, pos: Point) -> bool {
        let cell_size = view.cell_size.max(1) as f32;
        let centre = view.maze_height as f32 / 2.0 - view.scroll_offset as f32 / cell_size;
        (pos.row as f32 - centre).abs() <= self.half_rows
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unbounded;

impl BoundaryOracle for Unbounded {
    fn contains(&self, _view: &ScrollView, _pos: Point) -> bool {
        true
    }
}

#[derive(Clone, Copy)]
pub struct Passability<'a> {
    pub maze: &'a MazeGrid,
    pub boundary: &'a dyn BoundaryOracle,
    pub view: ScrollView,
}

impl Passability<'_> {
    pub fn can_enter(&self, pos: Point) -> bool {
        self.maze.is_walkable_at(pos) && self.boundary.contains(&self.view, pos)
    }
}
