use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
    Stop,
}

impl Direction {
    /// Enumeration order doubles as the ghost tie-break order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Left => (0, -1),
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
            Self::Stop => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Stop => Self::Stop,
        }
    }

    pub fn is_cardinal(self) -> bool {
        self != Self::Stop
    }

    pub fn parse_move(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "a" => Some(Self::Left),
            "up" | "w" => Some(Self::Up),
            "right" | "d" => Some(Self::Right),
            "down" | "s" => Some(Self::Down),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn step(self, dir: Direction) -> Self {
        self.ahead(dir, 1)
    }

    pub fn ahead(self, dir: Direction, cells: i32) -> Self {
        let (dr, dc) = dir.delta();
        Self::new(self.row + dr * cells, self.col + dc * cells)
    }

    pub fn distance_sq(self, other: Point) -> i64 {
        let dr = (self.row - other.row) as i64;
        let dc = (self.col - other.col) as i64;
        dr * dr + dc * dc
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.row - rhs.row, self.col - rhs.col)
    }
}

impl Mul<i32> for Point {
    type Output = Point;

    fn mul(self, rhs: i32) -> Point {
        Point::new(self.row * rhs, self.col * rhs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Chaser,
    Flanker,
    Ambusher,
    Evader,
}

impl GhostKind {
    /// Per-tick update order. Flanker reads the Chaser's fresh position, so
    /// Chaser must stay first.
    pub const UPDATE_ORDER: [GhostKind; 4] = [
        GhostKind::Chaser,
        GhostKind::Flanker,
        GhostKind::Ambusher,
        GhostKind::Evader,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Pacman,
    Chaser,
    Flanker,
    Ambusher,
    Evader,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pacman" => Some(Self::Pacman),
            "chaser" => Some(Self::Chaser),
            "flanker" => Some(Self::Flanker),
            "ambusher" => Some(Self::Ambusher),
            "evader" => Some(Self::Evader),
            _ => None,
        }
    }

    pub fn ghost_kind(self) -> Option<GhostKind> {
        match self {
            Self::Pacman => None,
            Self::Chaser => Some(GhostKind::Chaser),
            Self::Flanker => Some(GhostKind::Flanker),
            Self::Ambusher => Some(GhostKind::Ambusher),
            Self::Evader => Some(GhostKind::Evader),
        }
    }
}

impl From<GhostKind> for Role {
    fn from(kind: GhostKind) -> Self {
        match kind {
            GhostKind::Chaser => Self::Chaser,
            GhostKind::Flanker => Self::Flanker,
            GhostKind::Ambusher => Self::Ambusher,
            GhostKind::Evader => Self::Evader,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PacmanView {
    pub row: i32,
    pub col: i32,
    pub dir: Direction,
    pub score: u32,
    #[serde(rename = "animationPhase")]
    pub animation_phase: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GhostView {
    pub role: Role,
    pub row: i32,
    pub col: i32,
    pub dir: Direction,
    pub target: Point,
    #[serde(rename = "speedDivisor")]
    pub speed_divisor: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "scrollOffset")]
    pub scroll_offset: u32,
    pub regenerations: u64,
    pub width: usize,
    pub height: usize,
    pub rows: Vec<String>,
    #[serde(rename = "foodRemaining")]
    pub food_remaining: usize,
    pub pacman: PacmanView,
    pub ghosts: Vec<GhostView>,
}
