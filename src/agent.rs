use crate::boundary::Passability;
use crate::constants::PACMAN_ANIMATION_FRAMES;
use crate::food::FoodField;
use crate::types::{Direction, PacmanView, Point};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mover {
    pub pos: Point,
    pub dir: Direction,
    pub speed_divisor: u32,
    counter: u32,
}

impl Mover {
    pub fn new(pos: Point, dir: Direction, speed_divisor: u32) -> Self {
        Self {
            pos,
            dir,
            speed_divisor: speed_divisor.max(1),
            counter: 0,
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Returns true when a step was committed.
    pub fn tick(&mut self, passability: &Passability<'_>) -> bool {
        self.counter += 1;
        if self.counter < self.speed_divisor {
            return false;
        }
        self.counter = 0;
        if !self.dir.is_cardinal() {
            return false;
        }
        let next = self.pos.step(self.dir);
        if !passability.can_enter(next) {
            return false;
        }
        self.pos = next;
        true
    }

    pub fn shift_rows(&mut self, rows: i32) {
        self.pos.row += rows;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pacman {
    pub mover: Mover,
    pub score: u32,
    pub animation_phase: u8,
}

impl Pacman {
    pub fn new(pos: Point, speed_divisor: u32) -> Self {
        Self {
            mover: Mover::new(pos, Direction::Up, speed_divisor),
            score: 0,
            animation_phase: 0,
        }
    }

    pub fn pos(&self) -> Point {
        self.mover.pos
    }

    pub fn dir(&self) -> Direction {
        self.mover.dir
    }

    pub fn update(&mut self, passability: &Passability<'_>, food: &mut FoodField) {
        if self.mover.tick(passability) {
            self.animation_phase = (self.animation_phase + 1) % PACMAN_ANIMATION_FRAMES;
        }
        let pos = self.mover.pos;
        if food.consume(pos.row, pos.col) {
            self.score += 1;
        }
    }

    pub fn view(&self) -> PacmanView {
        PacmanView {
            row: self.mover.pos.row,
            col: self.mover.pos.col,
            dir: self.mover.dir,
            score: self.score,
            animation_phase: self.animation_phase,
        }
    }
}
