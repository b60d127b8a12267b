use crate::agent::Mover;
use crate::boundary::Passability;
use crate::constants::{
    chaser_speed_divisor, AMBUSHER_LOOKAHEAD, EVADER_SHY_RADIUS, FLANKER_LOOKAHEAD,
};
use crate::types::{Direction, GhostKind, GhostView, Point, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetContext {
    pub pacman_pos: Point,
    pub pacman_dir: Direction,
    pub chaser_pos: Point,
    pub retreat: Point,
}

pub type Strategy = fn(Point, &TargetContext) -> Point;

pub fn strategy(kind: GhostKind) -> Strategy {
    match kind {
        GhostKind::Chaser => chase,
        GhostKind::Flanker => flank,
        GhostKind::Ambusher => ambush,
        GhostKind::Evader => evade,
    }
}

fn chase(_pos: Point, ctx: &TargetContext) -> Point {
    ctx.pacman_pos
}

fn ambush(_pos: Point, ctx: &TargetContext) -> Point {
    ctx.pacman_pos.ahead(ctx.pacman_dir, AMBUSHER_LOOKAHEAD)
}

fn flank(_pos: Point, ctx: &TargetContext) -> Point {
    let pivot = ctx.pacman_pos.ahead(ctx.pacman_dir, FLANKER_LOOKAHEAD);
    ctx.chaser_pos + (pivot - ctx.chaser_pos) * 2
}

fn evade(pos: Point, ctx: &TargetContext) -> Point {
    let radius = EVADER_SHY_RADIUS;
    if pos.distance_sq(ctx.pacman_pos) > radius * radius {
        ctx.pacman_pos
    } else {
        ctx.retreat
    }
}

/// Greedy step toward `target`: the enterable neighbour closest to it,
/// never the reverse of `heading` unless that is the only way out. Ties go to
/// the earlier entry of `Direction::CARDINAL`.
pub fn choose_direction(
    from: Point,
    heading: Direction,
    target: Point,
    passability: &Passability<'_>,
) -> Direction {
    let reverse = heading.opposite();
    let mut best: Option<(i64, Direction)> = None;
    for dir in Direction::CARDINAL {
        if heading.is_cardinal() && dir == reverse {
            continue;
        }
        let next = from.step(dir);
        if !passability.can_enter(next) {
            continue;
        }
        let distance = next.distance_sq(target);
        if best.map_or(true, |(closest, _)| distance < closest) {
            best = Some((distance, dir));
        }
    }

    match best {
        Some((_, dir)) => dir,
        None if heading.is_cardinal() && passability.can_enter(from.step(reverse)) => reverse,
        None => Direction::Stop,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ghost {
    pub kind: GhostKind,
    pub mover: Mover,
    pub target: Point,
    base_divisor: u32,
}

impl Ghost {
    pub fn new(kind: GhostKind, pos: Point, base_divisor: u32) -> Self {
        Self {
            kind,
            mover: Mover::new(pos, Direction::Up, base_divisor),
            target: pos,
            base_divisor: base_divisor.max(1),
        }
    }

    pub fn pos(&self) -> Point {
        self.mover.pos
    }

    pub fn base_divisor(&self) -> u32 {
        self.base_divisor
    }

    pub fn update(&mut self, ctx: &TargetContext, passability: &Passability<'_>) {
        self.target = strategy(self.kind)(self.mover.pos, ctx);
        self.mover.dir = choose_direction(self.mover.pos, self.mover.dir, self.target, passability);
        self.mover.tick(passability);
    }

    pub fn apply_score(&mut self, score: u32, score_per_speedup: u32) {
        if self.kind == GhostKind::Chaser {
            self.mover.speed_divisor =
                chaser_speed_divisor(self.base_divisor, score, score_per_speedup);
        }
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            role: Role::from(self.kind),
            row: self.mover.pos.row,
            col: self.mover.pos.col,
            dir: self.mover.dir,
            target: self.target,
            speed_divisor: self.mover.speed_divisor,
        }
    }
}
