use crate::agent::Pacman;
use crate::boundary::{BoundaryOracle, Passability, ScrollView, VisibleRows};
use crate::config::GameConfig;
use crate::constants::{next_piece_id, EVADER_RETREAT_COL, EVADER_RETREAT_ROW_OFFSET};
use crate::error::{GameError, GenerationError};
use crate::food::FoodField;
use crate::ghost::{Ghost, TargetContext};
use crate::maze::MazeGrid;
use crate::rng::Rng;
use crate::tiles::{TileGenerator, TileGrid};
use crate::types::{Direction, GhostKind, GhostView, Point, Role, Snapshot};

mod scroll_system;
mod spawn_system;

pub struct World {
    config: GameConfig,
    rng: Rng,
    generator: TileGenerator,
    tiles: TileGrid,
    maze: MazeGrid,
    food: FoodField,
    pacman: Pacman,
    ghosts: Vec<Ghost>,
    boundary: Box<dyn BoundaryOracle + Send>,
    scroll_offset: u32,
    tick_counter: u64,
    next_piece_id: u16,
    regenerations: u64,
}

impl World {
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = Rng::new(seed);
        let generator = TileGenerator::new(config.frontier_rows, config.piece_id_bound);
        let mut tiles = TileGrid::new(config.tile_height, config.tile_width);
        let next_id = generator.fill(&mut tiles, 1, &mut rng)?;
        Ok(Self::assemble(config, rng, generator, tiles, next_id))
    }

    pub fn from_tiles(config: GameConfig, tiles: TileGrid, seed: u32) -> Result<Self, GameError> {
        config.validate()?;
        let generator = TileGenerator::new(config.frontier_rows, config.piece_id_bound);
        let next_id = next_piece_id(tiles.max_id(), config.piece_id_bound);
        Ok(Self::assemble(config, Rng::new(seed), generator, tiles, next_id))
    }

    fn assemble(
        config: GameConfig,
        rng: Rng,
        generator: TileGenerator,
        tiles: TileGrid,
        next_piece_id: u16,
    ) -> Self {
        let maze = MazeGrid::from_tiles(&tiles);
        let food = FoodField::from_maze(&maze);
        let boundary = Box::new(VisibleRows {
            half_rows: config.visible_half_rows,
        });
        let mut world = Self {
            pacman: Pacman::new(Point::default(), config.pacman_speed_divisor),
            config,
            rng,
            generator,
            tiles,
            maze,
            food,
            ghosts: Vec::new(),
            boundary,
            scroll_offset: 0,
            tick_counter: 0,
            next_piece_id,
            regenerations: 0,
        };
        world.spawn_agents();
        world
    }

    pub fn with_boundary(mut self, boundary: impl BoundaryOracle + Send + 'static) -> Self {
        self.boundary = Box::new(boundary);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub fn maze(&self) -> &MazeGrid {
        &self.maze
    }

    pub fn food(&self) -> &FoodField {
        &self.food
    }

    pub fn pacman(&self) -> &Pacman {
        &self.pacman
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, kind: GhostKind) -> Option<&Ghost> {
        self.ghosts.iter().find(|ghost| ghost.kind == kind)
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    pub fn next_piece_id(&self) -> u16 {
        self.next_piece_id
    }

    pub fn scroll_view(&self) -> ScrollView {
        ScrollView {
            maze_height: self.maze.height(),
            scroll_offset: self.scroll_offset,
            cell_size: self.config.cell_size,
        }
    }

    pub fn can_enter(&self, pos: Point) -> bool {
        self.maze.is_walkable_at(pos) && self.boundary.contains(&self.scroll_view(), pos)
    }

    pub fn retreat_point(&self) -> Point {
        Point::new(
            self.maze.height() as i32 / 2 + EVADER_RETREAT_ROW_OFFSET,
            EVADER_RETREAT_COL,
        )
    }

    pub fn set_direction(&mut self, role: Role, dir: Direction) {
        if !dir.is_cardinal() {
            return;
        }
        match role.ghost_kind() {
            None => self.pacman.mover.dir = dir,
            Some(kind) => {
                if let Some(ghost) = self.ghosts.iter_mut().find(|ghost| ghost.kind == kind) {
                    ghost.mover.dir = dir;
                }
            }
        }
    }

    /// One frame: Pacman, the ghosts in update order, the Chaser's speed, then
    /// scroll bookkeeping. A generation failure aborts the cascade and leaves
    /// the maze as it was.
    pub fn tick(&mut self) -> Result<(), GenerationError> {
        self.tick_counter += 1;
        let retreat = self.retreat_point();
        let passability = Passability {
            maze: &self.maze,
            boundary: &*self.boundary,
            view: ScrollView {
                maze_height: self.maze.height(),
                scroll_offset: self.scroll_offset,
                cell_size: self.config.cell_size,
            },
        };

        self.pacman.update(&passability, &mut self.food);

        let mut chaser_pos = self
            .ghosts
            .iter()
            .find(|ghost| ghost.kind == GhostKind::Chaser)
            .map(Ghost::pos)
            .unwrap_or_else(|| self.pacman.pos());
        for ghost in &mut self.ghosts {
            let ctx = TargetContext {
                pacman_pos: self.pacman.pos(),
                pacman_dir: self.pacman.dir(),
                chaser_pos,
                retreat,
            };
            ghost.update(&ctx, &passability);
            if ghost.kind == GhostKind::Chaser {
                chaser_pos = ghost.pos();
            }
        }

        let score = self.pacman.score;
        for ghost in &mut self.ghosts {
            ghost.apply_score(score, self.config.score_per_speedup);
        }

        self.advance_scroll()
    }

    pub fn ghost_views(&self) -> Vec<GhostView> {
        self.ghosts.iter().map(Ghost::view).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let rows = (0..self.maze.height() as i32)
            .map(|row| {
                (0..self.maze.width() as i32)
                    .map(|col| {
                        if self.maze.is_wall(row, col) {
                            '#'
                        } else if self.food.has_food(row, col) {
                            '.'
                        } else {
                            ' '
                        }
                    })
                    .collect()
            })
            .collect();
        Snapshot {
            tick: self.tick_counter,
            scroll_offset: self.scroll_offset,
            regenerations: self.regenerations,
            width: self.maze.width(),
            height: self.maze.height(),
            rows,
            food_remaining: self.food.remaining(),
            pacman: self.pacman.view(),
            ghosts: self.ghost_views(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::boundary::Unbounded;
    use crate::config::GhostDivisors;
    use crate::constants::{scroll_period, TILE_SCALE};
    use crate::error::ConfigError;

    use super::*;

    fn open_world(rows: usize, cols: usize) -> World {
        let tiles = TileGrid::lattice(rows, cols);
        World::from_tiles(GameConfig::default(), tiles, 7)
            .expect("world should build")
            .with_boundary(Unbounded)
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let mut a = World::new(GameConfig::default(), 424_242).expect("world a");
        let mut b = World::new(GameConfig::default(), 424_242).expect("world b");
        assert_eq!(a.tiles(), b.tiles());
        for _ in 0..400 {
            a.tick().expect("tick a");
            b.tick().expect("tick b");
            assert_eq!(a.snapshot(), b.snapshot());
        }
        assert!(a.regenerations() > 0);
    }

    #[test]
    fn different_seeds_build_different_mazes() {
        let a = World::new(GameConfig::default(), 1).expect("world a");
        let b = World::new(GameConfig::default(), 2).expect("world b");
        assert_ne!(a.tiles(), b.tiles());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            tile_width: 0,
            ..GameConfig::default()
        };
        let result = World::new(config, 1);
        assert!(matches!(
            result,
            Err(GameError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn regeneration_runs_once_per_scroll_period() {
        let mut world = World::new(GameConfig::default(), 99).expect("world");
        world.pacman.mover.dir = Direction::Stop;
        let period = scroll_period(world.config().cell_size);
        for _ in 1..period {
            world.tick().expect("tick");
        }
        assert_eq!(world.scroll_offset(), period - 1);
        assert_eq!(world.regenerations(), 0);

        let tiles_before = world.tiles().clone();
        let pacman_before = world.pacman().pos();
        world.tick().expect("cascade tick");

        assert_eq!(world.scroll_offset(), 0);
        assert_eq!(world.regenerations(), 1);
        assert_eq!(
            world.pacman().pos(),
            Point::new(pacman_before.row + TILE_SCALE as i32, pacman_before.col)
        );
        let frontier = world.config().frontier_rows;
        let height = world.tiles().height();
        for row in frontier + 1..height {
            assert_eq!(world.tiles().rows()[row], tiles_before.rows()[row - 1]);
        }
        assert!(world.tiles().rows()[frontier].iter().all(|id| *id > 0));
        assert_eq!(world.maze(), &MazeGrid::from_tiles(world.tiles()));
    }

    #[test]
    fn eaten_food_stays_eaten_after_cascade() {
        let mut world = World::new(GameConfig::default(), 5).expect("world");
        world.pacman.mover.dir = Direction::Stop;
        world.ghosts.clear();
        let eaten = (20..40)
            .flat_map(|row| (0..world.maze().width() as i32).map(move |col| Point::new(row, col)))
            .find(|pos| world.food().has_food(pos.row, pos.col) && *pos != world.pacman().pos())
            .expect("food below the top rows");
        assert!(world.food.consume(eaten.row, eaten.col));

        let period = scroll_period(world.config().cell_size);
        for _ in 0..period {
            world.tick().expect("tick");
        }
        assert_eq!(world.regenerations(), 1);
        assert!(!world.food().has_food(eaten.row + TILE_SCALE as i32, eaten.col));
        for row in 0..world.maze().height() as i32 {
            for col in 0..world.maze().width() as i32 {
                if world.food().has_food(row, col) {
                    assert!(world.maze().is_walkable(row, col), "({row},{col})");
                }
            }
        }
    }

    #[test]
    fn piece_ids_carry_across_cascades() {
        let mut world = World::new(GameConfig::default(), 13).expect("world");
        let before = world.next_piece_id();
        let period = scroll_period(world.config().cell_size);
        for _ in 0..period * 10 {
            world.tick().expect("tick");
        }
        assert_eq!(world.regenerations(), 10);
        assert_ne!(world.next_piece_id(), before);
        assert!(world.next_piece_id() <= world.config().piece_id_bound);
    }

    #[test]
    fn agents_spawn_on_distinct_walkable_cells() {
        for seed in 0..30u32 {
            let world = World::new(GameConfig::default(), seed).expect("world");
            let mut cells = vec![world.pacman().pos()];
            cells.extend(world.ghosts().iter().map(Ghost::pos));
            assert_eq!(cells.len(), 5);
            for (idx, cell) in cells.iter().enumerate() {
                assert!(world.maze().is_walkable_at(*cell), "seed={seed} {cell:?}");
                assert!(!cells[idx + 1..].contains(cell), "seed={seed} duplicate {cell:?}");
                assert!(cell.row <= world.maze().height() as i32 / 2);
            }
            let kinds: Vec<GhostKind> = world.ghosts().iter().map(|ghost| ghost.kind).collect();
            assert_eq!(kinds, GhostKind::UPDATE_ORDER.to_vec());
        }
    }

    #[test]
    fn pacman_reaches_every_ghost_across_cascades() {
        for seed in 0..20u32 {
            let mut world = World::new(GameConfig::default(), seed).expect("world");
            for _ in 0..4 {
                let region = world.maze().reachable_from(world.pacman().pos());
                assert_eq!(region.len(), world.maze().walkable_count(), "seed={seed}");
                for ghost in world.ghosts() {
                    assert!(region.contains(&ghost.pos()), "seed={seed} {:?}", ghost.kind);
                }
                world.regenerate().expect("regenerate");
            }
        }
    }

    #[test]
    fn pacman_scores_once_on_single_food_cell() {
        let mut world = open_world(3, 3);
        world.ghosts.clear();
        world.pacman = Pacman::new(Point::new(2, 2), 1);
        world.pacman.mover.dir = Direction::Right;
        for row in 0..world.maze.height() as i32 {
            for col in 0..world.maze.width() as i32 {
                if (row, col) != (2, 3) {
                    world.food.consume(row, col);
                }
            }
        }
        assert_eq!(world.food().remaining(), 1);

        world.tick().expect("tick");
        assert_eq!(world.pacman().pos(), Point::new(2, 3));
        assert_eq!(world.pacman().score, 1);
        assert!(!world.food().has_food(2, 3));

        world.tick().expect("tick");
        assert_eq!(world.pacman().score, 1);
    }

    #[test]
    fn flanker_reads_chaser_position_from_same_tick() {
        let mut world = open_world(16, 5);
        world.pacman = Pacman::new(Point::new(24, 2), 1);
        world.pacman.mover.dir = Direction::Stop;
        let mut chaser = Ghost::new(GhostKind::Chaser, Point::new(2, 2), 1);
        chaser.mover.dir = Direction::Down;
        let flanker = Ghost::new(GhostKind::Flanker, Point::new(2, 29), 1);
        world.ghosts = vec![chaser, flanker];

        world.tick().expect("tick");
        let chaser = world.ghost(GhostKind::Chaser).expect("chaser");
        assert_eq!(chaser.pos(), Point::new(3, 2));
        let flanker = world.ghost(GhostKind::Flanker).expect("flanker");
        // (3, 2) + 2 * ((24, 2) - (3, 2)), not the stale (2, 2) origin.
        assert_eq!(flanker.target, Point::new(45, 2));
    }

    #[test]
    fn chaser_divisor_tracks_score_each_tick() {
        let config = GameConfig {
            ghost_speed_divisors: GhostDivisors {
                chaser: 8,
                ..GhostDivisors::default()
            },
            ..GameConfig::default()
        };
        let mut world = World::new(config, 3).expect("world");
        world.pacman.score = 120;
        world.tick().expect("tick");
        let chaser = world.ghost(GhostKind::Chaser).expect("chaser");
        assert_eq!(chaser.view().speed_divisor, 6);
        let flanker = world.ghost(GhostKind::Flanker).expect("flanker");
        assert_eq!(flanker.view().speed_divisor, 2);
    }

    #[test]
    fn set_direction_ignores_stop() {
        let mut world = World::new(GameConfig::default(), 1).expect("world");
        world.set_direction(Role::Pacman, Direction::Left);
        assert_eq!(world.pacman().dir(), Direction::Left);
        world.set_direction(Role::Pacman, Direction::Stop);
        assert_eq!(world.pacman().dir(), Direction::Left);
        world.set_direction(Role::Evader, Direction::Right);
        assert_eq!(
            world.ghost(GhostKind::Evader).map(|ghost| ghost.mover.dir),
            Some(Direction::Right)
        );
    }

    #[test]
    fn closed_boundary_freezes_every_agent() {
        let mut world = World::new(GameConfig::default(), 21)
            .expect("world")
            .with_boundary(|_: &ScrollView, _: Point| false);
        let pacman = world.pacman().pos();
        let ghosts: Vec<Point> = world.ghosts().iter().map(Ghost::pos).collect();
        for _ in 0..10 {
            world.tick().expect("tick");
        }
        assert_eq!(world.pacman().pos(), pacman);
        let after: Vec<Point> = world.ghosts().iter().map(Ghost::pos).collect();
        assert_eq!(after, ghosts);
        assert!(world
            .ghosts()
            .iter()
            .all(|ghost| ghost.mover.dir == Direction::Stop));
    }

    #[test]
    fn snapshot_rows_mirror_walls_and_food() {
        let mut world = World::new(GameConfig::default(), 8).expect("world");
        let pos = world.pacman().pos();
        world.food.consume(pos.row, pos.col);
        let snapshot = world.snapshot();
        assert_eq!(snapshot.rows.len(), snapshot.height);
        assert_eq!(snapshot.ghosts.len(), 4);
        for (row, line) in snapshot.rows.iter().enumerate() {
            assert_eq!(line.chars().count(), snapshot.width);
            for (col, cell) in line.chars().enumerate() {
                let (r, c) = (row as i32, col as i32);
                let expected = if world.maze().is_wall(r, c) {
                    '#'
                } else if world.food().has_food(r, c) {
                    '.'
                } else {
                    ' '
                };
                assert_eq!(cell, expected);
            }
        }
        assert_eq!(snapshot.rows[pos.row as usize].chars().nth(pos.col as usize), Some(' '));
        assert_eq!(snapshot.food_remaining, world.food().remaining());
    }
}
