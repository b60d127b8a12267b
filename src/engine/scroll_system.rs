use crate::constants::{scroll_period, TILE_SCALE};

use super::*;

impl World {
    pub(super) fn advance_scroll(&mut self) -> Result<(), GenerationError> {
        let offset = self.scroll_offset + self.config.scroll_speed;
        if offset < scroll_period(self.config.cell_size) {
            self.scroll_offset = offset;
            return Ok(());
        }
        self.regenerate()?;
        self.scroll_offset = 0;
        Ok(())
    }

    /// Extends the tile grid by one row and rebuilds maze and food from it.
    /// Everything is built on copies first so a failure leaves the world as
    /// it was.
    pub(super) fn regenerate(&mut self) -> Result<(), GenerationError> {
        let mut tiles = self.tiles.clone();
        let mut rng = self.rng.clone();
        tiles.push_front_row();
        // Rows below the frontier are already tiled; only the one entering it
        // takes anchors.
        let last_col = tiles.width().saturating_sub(1);
        let next_piece_id = self.generator.generate(
            &mut tiles,
            self.generator.frontier_rows,
            last_col,
            self.next_piece_id,
            &mut rng,
        )?;
        let maze = MazeGrid::from_tiles(&tiles);
        let mut food = self.food.clone();
        food.scroll(&self.maze, &maze);

        let shift = TILE_SCALE as i32;
        self.pacman.mover.shift_rows(shift);
        for ghost in &mut self.ghosts {
            ghost.mover.shift_rows(shift);
            ghost.target.row += shift;
        }
        self.tiles = tiles;
        self.rng = rng;
        self.maze = maze;
        self.food = food;
        self.next_piece_id = next_piece_id;
        self.regenerations += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_accumulates_until_one_tile_row() {
        let config = GameConfig {
            scroll_speed: 5,
            ..GameConfig::default()
        };
        let mut world = World::new(config, 4).expect("world");
        for _ in 0..9 {
            world.advance_scroll().expect("scroll");
        }
        assert_eq!(world.scroll_offset(), 45);
        assert_eq!(world.regenerations(), 0);
        // 50 overshoots the 48 px period and still triggers exactly once.
        world.advance_scroll().expect("scroll");
        assert_eq!(world.scroll_offset(), 0);
        assert_eq!(world.regenerations(), 1);
    }

    #[test]
    fn regenerate_shifts_agents_and_targets() {
        let mut world = World::new(GameConfig::default(), 6).expect("world");
        let pacman = world.pacman().pos();
        let ghosts: Vec<(Point, Point)> = world
            .ghosts()
            .iter()
            .map(|ghost| (ghost.pos(), ghost.target))
            .collect();
        world.regenerate().expect("regenerate");
        assert_eq!(world.pacman().pos(), Point::new(pacman.row + 3, pacman.col));
        for (ghost, (pos, target)) in world.ghosts().iter().zip(ghosts) {
            assert_eq!(ghost.pos(), Point::new(pos.row + 3, pos.col));
            assert_eq!(ghost.target, Point::new(target.row + 3, target.col));
        }
        assert_eq!(world.scroll_offset(), 0);
    }

    #[test]
    fn agents_on_floor_stay_on_floor_after_shift() {
        for seed in 0..20u32 {
            let mut world = World::new(GameConfig::default(), seed).expect("world");
            // Spawns sit in the upper half, so three shifts stay clear of the
            // dropped bottom row.
            for _ in 0..3 {
                let before: Vec<Point> = std::iter::once(world.pacman().pos())
                    .chain(world.ghosts().iter().map(Ghost::pos))
                    .collect();
                let on_floor: Vec<bool> = before
                    .iter()
                    .map(|pos| world.maze().is_walkable_at(*pos))
                    .collect();
                world.regenerate().expect("regenerate");
                let after = std::iter::once(world.pacman().pos())
                    .chain(world.ghosts().iter().map(Ghost::pos));
                for (pos, floor) in after.zip(on_floor) {
                    if floor {
                        assert!(world.maze().is_walkable_at(pos), "seed={seed} {pos:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn failed_cascade_leaves_world_untouched() {
        let mut world = World::new(GameConfig::default(), 12).expect("world");
        let height = world.tiles().height();
        world.generator = TileGenerator::new(height, world.config().piece_id_bound);
        let tiles = world.tiles().clone();
        let before = world.snapshot();
        let next_id = world.next_piece_id();

        let result = world.regenerate();
        assert!(matches!(
            result,
            Err(GenerationError::StartOutOfBounds { row, .. }) if row == height
        ));
        assert_eq!(world.tiles(), &tiles);
        assert_eq!(world.maze(), &MazeGrid::from_tiles(&tiles));
        assert_eq!(world.snapshot(), before);
        assert_eq!(world.next_piece_id(), next_id);
        assert_eq!(world.regenerations(), 0);
    }

    #[test]
    fn failed_cascade_keeps_scroll_offset_for_retry() {
        let mut world = World::new(GameConfig::default(), 12).expect("world");
        let period = scroll_period(world.config().cell_size);
        world.scroll_offset = period - 1;
        let height = world.tiles().height();
        world.generator = TileGenerator::new(height, world.config().piece_id_bound);

        assert!(world.advance_scroll().is_err());
        assert_eq!(world.scroll_offset(), period - 1);

        let config = world.config().clone();
        world.generator = TileGenerator::new(config.frontier_rows, config.piece_id_bound);
        world.advance_scroll().expect("scroll");
        assert_eq!(world.scroll_offset(), 0);
        assert_eq!(world.regenerations(), 1);
    }

    #[test]
    fn cascade_matches_a_full_bottom_up_fill() {
        let mut world = World::new(GameConfig::default(), 77).expect("world");
        let mut tiles = world.tiles().clone();
        let mut rng = world.rng.clone();
        tiles.push_front_row();
        let next_id = world
            .generator
            .fill(&mut tiles, world.next_piece_id(), &mut rng)
            .expect("fill");

        world.regenerate().expect("regenerate");
        assert_eq!(world.tiles(), &tiles);
        assert_eq!(world.next_piece_id(), next_id);
    }

    #[test]
    fn maze_is_rebuilt_from_extended_tiles() {
        let mut world = World::new(GameConfig::default(), 31).expect("world");
        let height = world.tiles().height();
        let width = world.tiles().width();
        world.regenerate().expect("regenerate");
        assert_eq!(world.tiles().height(), height);
        assert_eq!(world.tiles().width(), width);
        assert_eq!(world.maze(), &MazeGrid::from_tiles(world.tiles()));
        assert_eq!(world.food().cells().len(), world.maze().height());
    }
}
