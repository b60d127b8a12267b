use super::*;

impl World {
    pub(super) fn spawn_agents(&mut self) {
        let wanted = 1 + GhostKind::UPDATE_ORDER.len();
        let found = self.find_spawn_cells(wanted);
        let centre = Point::new(
            self.maze.height() as i32 / 2,
            self.maze.width() as i32 / 2,
        );
        let fallback = found.last().copied().unwrap_or(centre);
        let mut cells = found.into_iter().chain(std::iter::repeat(fallback));

        let pacman_cell = cells.next().unwrap_or(fallback);
        self.pacman = Pacman::new(pacman_cell, self.config.pacman_speed_divisor);

        self.ghosts = GhostKind::UPDATE_ORDER
            .iter()
            .map(|kind| {
                let cell = cells.next().unwrap_or(fallback);
                Ghost::new(*kind, cell, self.config.ghost_speed_divisors.for_kind(*kind))
            })
            .collect();
    }

    pub(super) fn find_spawn_cells(&self, count: usize) -> Vec<Point> {
        let mut found = Vec::with_capacity(count);
        for row in (0..=self.maze.height() / 2).rev() {
            for col in 0..self.maze.width() {
                if found.len() == count {
                    return found;
                }
                let cell = Point::new(row as i32, col as i32);
                if self.maze.is_walkable_at(cell) {
                    found.push(cell);
                }
            }
        }
        found
    }
}
