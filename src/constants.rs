pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const VISIBLE_TILE_ROWS: usize = 12;
pub const BUFFER_TILE_ROWS: usize = 4;
pub const TILE_HEIGHT: usize = VISIBLE_TILE_ROWS + BUFFER_TILE_ROWS;
pub const TILE_WIDTH: usize = 5;
pub const FRONTIER_ROWS: usize = 2;
pub const PIECE_ID_BOUND: u16 = 200;

pub const TILE_SCALE: usize = 3;
pub const MAZE_MARGIN: usize = 5;
pub const MAZE_BORDER: usize = 2;
/// Fine-grid origin of tile (0, 0)'s wall block.
pub const MAZE_OFFSET: usize = 3;
pub const WALL_BLOCK: usize = 2;

pub const CELL_SIZE: u32 = 16;
pub const SCROLL_SPEED: u32 = 1;
pub const VISIBLE_HALF_ROWS: f32 = 14.0;

pub const PACMAN_SPEED_DIVISOR: u32 = 1;
pub const GHOST_SPEED_DIVISOR: u32 = 2;
pub const SCORE_PER_SPEEDUP: u32 = 50;
pub const PACMAN_ANIMATION_FRAMES: u8 = 4;

pub const AMBUSHER_LOOKAHEAD: i32 = 4;
pub const FLANKER_LOOKAHEAD: i32 = 2;
pub const EVADER_SHY_RADIUS: i64 = 8;
pub const EVADER_RETREAT_ROW_OFFSET: i32 = 10;
pub const EVADER_RETREAT_COL: i32 = 2;

pub fn scroll_period(cell_size: u32) -> u32 {
    TILE_SCALE as u32 * cell_size
}

pub fn chaser_speed_divisor(base: u32, score: u32, score_per_speedup: u32) -> u32 {
    if score_per_speedup == 0 {
        return base.max(1);
    }
    base.saturating_sub(score / score_per_speedup).max(1)
}

pub fn next_piece_id(id: u16, bound: u16) -> u16 {
    if bound == 0 {
        return id.saturating_add(1);
    }
    id % bound + 1
}
