use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CELL_SIZE, FRONTIER_ROWS, GHOST_SPEED_DIVISOR, PACMAN_SPEED_DIVISOR, PIECE_ID_BOUND,
    SCORE_PER_SPEEDUP, SCROLL_SPEED, TILE_HEIGHT, TILE_WIDTH, VISIBLE_HALF_ROWS,
};
use crate::error::ConfigError;
use crate::types::GhostKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostDivisors {
    pub chaser: u32,
    pub flanker: u32,
    pub ambusher: u32,
    pub evader: u32,
}

impl Default for GhostDivisors {
    fn default() -> Self {
        Self {
            chaser: GHOST_SPEED_DIVISOR,
            flanker: GHOST_SPEED_DIVISOR,
            ambusher: GHOST_SPEED_DIVISOR,
            evader: GHOST_SPEED_DIVISOR,
        }
    }
}

impl GhostDivisors {
    pub fn for_kind(&self, kind: GhostKind) -> u32 {
        match kind {
            GhostKind::Chaser => self.chaser,
            GhostKind::Flanker => self.flanker,
            GhostKind::Ambusher => self.ambusher,
            GhostKind::Evader => self.evader,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Tile rows including the off-screen buffer.
    pub tile_height: usize,
    /// Tile columns before mirroring.
    pub tile_width: usize,
    pub frontier_rows: usize,
    pub cell_size: u32,
    pub scroll_speed: u32,
    pub pacman_speed_divisor: u32,
    pub ghost_speed_divisors: GhostDivisors,
    pub score_per_speedup: u32,
    pub piece_id_bound: u16,
    pub visible_half_rows: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_height: TILE_HEIGHT,
            tile_width: TILE_WIDTH,
            frontier_rows: FRONTIER_ROWS,
            cell_size: CELL_SIZE,
            scroll_speed: SCROLL_SPEED,
            pacman_speed_divisor: PACMAN_SPEED_DIVISOR,
            ghost_speed_divisors: GhostDivisors::default(),
            score_per_speedup: SCORE_PER_SPEEDUP,
            piece_id_bound: PIECE_ID_BOUND,
            visible_half_rows: VISIBLE_HALF_ROWS,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_height == 0 || self.tile_width == 0 {
            return Err(ConfigError::Invalid("tile dimensions must be positive"));
        }
        if self.frontier_rows >= self.tile_height {
            return Err(ConfigError::Invalid(
                "frontierRows must leave at least one generated tile row",
            ));
        }
        if self.cell_size == 0 || self.scroll_speed == 0 {
            return Err(ConfigError::Invalid("cellSize and scrollSpeed must be positive"));
        }
        let divisors = self.ghost_speed_divisors;
        if self.pacman_speed_divisor == 0
            || GhostKind::UPDATE_ORDER
                .iter()
                .any(|kind| divisors.for_kind(*kind) == 0)
        {
            return Err(ConfigError::Invalid("speed divisors must be positive"));
        }
        if self.score_per_speedup == 0 {
            return Err(ConfigError::Invalid("scorePerSpeedup must be positive"));
        }
        if self.piece_id_bound == 0 {
            return Err(ConfigError::Invalid("pieceIdBound must be positive"));
        }
        if !self.visible_half_rows.is_finite() || self.visible_half_rows < 0.0 {
            return Err(ConfigError::Invalid("visibleHalfRows must be a non-negative number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("infinite-packman-{name}-{now}.json"))
    }

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tile_height, 16);
        assert_eq!(config.tile_width, 5);
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let mut config = GameConfig::default();
        config.ghost_speed_divisors.evader = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn frontier_must_leave_room_for_generation() {
        let config = GameConfig {
            tile_height: 2,
            frontier_rows: 2,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{"tileWidth": 7, "ghostSpeedDivisors": {"chaser": 8}}"#)
            .expect("write temp config");
        let config = GameConfig::load(&path).expect("config should load");
        let _ = fs::remove_file(&path);

        assert_eq!(config.tile_width, 7);
        assert_eq!(config.ghost_speed_divisors.chaser, 8);
        assert_eq!(config.ghost_speed_divisors.flanker, GHOST_SPEED_DIVISOR);
        assert_eq!(config.score_per_speedup, SCORE_PER_SPEEDUP);
    }

    #[test]
    fn missing_file_reports_read_error() {
        let path = temp_path("missing").join("nope.json");
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let path = temp_path("malformed");
        fs::write(&path, "{ not json").expect("write temp config");
        let result = GameConfig::load(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
