use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Tunables for a run. Every field has a default, so a config file only needs
/// to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub map_width: i32,
    pub map_height: i32,
    /// Radius of both the player's view and every hostile's detection sweep.
    pub fov_radius: i32,
    /// Extra path cost for a cell holding a blocking entity.
    pub path_penalty: i32,
    /// Chebyshev range at which actors are sensed without line of sight.
    pub scent_radius: i32,
    /// Like `scent_radius`, but close enough to tell who it is.
    pub identity_radius: i32,
    /// Turns an NPC goes between breaks before the need takes over.
    pub need_threshold: u32,
    /// Turns an NPC has to spend inside the restroom.
    pub relief_duration: u32,
    pub melee_damage: i32,
    /// Turns a bitten NPC stays pinned; a second bite inside the window kills.
    pub eat_duration: i32,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Room placements tried per layout before the layout is thrown away.
    pub max_attempts: u32,
    /// Whole-layout restarts before generation gives up.
    pub max_restarts: u32,
    pub chunk_size: i32,
    /// No monster spawns closer than this (Chebyshev) to the upstairs.
    pub spawn_exclusion_radius: i32,
    /// Probability that an otherwise valid item spawn is rejected.
    pub item_reject_chance: f64,
    pub maze_floors: Vec<u32>,
    pub maze_ends_at_edge: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_c0de,
            map_width: 57,
            map_height: 50,
            fov_radius: 8,
            path_penalty: 10,
            scent_radius: 0,
            identity_radius: 0,
            need_threshold: 240,
            relief_duration: 10,
            melee_damage: 1,
            eat_duration: 3,
            generation: GenerationConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5000,
            max_restarts: 20,
            chunk_size: 6,
            spawn_exclusion_radius: 10,
            item_reject_chance: 0.95,
            maze_floors: vec![6],
            maze_ends_at_edge: false,
        }
    }
}

impl GameConfig {
    /// Load a config from a TOML file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width < 20 || self.map_height < 20 {
            return Err(ConfigError::Invalid(format!(
                "map must be at least 20x20, got {}x{}",
                self.map_width, self.map_height
            )));
        }
        if self.fov_radius < 1 {
            return Err(ConfigError::Invalid(format!(
                "fov_radius must be >= 1, got {}",
                self.fov_radius
            )));
        }
        if self.path_penalty < 0 {
            return Err(ConfigError::Invalid(format!(
                "path_penalty must be >= 0, got {}",
                self.path_penalty
            )));
        }
        if self.eat_duration < 1 {
            return Err(ConfigError::Invalid(format!(
                "eat_duration must be >= 1, got {}",
                self.eat_duration
            )));
        }
        if self.generation.chunk_size < 1 {
            return Err(ConfigError::Invalid(format!(
                "chunk_size must be >= 1, got {}",
                self.generation.chunk_size
            )));
        }
        if !(0.0..=1.0).contains(&self.generation.item_reject_chance) {
            return Err(ConfigError::Invalid(format!(
                "item_reject_chance must be 0.0-1.0, got {}",
                self.generation.item_reject_chance
            )));
        }
        if self.generation.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fov_radius, 8);
        assert_eq!(config.path_penalty, 10);
        assert_eq!(config.need_threshold, 240);
        assert_eq!(config.relief_duration, 10);
        assert_eq!(config.generation.max_attempts, 5000);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 42\nfov_radius = 6\n\n[generation]\nmax_restarts = 3").unwrap();

        let config = GameConfig::from_file(file.path()).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.fov_radius, 6);
        assert_eq!(config.generation.max_restarts, 3);
        assert_eq!(config.generation.chunk_size, 6);
        assert_eq!(config.map_width, 57);
    }

    #[test]
    fn rejects_tiny_map() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "map_width = 5").unwrap();

        let err = GameConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn reports_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = = 1").unwrap();

        let err = GameConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = GameConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
