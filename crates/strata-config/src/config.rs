//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_mesh::MeshMode;

use crate::error::ConfigError;

/// File name inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Largest view distance the streamer accepts, in chunks.
const MAX_VIEW_DISTANCE: u32 = 64;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub streaming: StreamingConfig,
    pub world: WorldConfig,
    pub debug: DebugConfig,
}

/// Background chunk streaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Radius of the loaded square around the observer, in chunks (1-64).
    pub view_distance: u32,
    /// Hard cap on loaded chunks.
    pub max_loaded_chunks: usize,
    /// Finished chunks merged into the world per frame.
    pub chunks_per_frame: usize,
    /// Extra rings kept loaded past the view distance.
    pub unload_margin: u32,
    /// Worker result channel capacity.
    pub result_capacity: usize,
}

/// World generation and meshing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Terrain seed.
    pub seed: u64,
    pub mesh_mode: MeshMode,
    /// Dirty chunks remeshed per frame.
    pub remesh_budget: usize,
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,strata_world=trace").
    pub log_level: String,
    /// Frames between statistics reports in the demo. 0 disables them.
    pub stats_interval: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            view_distance: 8,
            max_loaded_chunks: 1024,
            chunks_per_frame: 4,
            unload_margin: 0,
            result_capacity: 16,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            mesh_mode: MeshMode::Greedy,
            remesh_budget: 4,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 60,
        }
    }
}

/// `<platform config dir>/strata`, if the platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("strata"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Pulls out-of-range values back into range, warning about each one.
    pub fn sanitize(&mut self) {
        let streaming = &mut self.streaming;
        let clamped = streaming.view_distance.clamp(1, MAX_VIEW_DISTANCE);
        if clamped != streaming.view_distance {
            log::warn!("view_distance {} out of range, using {}", streaming.view_distance, clamped);
            streaming.view_distance = clamped;
        }
        if streaming.max_loaded_chunks == 0 {
            log::warn!("max_loaded_chunks must be at least 1");
            streaming.max_loaded_chunks = 1;
        }
        if streaming.chunks_per_frame == 0 {
            log::warn!("chunks_per_frame must be at least 1");
            streaming.chunks_per_frame = 1;
        }
        if streaming.result_capacity == 0 {
            log::warn!("result_capacity must be at least 1");
            streaming.result_capacity = 1;
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("view_distance: 8"));
        assert!(ron_str.contains("mesh_mode: Greedy"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(world: (seed: 99))").unwrap();
        assert_eq!(config.world.seed, 99);
        assert_eq!(config.world.remesh_budget, 4);
        assert_eq!(config.streaming, StreamingConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_mesh_mode_parses() {
        let config: Config = ron::from_str("(world: (mesh_mode: Simple))").unwrap();
        assert_eq!(config.world.mesh_mode, MeshMode::Simple);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.streaming.view_distance = 12;
        config.world.seed = 0xDEAD_BEEF;
        config.debug.log_level = "debug".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("strata");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.streaming.chunks_per_frame = 9;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap().unwrap();
        assert_eq!(reloaded.streaming.chunks_per_frame, 9);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_sanitize_clamps() {
        let mut config = Config::default();
        config.streaming.view_distance = 0;
        config.streaming.max_loaded_chunks = 0;
        config.streaming.result_capacity = 0;
        config.sanitize();
        assert_eq!(config.streaming.view_distance, 1);
        assert_eq!(config.streaming.max_loaded_chunks, 1);
        assert_eq!(config.streaming.result_capacity, 1);

        config.streaming.view_distance = 1000;
        config.sanitize();
        assert_eq!(config.streaming.view_distance, 64);
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// streaming tweaks\n(\n  streaming: (view_distance: 4), // closer\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.streaming.view_distance, 4);
    }
}
