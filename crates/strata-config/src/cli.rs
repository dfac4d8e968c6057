//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Streams a voxel world around a moving observer")]
pub struct CliArgs {
    /// View distance in chunks.
    #[arg(long)]
    pub view_distance: Option<u32>,

    /// Maximum number of loaded chunks.
    #[arg(long)]
    pub max_loaded_chunks: Option<usize>,

    /// Finished chunks merged per frame.
    #[arg(long)]
    pub chunks_per_frame: Option<usize>,

    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(distance) = args.view_distance {
            self.streaming.view_distance = distance;
        }
        if let Some(max) = args.max_loaded_chunks {
            self.streaming.max_loaded_chunks = max;
        }
        if let Some(count) = args.chunks_per_frame {
            self.streaming.chunks_per_frame = count;
        }
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            view_distance: Some(3),
            seed: Some(7),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.streaming.view_distance, 3);
        assert_eq!(config.world.seed, 7);
        // Non-overridden fields retain defaults
        assert_eq!(config.streaming.max_loaded_chunks, 1024);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "strata",
            "--view-distance",
            "5",
            "--log-level",
            "debug",
            "--frames",
            "10",
        ]);
        assert_eq!(args.view_distance, Some(5));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.frames, 10);
        assert_eq!(args.seed, None);
    }

    #[test]
    fn test_frames_default() {
        let args = CliArgs::parse_from(["strata"]);
        assert_eq!(args.frames, 600);
    }
}
