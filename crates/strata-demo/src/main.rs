//! Headless demo that walks an observer across a streamed voxel world.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo -- --frames 300 --view-distance 6`.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec3;
use strata_config::{CliArgs, Config, StreamingConfig, default_config_dir};
use strata_mesh::FLOATS_PER_VERTEX;
use strata_voxel::{CHUNK_HEIGHT, Voxel, WorldPos};
use strata_world::{ChunkStreamer, MeshUploadTracker, StreamerConfig, VoxelWorld, WorldError};
use tracing::{info, warn};

/// Simulated frame length.
const FRAME_TIME: Duration = Duration::from_millis(16);
/// Observer speed in blocks per frame.
const WALK_SPEED: f32 = 0.75;
/// Frames between voxel edits under the observer.
const DIG_INTERVAL: u32 = 120;

/// Totals reported at the end of the run.
#[derive(Debug, Default)]
struct RunStats {
    frames: u32,
    loaded: usize,
    unloaded: usize,
    dropped: usize,
    remeshed: usize,
    uploads: usize,
    uploaded_vertices: usize,
    edits: usize,
}

fn streamer_config(streaming: &StreamingConfig) -> StreamerConfig {
    StreamerConfig {
        view_distance: streaming.view_distance,
        max_loaded_chunks: streaming.max_loaded_chunks,
        chunks_per_frame: streaming.chunks_per_frame,
        unload_margin: streaming.unload_margin,
        result_capacity: streaming.result_capacity,
    }
}

/// Observer position after `frame` frames: a diagonal walk at fixed height.
fn observer_at(frame: u32) -> Vec3 {
    let t = frame as f32 * WALK_SPEED;
    Vec3::new(8.0 + t, 96.0, 8.0 + t * 0.5)
}

/// Removes the topmost solid voxel of the column under `observer`.
fn dig_below(world: &mut VoxelWorld, observer: Vec3) -> Option<WorldPos> {
    let x = observer.x.floor() as i32;
    let z = observer.z.floor() as i32;
    let top = (0..CHUNK_HEIGHT as i32)
        .rev()
        .map(|y| WorldPos::new(x, y, z))
        .find(|&pos| world.get_voxel(pos).is_some_and(Voxel::is_solid))?;
    world.set_voxel(top, Voxel::AIR).then_some(top)
}

fn run(config: &Config, frames: u32) -> Result<RunStats, WorldError> {
    let mut world = VoxelWorld::with_seed(config.world.seed);
    world.set_mesh_mode(config.world.mesh_mode);
    world.set_remesh_budget(config.world.remesh_budget);

    let mut streamer = ChunkStreamer::for_world(streamer_config(&config.streaming), &world)?;
    let mut uploads = MeshUploadTracker::new();
    let mut stats = RunStats::default();
    let started = Instant::now();

    for frame in 0..frames {
        let observer = observer_at(frame);

        let tick = streamer.update(observer, &mut world);
        for &pos in &tick.unloaded {
            uploads.forget(pos);
        }
        stats.loaded += tick.loaded.len();
        stats.unloaded += tick.unloaded.len();
        stats.dropped += tick.dropped;

        if frame > 0
            && frame % DIG_INTERVAL == 0
            && let Some(pos) = dig_below(&mut world, observer)
        {
            stats.edits += 1;
            info!("Frame {}: dug out {:?}", frame, pos);
        }

        let observer_voxel = WorldPos::new(
            observer.x.floor() as i32,
            observer.y.floor() as i32,
            observer.z.floor() as i32,
        );
        stats.remeshed += world.update(observer_voxel).len();

        // Stand-in for a GPU upload.
        for pos in uploads.pending_uploads(&world) {
            if let Some(chunk) = world.get_chunk(pos) {
                stats.uploads += 1;
                stats.uploaded_vertices += chunk.mesh_vertices().len() / FLOATS_PER_VERTEX;
                uploads.mark_uploaded(chunk);
            }
        }

        let interval = config.debug.stats_interval;
        if interval > 0 && frame % interval == 0 {
            info!(
                "Frame {}: observer chunk {:?}, {} loaded, {} pending, {} queued, {} dirty",
                frame,
                streamer.target_center(),
                world.chunk_count(),
                streamer.pending_count(),
                streamer.queued_count(),
                world.dirty_positions().len()
            );
        }

        stats.frames += 1;
        std::thread::sleep(FRAME_TIME);
    }

    streamer.shutdown();
    info!(
        "Ran {} frames in {:.2?}: {} chunks loaded, {} unloaded, {} dropped",
        stats.frames,
        started.elapsed(),
        stats.loaded,
        stats.unloaded,
        stats.dropped
    );
    Ok(stats)
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => {
            eprintln!("No config directory available, using defaults");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);
    config.sanitize();

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    if let Err(e) = strata_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config)) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!(
        "Strata demo: seed {}, view distance {}, {:?} meshing, {} frames",
        config.world.seed, config.streaming.view_distance, config.world.mesh_mode, args.frames
    );

    match run(&config, args.frames) {
        Ok(stats) => {
            info!(
                "Remeshed {} chunks after {} edits; {} uploads ({} vertices)",
                stats.remeshed, stats.edits, stats.uploads, stats.uploaded_vertices
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            warn!("Demo failed: {e}");
            eprintln!("Demo failed: {e}");
            ExitCode::FAILURE
        }
    }
}
