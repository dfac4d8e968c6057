//! Terrain content generation: fills freshly created chunks with voxels.
//!
//! The world and the streamer only see the [`TerrainGenerator`] trait, so any
//! deterministic generator can be plugged in. Two are provided here:
//! [`HeightmapTerrain`] for noise-driven landscapes and [`FlatTerrain`] for
//! tests and benchmarks.

pub mod flat;
pub mod heightmap;

pub use flat::FlatTerrain;
pub use heightmap::{HeightmapParams, HeightmapTerrain};

use strata_voxel::{Chunk, ChunkError};
use thiserror::Error;

/// Errors a terrain generator can report.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// A voxel write fell outside the chunk.
    #[error("chunk write failed: {0}")]
    Chunk(#[from] ChunkError),
    /// Generator-specific failure.
    #[error("terrain generation failed: {0}")]
    Failed(String),
}

/// Fills a chunk with terrain.
///
/// Implementations are shared between the main thread and the streaming
/// worker, and must produce identical voxels for identical
/// `(chunk.position(), seed())`.
pub trait TerrainGenerator: Send + Sync {
    /// Seed the output is keyed on.
    fn seed(&self) -> u64;

    /// Writes terrain into `chunk`, which arrives all air.
    fn generate(&self, chunk: &mut Chunk) -> Result<(), TerrainError>;
}
