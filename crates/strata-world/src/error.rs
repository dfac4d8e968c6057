//! Errors surfaced by the world and the streamer.

use strata_terrain::TerrainError;
use strata_voxel::{ChunkError, ChunkPos, WorldPos};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    /// The chunk containing the position is not loaded.
    #[error("chunk ({}, {}) is not loaded", .0.x, .0.z)]
    NotLoaded(ChunkPos),

    /// The position lies above or below the chunk columns.
    #[error("world position ({}, {}, {}) is outside the vertical range", .0.x, .0.y, .0.z)]
    OutOfBounds(WorldPos),

    /// Chunk-local access failed.
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// The terrain generator failed for a chunk.
    #[error("terrain generation failed for chunk ({}, {}): {source}", .pos.x, .pos.z)]
    Generation {
        pos: ChunkPos,
        #[source]
        source: TerrainError,
    },

    /// The streaming worker thread could not be started.
    #[error("failed to spawn chunk streaming worker: {0}")]
    Spawn(#[from] std::io::Error),
}
