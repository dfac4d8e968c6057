//! GPU upload bookkeeping for chunk meshes.
//!
//! A chunk's dirty flag says whether its voxels changed since the last mesh
//! build; it says nothing about whether that mesh reached the GPU. Streamed
//! chunks arrive already meshed and clean, so the renderer tracks upload state
//! here, keyed by [`Chunk::mesh_version`].

use rustc_hash::FxHashMap;
use strata_voxel::{Chunk, ChunkPos};

use crate::world::VoxelWorld;

/// Remembers which mesh version of each chunk was last uploaded.
#[derive(Debug, Default)]
pub struct MeshUploadTracker {
    uploaded: FxHashMap<ChunkPos, u64>,
}

impl MeshUploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if the chunk has a mesh whose current version was never uploaded.
    pub fn needs_upload(&self, chunk: &Chunk) -> bool {
        chunk.has_mesh() && self.uploaded.get(&chunk.position()) != Some(&chunk.mesh_version())
    }

    /// Records that the chunk's current mesh is on the GPU.
    pub fn mark_uploaded(&mut self, chunk: &Chunk) {
        self.uploaded.insert(chunk.position(), chunk.mesh_version());
    }

    /// Forgets a chunk, typically after it was unloaded.
    pub fn forget(&mut self, pos: ChunkPos) {
        self.uploaded.remove(&pos);
    }

    /// Loaded chunks whose mesh needs uploading, sorted by position.
    pub fn pending_uploads(&self, world: &VoxelWorld) -> Vec<ChunkPos> {
        let mut pending: Vec<ChunkPos> = world
            .iter()
            .filter(|(_, chunk)| self.needs_upload(chunk))
            .map(|(pos, _)| *pos)
            .collect();
        pending.sort_unstable();
        pending
    }

    /// Drops entries for chunks no longer loaded in `world`.
    pub fn retain_loaded(&mut self, world: &VoxelWorld) {
        self.uploaded.retain(|pos, _| world.contains(*pos));
    }

    pub fn tracked_count(&self) -> usize {
        self.uploaded.len()
    }
}
