//! Dense voxel storage for one 16×256×16 chunk column.
//!
//! [`Chunk`] owns its voxels, a dirty flag, and the mesh buffers most
//! recently generated for it. The dirty flag only tracks "voxels changed since
//! the mesh was built"; whether the current mesh has reached the GPU is the
//! renderer's concern and is keyed off [`Chunk::mesh_version`].

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::coords::{CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, ChunkPos};
use crate::voxel::Voxel;

/// Source of mesh versions. Shared by all chunks so a rebuilt chunk never
/// reuses a version an earlier instance at the same position had.
static NEXT_MESH_VERSION: AtomicU64 = AtomicU64::new(1);

/// Errors produced by chunk-local voxel access.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChunkError {
    /// Local coordinates fell outside `[0, 16) × [0, 256) × [0, 16)`.
    #[error("local voxel coordinate ({x}, {y}, {z}) is outside the chunk")]
    OutOfRange { x: usize, y: usize, z: usize },
}

/// A chunk column: voxel grid, dirty flag, and cached mesh buffers.
#[derive(Clone, Debug)]
pub struct Chunk {
    position: ChunkPos,
    /// Always exactly `CHUNK_VOLUME` entries, indexed `x + S·(z + S·y)`.
    voxels: Box<[Voxel]>,
    dirty: bool,
    mesh_vertices: Vec<f32>,
    mesh_indices: Vec<u32>,
    /// Process-unique tag of the current mesh buffers; 0 before the first mesh.
    mesh_version: u64,
}

impl Chunk {
    /// Creates an all-air chunk at `position`.
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            voxels: vec![Voxel::AIR; CHUNK_VOLUME].into_boxed_slice(),
            dirty: false,
            mesh_vertices: Vec::new(),
            mesh_indices: Vec::new(),
            mesh_version: 0,
        }
    }

    /// Chunk grid position.
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Returns `true` if `(x, y, z)` lies inside the chunk.
    #[inline]
    pub fn in_bounds(x: usize, y: usize, z: usize) -> bool {
        x < CHUNK_SIZE && y < CHUNK_HEIGHT && z < CHUNK_SIZE
    }

    /// Returns the voxel at `(x, y, z)`, or air when out of range.
    pub fn get_voxel(&self, x: usize, y: usize, z: usize) -> Voxel {
        if !Self::in_bounds(x, y, z) {
            tracing::trace!("Chunk::get_voxel out of range: ({}, {}, {})", x, y, z);
            return Voxel::AIR;
        }
        self.voxels[Self::index(x, y, z)]
    }

    /// Returns the voxel at in-range coordinates without a bounds branch.
    ///
    /// Meshing hot path; coordinates are only checked in debug builds.
    #[inline]
    pub fn voxel_at(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.voxels[Self::index(x, y, z)]
    }

    /// Sets the voxel at `(x, y, z)` and marks the chunk dirty.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] (leaving the chunk untouched) if any
    /// coordinate is outside the chunk.
    pub fn set_voxel(&mut self, x: usize, y: usize, z: usize, voxel: Voxel) -> Result<(), ChunkError> {
        if !Self::in_bounds(x, y, z) {
            return Err(ChunkError::OutOfRange { x, y, z });
        }
        self.voxels[Self::index(x, y, z)] = voxel;
        self.dirty = true;
        Ok(())
    }

    /// Fills every voxel with `voxel`.
    pub fn fill(&mut self, voxel: Voxel) {
        self.voxels.fill(voxel);
        self.dirty = true;
    }

    /// Writes `voxel` into column `(x, z)` for every `y` in `ys`.
    ///
    /// The range is clipped to the chunk height.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] if `(x, z)` is outside the chunk.
    pub fn fill_column_range(
        &mut self,
        x: usize,
        z: usize,
        ys: Range<usize>,
        voxel: Voxel,
    ) -> Result<(), ChunkError> {
        if x >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return Err(ChunkError::OutOfRange { x, y: ys.start, z });
        }
        for y in ys.start..ys.end.min(CHUNK_HEIGHT) {
            self.voxels[Self::index(x, y, z)] = voxel;
        }
        self.dirty = true;
        Ok(())
    }

    /// Raw voxel slice in storage order.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.is_solid()).count()
    }

    /// Returns `true` if voxel data changed since the last mesh rebuild.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the dirty flag. Says nothing about GPU upload state.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Replaces the cached mesh buffers and assigns a fresh [`Self::mesh_version`].
    ///
    /// Vertices are 6 floats each (position, normal); indices are triangles.
    pub fn set_mesh_buffers(&mut self, vertices: Vec<f32>, indices: Vec<u32>) {
        self.mesh_vertices = vertices;
        self.mesh_indices = indices;
        self.mesh_version = NEXT_MESH_VERSION.fetch_add(1, Ordering::Relaxed);
    }

    /// Flat vertex buffer: `[px, py, pz, nx, ny, nz]` per vertex.
    pub fn mesh_vertices(&self) -> &[f32] {
        &self.mesh_vertices
    }

    /// Triangle index buffer.
    pub fn mesh_indices(&self) -> &[u32] {
        &self.mesh_indices
    }

    /// Tag of the current mesh buffers. Grows every time they are replaced and
    /// is never shared with another chunk instance. Zero means no mesh yet.
    pub fn mesh_version(&self) -> u64 {
        self.mesh_version
    }

    /// Returns `true` if mesh buffers have been generated at least once.
    pub fn has_mesh(&self) -> bool {
        self.mesh_version > 0
    }

    #[inline]
    fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(Self::in_bounds(x, y, z), "({x}, {y}, {z}) outside chunk");
        x + CHUNK_SIZE * (z + CHUNK_SIZE * y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::VoxelType;

    fn stone() -> Voxel {
        Voxel::new(VoxelType::Stone)
    }

    #[test]
    fn test_new_chunk_is_air_and_clean() {
        let chunk = Chunk::new(ChunkPos::new(5, -3));
        assert_eq!(chunk.position(), ChunkPos::new(5, -3));
        assert_eq!(chunk.voxels().len(), CHUNK_VOLUME);
        assert_eq!(chunk.get_voxel(3, 50, 7), Voxel::AIR);
        assert_eq!(chunk.solid_count(), 0);
        assert!(!chunk.is_dirty());
        assert!(!chunk.has_mesh());
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut chunk = Chunk::new(ChunkPos::default());
        chunk.set_voxel(5, 10, 8, stone()).unwrap();
        assert_eq!(chunk.get_voxel(5, 10, 8).kind, VoxelType::Stone);
        // Neighbors untouched.
        assert_eq!(chunk.get_voxel(4, 10, 8), Voxel::AIR);
        assert_eq!(chunk.get_voxel(5, 11, 8), Voxel::AIR);
        assert_eq!(chunk.get_voxel(5, 10, 9), Voxel::AIR);
    }

    #[test]
    fn test_extreme_corners() {
        let mut chunk = Chunk::new(ChunkPos::default());
        let corners = [
            (0, 0, 0, VoxelType::Bedrock),
            (15, 255, 15, VoxelType::Glass),
            (0, 255, 15, VoxelType::Snow),
            (15, 0, 0, VoxelType::Water),
        ];
        for &(x, y, z, kind) in &corners {
            chunk.set_voxel(x, y, z, Voxel::new(kind)).unwrap();
        }
        for &(x, y, z, kind) in &corners {
            assert_eq!(chunk.get_voxel(x, y, z).kind, kind);
        }
        assert_eq!(chunk.solid_count(), 4);
    }

    #[test]
    fn test_every_voxel_is_addressable() {
        let mut chunk = Chunk::new(ChunkPos::default());
        let kinds = [VoxelType::Stone, VoxelType::Dirt, VoxelType::Air];
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let kind = kinds[(x + y + z) % 3];
                    chunk.set_voxel(x, y, z, Voxel::new(kind)).unwrap();
                }
            }
        }
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    assert_eq!(
                        chunk.get_voxel(x, y, z).kind,
                        kinds[(x + y + z) % 3],
                        "mismatch at ({x}, {y}, {z})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_get_out_of_range_returns_air() {
        let mut chunk = Chunk::new(ChunkPos::default());
        chunk.fill(stone());
        assert_eq!(chunk.get_voxel(16, 0, 0), Voxel::AIR);
        assert_eq!(chunk.get_voxel(0, 256, 0), Voxel::AIR);
        assert_eq!(chunk.get_voxel(0, 0, 40), Voxel::AIR);
    }

    #[test]
    fn test_set_out_of_range_is_rejected() {
        let mut chunk = Chunk::new(ChunkPos::default());
        let err = chunk.set_voxel(0, 300, 0, stone()).unwrap_err();
        assert_eq!(err, ChunkError::OutOfRange { x: 0, y: 300, z: 0 });
        assert!(!chunk.is_dirty(), "rejected write must not dirty the chunk");
        assert_eq!(chunk.solid_count(), 0);
    }

    #[test]
    fn test_set_marks_dirty_and_clear_is_independent_of_mesh() {
        let mut chunk = Chunk::new(ChunkPos::default());
        chunk.set_voxel(1, 1, 1, stone()).unwrap();
        assert!(chunk.is_dirty());

        chunk.set_mesh_buffers(vec![0.0; 24], vec![0, 1, 2, 0, 2, 3]);
        assert!(chunk.is_dirty(), "replacing the mesh does not clear dirty");

        chunk.clear_dirty();
        assert!(!chunk.is_dirty());
        chunk.mark_dirty();
        assert!(chunk.is_dirty());
    }

    #[test]
    fn test_mesh_version_grows_on_every_replacement() {
        let mut chunk = Chunk::new(ChunkPos::default());
        assert_eq!(chunk.mesh_version(), 0);
        chunk.set_mesh_buffers(Vec::new(), Vec::new());
        let first = chunk.mesh_version();
        assert!(first > 0);
        assert!(chunk.has_mesh());
        chunk.set_mesh_buffers(vec![1.0; 6], Vec::new());
        assert!(chunk.mesh_version() > first);
        assert_eq!(chunk.mesh_vertices().len(), 6);
    }

    #[test]
    fn test_rebuilt_chunk_never_reuses_a_version() {
        let pos = ChunkPos::new(3, 3);
        let mut a = Chunk::new(pos);
        a.set_mesh_buffers(Vec::new(), Vec::new());
        let mut b = Chunk::new(pos);
        b.set_mesh_buffers(Vec::new(), Vec::new());
        assert_ne!(a.mesh_version(), b.mesh_version());
    }

    #[test]
    fn test_fill_column_clips_to_height() {
        let mut chunk = Chunk::new(ChunkPos::default());
        chunk.fill_column_range(3, 4, 250..300, stone()).unwrap();
        assert_eq!(chunk.solid_count(), CHUNK_HEIGHT - 250);
        assert_eq!(chunk.get_voxel(3, 255, 4).kind, VoxelType::Stone);
        assert!(chunk.fill_column_range(16, 0, 0..1, stone()).is_err());
    }
}
