//! The chunk registry: exclusive owner of every loaded [`Chunk`].

use std::sync::Arc;

use rustc_hash::FxHashMap;
use strata_mesh::{ChunkMeshExt, ChunkNeighbors, MeshMode, generate_mesh_with_mode};
use strata_terrain::{HeightmapTerrain, TerrainError, TerrainGenerator};
use strata_voxel::{CHUNK_SIZE, Chunk, ChunkPos, Voxel, WorldPos};

use crate::error::WorldError;

/// Default number of dirty chunks remeshed per [`VoxelWorld::update`].
pub const DEFAULT_REMESH_BUDGET: usize = 4;

/// Builds a ready-to-render chunk: terrain fill, isolated greedy mesh, clean.
///
/// Runs on whichever thread calls it and touches nothing but the new chunk.
pub(crate) fn build_chunk(terrain: &dyn TerrainGenerator, pos: ChunkPos) -> Result<Chunk, TerrainError> {
    let mut chunk = Chunk::new(pos);
    terrain.generate(&mut chunk)?;
    chunk.generate_mesh();
    chunk.clear_dirty();
    Ok(chunk)
}

/// Registry of loaded chunks keyed by [`ChunkPos`].
///
/// All mutation happens on the owning thread. Chunks built elsewhere enter
/// through [`VoxelWorld::insert_chunk`].
pub struct VoxelWorld {
    chunks: FxHashMap<ChunkPos, Chunk>,
    terrain: Arc<dyn TerrainGenerator>,
    mesh_mode: MeshMode,
    remesh_budget: usize,
}

impl VoxelWorld {
    /// Creates an empty world backed by `terrain`.
    pub fn new(terrain: Arc<dyn TerrainGenerator>) -> Self {
        tracing::debug!("Creating voxel world (seed {})", terrain.seed());
        Self {
            chunks: FxHashMap::default(),
            terrain,
            mesh_mode: MeshMode::default(),
            remesh_budget: DEFAULT_REMESH_BUDGET,
        }
    }

    /// Creates an empty world with heightmap terrain for `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Arc::new(HeightmapTerrain::with_seed(seed)))
    }

    pub fn seed(&self) -> u64 {
        self.terrain.seed()
    }

    /// The terrain generator shared with any streamer built for this world.
    pub fn terrain(&self) -> &Arc<dyn TerrainGenerator> {
        &self.terrain
    }

    pub fn mesh_mode(&self) -> MeshMode {
        self.mesh_mode
    }

    pub fn set_mesh_mode(&mut self, mode: MeshMode) {
        self.mesh_mode = mode;
    }

    pub fn remesh_budget(&self) -> usize {
        self.remesh_budget
    }

    /// Sets how many dirty chunks [`Self::update`] rebuilds per call.
    pub fn set_remesh_budget(&mut self, budget: usize) {
        self.remesh_budget = budget;
    }

    // -----------------------------------------------------------------------
    // Chunk lifecycle
    // -----------------------------------------------------------------------

    pub fn get_chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn get_chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Returns the chunk at `pos`, generating it synchronously if needed.
    ///
    /// An already loaded chunk is returned as is without consulting the
    /// generator.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Generation`] if the terrain generator fails; no
    /// chunk is inserted in that case.
    pub fn load_chunk(&mut self, pos: ChunkPos) -> Result<&mut Chunk, WorldError> {
        if !self.chunks.contains_key(&pos) {
            let chunk = build_chunk(self.terrain.as_ref(), pos)
                .map_err(|source| WorldError::Generation { pos, source })?;
            self.insert_chunk(chunk);
        }
        self.chunks.get_mut(&pos).ok_or(WorldError::NotLoaded(pos))
    }

    /// Inserts a chunk built elsewhere, replacing any chunk at its position.
    ///
    /// Loaded cardinal neighbors are marked dirty so their boundary faces get
    /// culled against the new chunk on their next remesh.
    pub fn insert_chunk(&mut self, chunk: Chunk) {
        let pos = chunk.position();
        for neighbor in cardinal_neighbors(pos) {
            if let Some(n) = self.chunks.get_mut(&neighbor) {
                n.mark_dirty();
            }
        }
        if self.chunks.insert(pos, chunk).is_some() {
            tracing::debug!("Replaced loaded chunk {:?}", pos);
        }
    }

    /// Removes and returns the chunk at `pos`. No-op if absent.
    pub fn unload_chunk(&mut self, pos: ChunkPos) -> Option<Chunk> {
        let removed = self.chunks.remove(&pos);
        if removed.is_some() {
            tracing::trace!("Unloaded chunk {:?}", pos);
        }
        removed
    }

    /// Drops every loaded chunk.
    pub fn clear_all_chunks(&mut self) {
        tracing::debug!("Clearing {} chunks", self.chunks.len());
        self.chunks.clear();
    }

    /// Re-runs terrain generation on every loaded chunk and remeshes them.
    ///
    /// Returns the number of chunks regenerated.
    ///
    /// # Errors
    ///
    /// Stops at the first generator failure and returns
    /// [`WorldError::Generation`]; chunks handled before it stay regenerated.
    pub fn regenerate_loaded_chunks(&mut self) -> Result<usize, WorldError> {
        let mut positions = self.loaded_positions();
        positions.sort_unstable();

        for &pos in &positions {
            let Some(chunk) = self.chunks.get_mut(&pos) else {
                continue;
            };
            chunk.fill(Voxel::AIR);
            self.terrain
                .generate(chunk)
                .map_err(|source| WorldError::Generation { pos, source })?;
        }
        for &pos in &positions {
            self.remesh(pos);
        }

        tracing::info!("Regenerated {} chunks", positions.len());
        Ok(positions.len())
    }

    // -----------------------------------------------------------------------
    // Voxel access
    // -----------------------------------------------------------------------

    /// Returns the voxel at a world position, or `None` if its chunk is not
    /// loaded or `y` is outside the column.
    pub fn get_voxel(&self, pos: WorldPos) -> Option<Voxel> {
        let (x, y, z) = pos.local()?;
        self.chunks.get(&pos.chunk()).map(|c| c.voxel_at(x, y, z))
    }

    /// Writes a voxel. Returns `false` (and changes nothing) if the chunk is
    /// not loaded or `y` is outside the column.
    pub fn set_voxel(&mut self, pos: WorldPos, voxel: Voxel) -> bool {
        self.try_set_voxel(pos, voxel).is_ok()
    }

    /// Writes a voxel, reporting why it could not be written.
    ///
    /// Edits on a horizontal chunk edge also mark the adjacent loaded chunk
    /// dirty, since its boundary faces depend on this voxel.
    pub fn try_set_voxel(&mut self, pos: WorldPos, voxel: Voxel) -> Result<(), WorldError> {
        let (x, y, z) = pos.local().ok_or(WorldError::OutOfBounds(pos))?;
        let chunk_pos = pos.chunk();
        let chunk = self
            .chunks
            .get_mut(&chunk_pos)
            .ok_or(WorldError::NotLoaded(chunk_pos))?;
        chunk.set_voxel(x, y, z, voxel)?;

        let last = CHUNK_SIZE - 1;
        let edges = [
            (x == 0, chunk_pos.offset(-1, 0)),
            (x == last, chunk_pos.offset(1, 0)),
            (z == 0, chunk_pos.offset(0, -1)),
            (z == last, chunk_pos.offset(0, 1)),
        ];
        for (on_edge, neighbor) in edges {
            if on_edge && let Some(n) = self.chunks.get_mut(&neighbor) {
                n.mark_dirty();
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Meshing
    // -----------------------------------------------------------------------

    /// Borrows the loaded cardinal neighbors of `pos`.
    pub fn neighbors(&self, pos: ChunkPos) -> ChunkNeighbors<'_> {
        ChunkNeighbors {
            neg_x: self.chunks.get(&pos.offset(-1, 0)),
            pos_x: self.chunks.get(&pos.offset(1, 0)),
            pos_z: self.chunks.get(&pos.offset(0, 1)),
            neg_z: self.chunks.get(&pos.offset(0, -1)),
        }
    }

    /// Rebuilds the mesh of `pos` against its loaded neighbors and clears its
    /// dirty flag. Returns `false` if the chunk is not loaded.
    pub fn remesh(&mut self, pos: ChunkPos) -> bool {
        let mesh = {
            let Some(chunk) = self.chunks.get(&pos) else {
                return false;
            };
            generate_mesh_with_mode(chunk, &self.neighbors(pos), self.mesh_mode)
        };
        let Some(chunk) = self.chunks.get_mut(&pos) else {
            return false;
        };
        chunk.apply_mesh(mesh);
        chunk.clear_dirty();
        true
    }

    /// Remeshes up to `max` dirty chunks in coordinate order.
    ///
    /// Returns the positions that were rebuilt.
    pub fn remesh_dirty(&mut self, max: usize) -> Vec<ChunkPos> {
        let mut dirty = self.dirty_positions();
        dirty.sort_unstable();
        dirty.truncate(max);
        for &pos in &dirty {
            self.remesh(pos);
        }
        dirty
    }

    /// Per-frame maintenance: remeshes the dirty chunks nearest `observer`,
    /// at most [`Self::remesh_budget`] of them.
    pub fn update(&mut self, observer: WorldPos) -> Vec<ChunkPos> {
        let center = observer.chunk();
        let mut dirty = self.dirty_positions();
        dirty.sort_unstable_by_key(|p| (p.distance_sq(center), *p));
        dirty.truncate(self.remesh_budget);
        for &pos in &dirty {
            self.remesh(pos);
        }
        if !dirty.is_empty() {
            tracing::trace!("Remeshed {} dirty chunks near {:?}", dirty.len(), center);
        }
        dirty
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Positions of all loaded chunks, in no particular order.
    pub fn loaded_positions(&self) -> Vec<ChunkPos> {
        self.chunks.keys().copied().collect()
    }

    pub fn dirty_positions(&self) -> Vec<ChunkPos> {
        self.chunks
            .iter()
            .filter(|(_, c)| c.is_dirty())
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkPos, &Chunk)> {
        self.chunks.iter()
    }
}

fn cardinal_neighbors(pos: ChunkPos) -> [ChunkPos; 4] {
    [
        pos.offset(-1, 0),
        pos.offset(1, 0),
        pos.offset(0, 1),
        pos.offset(0, -1),
    ]
}
