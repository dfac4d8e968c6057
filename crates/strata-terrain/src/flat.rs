//! Uniform slab terrain.

use strata_voxel::{CHUNK_HEIGHT, CHUNK_SIZE, Chunk, Voxel, VoxelType};

use crate::{TerrainError, TerrainGenerator};

/// Fills `y < height` of every column with `kind`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatTerrain {
    pub height: usize,
    pub kind: VoxelType,
    pub seed: u64,
}

impl FlatTerrain {
    pub fn new(height: usize, kind: VoxelType) -> Self {
        Self {
            height: height.min(CHUNK_HEIGHT),
            kind,
            seed: 0,
        }
    }
}

impl Default for FlatTerrain {
    fn default() -> Self {
        Self::new(64, VoxelType::Stone)
    }
}

impl TerrainGenerator for FlatTerrain {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn generate(&self, chunk: &mut Chunk) -> Result<(), TerrainError> {
        if self.height == 0 || self.kind == VoxelType::Air {
            return Ok(());
        }
        let voxel = Voxel::new(self.kind);
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                chunk.fill_column_range(x, z, 0..self.height, voxel)?;
            }
        }
        Ok(())
    }
}
