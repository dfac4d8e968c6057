//! Voxel primitives, chunk coordinates, and the dense chunk container.

pub mod chunk;
pub mod coords;
pub mod voxel;

pub use chunk::{Chunk, ChunkError};
pub use coords::{CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, ChunkPos, WorldPos};
pub use voxel::{MAX_LIGHT, Voxel, VoxelMaterial, VoxelType, VoxelTypeInfo};
