//! Chunk dimensions and the world/chunk coordinate types.

use serde::{Deserialize, Serialize};

/// Horizontal side length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 16;

/// Vertical height of a chunk column in voxels.
pub const CHUNK_HEIGHT: usize = 256;

/// Total number of voxels in a chunk (16 × 16 × 256).
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_HEIGHT;

/// Absolute voxel coordinate in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldPos {
    /// Creates a new world position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the chunk containing this position.
    pub fn chunk(self) -> ChunkPos {
        ChunkPos::from_world_pos(self)
    }

    /// Returns the chunk-local `(x, y, z)` of this position.
    ///
    /// Returns `None` when `y` is outside `[0, CHUNK_HEIGHT)`; horizontal
    /// coordinates always wrap into `[0, CHUNK_SIZE)`.
    pub fn local(self) -> Option<(usize, usize, usize)> {
        let size = CHUNK_SIZE as i32;
        if self.y < 0 || self.y >= CHUNK_HEIGHT as i32 {
            return None;
        }
        Some((
            self.x.rem_euclid(size) as usize,
            self.y as usize,
            self.z.rem_euclid(size) as usize,
        ))
    }
}

/// Horizontal chunk coordinate on the chunk grid.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    /// Creates a new chunk position.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the chunk containing `pos`.
    ///
    /// Uses floor division, so world x = −1 lands in chunk x = −1.
    pub fn from_world_pos(pos: WorldPos) -> Self {
        let size = CHUNK_SIZE as i32;
        Self {
            x: pos.x.div_euclid(size),
            z: pos.z.div_euclid(size),
        }
    }

    /// Returns the chunk containing the world-space point `(x, z)`.
    pub fn from_world_f32(x: f32, z: f32) -> Self {
        let size = CHUNK_SIZE as f32;
        Self {
            x: (x / size).floor() as i32,
            z: (z / size).floor() as i32,
        }
    }

    /// Returns the chunk offset by `(dx, dz)`.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// World position of the chunk's `(0, 0, 0)` voxel.
    pub fn world_origin(self) -> WorldPos {
        let size = CHUNK_SIZE as i32;
        WorldPos::new(self.x * size, 0, self.z * size)
    }

    /// Converts chunk-local coordinates to a world position.
    pub fn to_world(self, x: usize, y: usize, z: usize) -> WorldPos {
        let origin = self.world_origin();
        WorldPos::new(origin.x + x as i32, y as i32, origin.z + z as i32)
    }

    /// Squared Euclidean distance in chunk units.
    pub fn distance_sq(self, other: ChunkPos) -> u64 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dz = (self.z as i64 - other.z as i64).unsigned_abs();
        dx * dx + dz * dz
    }

    /// Chebyshev (square-ring) distance in chunk units.
    pub fn chebyshev_distance(self, other: ChunkPos) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dz = (self.z as i64 - other.z as i64).unsigned_abs();
        dx.max(dz) as u32
    }
}
