//! Borrowed view of the four horizontally adjacent chunks.

use strata_voxel::{CHUNK_HEIGHT, CHUNK_SIZE, Chunk, Voxel};

use crate::face_direction::FaceDirection;

/// The loaded cardinal neighbors of a chunk, if any.
///
/// Borrowed for the duration of one meshing pass; never owns chunk data.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkNeighbors<'a> {
    pub neg_x: Option<&'a Chunk>,
    pub pos_x: Option<&'a Chunk>,
    pub pos_z: Option<&'a Chunk>,
    pub neg_z: Option<&'a Chunk>,
}

impl ChunkNeighbors<'static> {
    /// No neighbors loaded.
    pub const NONE: Self = Self {
        neg_x: None,
        pos_x: None,
        pos_z: None,
        neg_z: None,
    };
}

impl<'a> ChunkNeighbors<'a> {
    /// Neighbor across the given face, `None` for ±Y or when not loaded.
    pub fn in_direction(&self, direction: FaceDirection) -> Option<&'a Chunk> {
        match direction {
            FaceDirection::NegX => self.neg_x,
            FaceDirection::PosX => self.pos_x,
            FaceDirection::PosZ => self.pos_z,
            FaceDirection::NegZ => self.neg_z,
            FaceDirection::PosY | FaceDirection::NegY => None,
        }
    }

    /// Number of neighbors present (0–4).
    pub fn count(&self) -> usize {
        [self.neg_x, self.pos_x, self.pos_z, self.neg_z]
            .iter()
            .filter(|n| n.is_some())
            .count()
    }

    /// Looks up a voxel one step outside the centre chunk's horizontal edge.
    ///
    /// Coordinates are relative to the centre chunk. Returns `None` when the
    /// position is vertically out of range, diagonal to the chunk, inside the
    /// chunk, or in a neighbor that is not loaded.
    pub fn sample(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        let size = CHUNK_SIZE as i32;
        if y < 0 || y >= CHUNK_HEIGHT as i32 {
            return None;
        }
        let x_out = !(0..size).contains(&x);
        let z_out = !(0..size).contains(&z);
        let (chunk, lx, lz) = match (x_out, z_out) {
            (true, false) if x < 0 => (self.neg_x?, x + size, z),
            (true, false) => (self.pos_x?, x - size, z),
            (false, true) if z < 0 => (self.neg_z?, x, z + size),
            (false, true) => (self.pos_z?, x, z - size),
            _ => return None,
        };
        if !(0..size).contains(&lx) || !(0..size).contains(&lz) {
            return None;
        }
        Some(chunk.voxel_at(lx as usize, y as usize, lz as usize))
    }
}

#[cfg(test)]
mod tests {
    use strata_voxel::{ChunkPos, VoxelType};

    use super::*;

    #[test]
    fn test_none_has_no_neighbors() {
        assert_eq!(ChunkNeighbors::NONE.count(), 0);
        assert_eq!(ChunkNeighbors::NONE.sample(-1, 10, 3), None);
        for dir in FaceDirection::ALL {
            assert!(ChunkNeighbors::NONE.in_direction(dir).is_none());
        }
    }

    #[test]
    fn test_sample_wraps_into_neighbor() {
        let mut west = Chunk::new(ChunkPos::new(-1, 0));
        west.set_voxel(15, 10, 3, Voxel::new(VoxelType::Stone)).unwrap();
        let mut north = Chunk::new(ChunkPos::new(0, 1));
        north.set_voxel(7, 20, 0, Voxel::new(VoxelType::Sand)).unwrap();

        let neighbors = ChunkNeighbors {
            neg_x: Some(&west),
            pos_z: Some(&north),
            ..Default::default()
        };
        assert_eq!(neighbors.count(), 2);
        assert_eq!(neighbors.sample(-1, 10, 3).map(|v| v.kind), Some(VoxelType::Stone));
        assert_eq!(neighbors.sample(7, 20, 16).map(|v| v.kind), Some(VoxelType::Sand));
        assert_eq!(neighbors.sample(-1, 11, 3).map(|v| v.kind), Some(VoxelType::Air));
        // Missing neighbor and vertical overflow.
        assert_eq!(neighbors.sample(16, 10, 3), None);
        assert_eq!(neighbors.sample(-1, 256, 3), None);
        // Diagonal.
        assert_eq!(neighbors.sample(-1, 10, 16), None);
    }
}
