//! Face visibility: which voxel faces are exposed and need geometry.

use strata_voxel::{CHUNK_HEIGHT, CHUNK_SIZE, Chunk};

use crate::face_direction::FaceDirection;
use crate::neighbors::ChunkNeighbors;

/// Returns `true` if the face of `(x, y, z)` pointing in `direction` is visible.
///
/// A face is visible when the voxel is solid and the voxel across the face is
/// not opaque. Across a horizontal chunk edge the neighbor chunk decides; a
/// missing neighbor leaves the face visible, as does leaving the column
/// vertically.
pub fn is_face_visible(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors<'_>,
    x: usize,
    y: usize,
    z: usize,
    direction: FaceDirection,
) -> bool {
    if !chunk.voxel_at(x, y, z).is_solid() {
        return false;
    }
    !adjacent_is_opaque(chunk, neighbors, x, y, z, direction)
}

/// Whether the voxel across the face hides it. Caller guarantees `(x, y, z)`
/// is in range.
#[inline]
pub(crate) fn adjacent_is_opaque(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors<'_>,
    x: usize,
    y: usize,
    z: usize,
    direction: FaceDirection,
) -> bool {
    let (nx, ny, nz) = direction.offset(x as i32, y as i32, z as i32);
    let size = CHUNK_SIZE as i32;
    if ny < 0 || ny >= CHUNK_HEIGHT as i32 {
        return false;
    }
    if (0..size).contains(&nx) && (0..size).contains(&nz) {
        return chunk.voxel_at(nx as usize, ny as usize, nz as usize).is_opaque();
    }
    neighbors
        .sample(nx, ny, nz)
        .is_some_and(|voxel| voxel.is_opaque())
}

/// Counts every visible unit face in the chunk.
pub fn count_visible_faces(chunk: &Chunk, neighbors: &ChunkNeighbors<'_>) -> usize {
    let mut count = 0;
    for y in 0..CHUNK_HEIGHT {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                if !chunk.voxel_at(x, y, z).is_solid() {
                    continue;
                }
                count += FaceDirection::ALL
                    .iter()
                    .filter(|&&dir| !adjacent_is_opaque(chunk, neighbors, x, y, z, dir))
                    .count();
            }
        }
    }
    count
}
