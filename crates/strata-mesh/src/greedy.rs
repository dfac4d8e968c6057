//! Simple and greedy meshing passes.
//!
//! Both passes emit exactly the same visible surface. The greedy pass merges
//! coplanar faces of the identical voxel type into larger rectangles; the
//! simple pass emits one quad per visible voxel face.

use serde::{Deserialize, Serialize};
use strata_voxel::{CHUNK_HEIGHT, CHUNK_SIZE, Chunk, VoxelType};

use crate::chunk_mesh::{ChunkMesh, Face};
use crate::face_direction::FaceDirection;
use crate::neighbors::ChunkNeighbors;
use crate::visibility::adjacent_is_opaque;

/// Which algorithm world-driven remeshes use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshMode {
    #[default]
    Greedy,
    Simple,
}

/// One unit quad per visible face, ignoring neighbor chunks.
pub fn generate_simple_mesh(chunk: &Chunk) -> ChunkMesh {
    generate_simple_mesh_with_neighbors(chunk, &ChunkNeighbors::NONE)
}

/// Greedy mesh of the chunk in isolation; faces on horizontal edges are
/// always emitted.
pub fn generate_chunk_mesh(chunk: &Chunk) -> ChunkMesh {
    generate_mesh_with_neighbors(chunk, &ChunkNeighbors::NONE)
}

/// Dispatches on `mode`.
pub fn generate_mesh_with_mode(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors<'_>,
    mode: MeshMode,
) -> ChunkMesh {
    match mode {
        MeshMode::Greedy => generate_mesh_with_neighbors(chunk, neighbors),
        MeshMode::Simple => generate_simple_mesh_with_neighbors(chunk, neighbors),
    }
}

/// One unit quad per visible face, culling against loaded neighbors.
pub fn generate_simple_mesh_with_neighbors(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors<'_>,
) -> ChunkMesh {
    let mut mesh = ChunkMesh::new();
    let top = solid_height(chunk);

    for y in 0..top {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let voxel = chunk.voxel_at(x, y, z);
                if !voxel.is_solid() {
                    continue;
                }
                for dir in FaceDirection::ALL {
                    if !adjacent_is_opaque(chunk, neighbors, x, y, z, dir) {
                        mesh.push_face(Face::unit(x, y, z, dir, voxel.kind));
                    }
                }
            }
        }
    }

    tracing::trace!(
        "Simple mesh for {:?}: {} faces, {} vertices",
        chunk.position(),
        mesh.face_count(),
        mesh.vertex_count()
    );
    mesh
}

/// Greedy mesh, culling against loaded neighbors.
///
/// For each direction the chunk is swept slice by slice. Each slice builds a
/// mask holding the voxel type of every visible face. Rectangles are grown
/// row-major: first along u while the mask holds the same type, then along v
/// while the whole next row of that width matches. Consumed cells are cleared.
pub fn generate_mesh_with_neighbors(chunk: &Chunk, neighbors: &ChunkNeighbors<'_>) -> ChunkMesh {
    let mut mesh = ChunkMesh::new();
    let dims = [CHUNK_SIZE, solid_height(chunk), CHUNK_SIZE];
    let mut mask: Vec<Option<VoxelType>> = Vec::new();

    for direction in FaceDirection::ALL {
        let (layer_axis, u_axis, v_axis) = direction.sweep_axes();
        let (layers, nu, nv) = (dims[layer_axis], dims[u_axis], dims[v_axis]);
        if layers == 0 || nu == 0 || nv == 0 {
            continue;
        }
        mask.clear();
        mask.resize(nu * nv, None);

        for layer in 0..layers {
            for v in 0..nv {
                for u in 0..nu {
                    let (x, y, z) = axes_to_xyz(layer_axis, u_axis, v_axis, layer, u, v);
                    let voxel = chunk.voxel_at(x, y, z);
                    mask[v * nu + u] = (voxel.is_solid()
                        && !adjacent_is_opaque(chunk, neighbors, x, y, z, direction))
                    .then_some(voxel.kind);
                }
            }

            for v in 0..nv {
                let mut u = 0;
                while u < nu {
                    let Some(kind) = mask[v * nu + u] else {
                        u += 1;
                        continue;
                    };

                    let mut w = 1;
                    while u + w < nu && mask[v * nu + u + w] == Some(kind) {
                        w += 1;
                    }

                    let mut h = 1;
                    'grow: while v + h < nv {
                        let row = (v + h) * nu;
                        for du in 0..w {
                            if mask[row + u + du] != Some(kind) {
                                break 'grow;
                            }
                        }
                        h += 1;
                    }

                    for dv in 0..h {
                        let row = (v + dv) * nu;
                        mask[row + u..row + u + w].fill(None);
                    }

                    let (x, y, z) = axes_to_xyz(layer_axis, u_axis, v_axis, layer, u, v);
                    mesh.push_face(Face {
                        x,
                        y,
                        z,
                        width: w,
                        height: h,
                        direction,
                        kind,
                    });
                    u += w;
                }
            }
        }
    }

    tracing::trace!(
        "Greedy mesh for {:?}: {} faces, {} vertices, {} neighbors",
        chunk.position(),
        mesh.face_count(),
        mesh.vertex_count(),
        neighbors.count()
    );
    mesh
}

/// Converts sweep coordinates back to `(x, y, z)`.
fn axes_to_xyz(
    layer_axis: usize,
    u_axis: usize,
    v_axis: usize,
    layer: usize,
    u: usize,
    v: usize,
) -> (usize, usize, usize) {
    let mut coords = [0usize; 3];
    coords[layer_axis] = layer;
    coords[u_axis] = u;
    coords[v_axis] = v;
    (coords[0], coords[1], coords[2])
}

/// One past the highest y holding a solid voxel. Nothing above it can emit.
fn solid_height(chunk: &Chunk) -> usize {
    let layer = CHUNK_SIZE * CHUNK_SIZE;
    chunk
        .voxels()
        .iter()
        .rposition(|v| v.is_solid())
        .map_or(0, |i| (i / layer + 1).min(CHUNK_HEIGHT))
}
