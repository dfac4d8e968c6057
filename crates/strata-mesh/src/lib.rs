//! Chunk meshing: visible-face extraction and greedy quad merging.

pub mod chunk_mesh;
pub mod face_direction;
pub mod greedy;
pub mod neighbors;
pub mod visibility;

pub use chunk_mesh::{ChunkMesh, FLOATS_PER_VERTEX, Face};
pub use face_direction::FaceDirection;
pub use greedy::{
    MeshMode, generate_chunk_mesh, generate_mesh_with_mode, generate_mesh_with_neighbors,
    generate_simple_mesh, generate_simple_mesh_with_neighbors,
};
pub use neighbors::ChunkNeighbors;
pub use visibility::{count_visible_faces, is_face_visible};

use strata_voxel::Chunk;

/// Mesh generation on [`Chunk`] itself.
///
/// Lives here rather than in `strata-voxel` so the voxel crate stays free of
/// meshing code.
pub trait ChunkMeshExt {
    /// Greedy-meshes the chunk in isolation and stores the buffers on it.
    ///
    /// Returns the number of emitted faces. The dirty flag is left untouched.
    fn generate_mesh(&mut self) -> usize;

    /// Stores an already generated mesh on the chunk.
    fn apply_mesh(&mut self, mesh: ChunkMesh);
}

impl ChunkMeshExt for Chunk {
    fn generate_mesh(&mut self) -> usize {
        let mesh = generate_chunk_mesh(self);
        let faces = mesh.face_count();
        self.apply_mesh(mesh);
        faces
    }

    fn apply_mesh(&mut self, mesh: ChunkMesh) {
        let ChunkMesh {
            vertices, indices, ..
        } = mesh;
        self.set_mesh_buffers(vertices, indices);
    }
}
