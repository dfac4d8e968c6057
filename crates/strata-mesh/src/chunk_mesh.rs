//! Mesh buffers produced by the meshing passes.

use strata_voxel::VoxelType;

use crate::face_direction::FaceDirection;

/// Floats per vertex in [`ChunkMesh::vertices`]: position xyz, normal xyz.
pub const FLOATS_PER_VERTEX: usize = 6;

/// One emitted quad, possibly covering several voxel faces.
///
/// `(x, y, z)` is the chunk-local voxel at the quad's minimum corner.
/// `width` spans the direction's u axis and `height` its v axis (see
/// [`FaceDirection::sweep_axes`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Face {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub width: usize,
    pub height: usize,
    pub direction: FaceDirection,
    pub kind: VoxelType,
}

impl Face {
    /// A single voxel face.
    pub fn unit(x: usize, y: usize, z: usize, direction: FaceDirection, kind: VoxelType) -> Self {
        Self {
            x,
            y,
            z,
            width: 1,
            height: 1,
            direction,
            kind,
        }
    }

    /// Number of unit voxel faces this quad covers.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Chunk-local voxels whose face this quad covers.
    pub fn covered_voxels(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let (_, u_axis, v_axis) = self.direction.sweep_axes();
        (0..self.height).flat_map(move |dv| {
            (0..self.width).map(move |du| {
                let mut c = [self.x, self.y, self.z];
                c[u_axis] += du;
                c[v_axis] += dv;
                (c[0], c[1], c[2])
            })
        })
    }
}

/// The mesh output of a chunk meshing pass.
///
/// `vertices` is flat, [`FLOATS_PER_VERTEX`] floats per vertex. Every face
/// contributes 4 vertices and 6 indices, wound counter-clockwise when viewed
/// from outside the solid.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    /// One entry per emitted quad.
    pub faces: Vec<Face>,
}

impl ChunkMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one quad.
    pub fn push_face(&mut self, face: Face) {
        let direction = face.direction;
        let (layer_axis, u_axis, v_axis) = direction.sweep_axes();
        let normal = direction.normal();
        let origin = [face.x, face.y, face.z];

        // Positive faces sit on the far side of the voxel.
        let layer_pos = origin[layer_axis] as f32 + if direction.is_positive() { 1.0 } else { 0.0 };
        let u0 = origin[u_axis] as f32;
        let v0 = origin[v_axis] as f32;
        let u1 = u0 + face.width as f32;
        let v1 = v0 + face.height as f32;

        let base = self.vertex_count() as u32;
        for (cu, cv) in [(u0, v0), (u1, v0), (u1, v1), (u0, v1)] {
            let mut pos = [0.0_f32; 3];
            pos[layer_axis] = layer_pos;
            pos[u_axis] = cu;
            pos[v_axis] = cv;
            self.vertices.extend_from_slice(&pos);
            self.vertices.extend_from_slice(&normal);
        }

        // u × v points along +layer, so the corner order is CCW seen from the
        // positive side and must be reversed for negative faces.
        if direction.is_positive() {
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        } else {
            self.indices
                .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }

        self.faces.push(face);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Counts the quads emitted for one direction.
    pub fn count_faces_for_direction(&self, direction: FaceDirection) -> usize {
        self.faces
            .iter()
            .filter(|f| f.direction == direction)
            .count()
    }

    /// Total number of unit voxel faces covered by all quads.
    pub fn covered_area(&self) -> usize {
        self.faces.iter().map(Face::area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(mesh: &ChunkMesh, vertex: u32) -> [f32; 3] {
        let i = vertex as usize * FLOATS_PER_VERTEX;
        [mesh.vertices[i], mesh.vertices[i + 1], mesh.vertices[i + 2]]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = ChunkMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_push_face_sizes() {
        let mut mesh = ChunkMesh::new();
        mesh.push_face(Face::unit(0, 0, 0, FaceDirection::PosY, VoxelType::Stone));
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_every_direction_winds_counter_clockwise_from_outside() {
        let mut mesh = ChunkMesh::new();
        for dir in FaceDirection::ALL {
            mesh.push_face(Face::unit(2, 3, 4, dir, VoxelType::Dirt));
        }
        for (i, face) in mesh.faces.iter().enumerate() {
            let normal = face.direction.normal();
            for tri in mesh.indices[i * 6..i * 6 + 6].chunks(3) {
                let p0 = position(&mesh, tri[0]);
                let p1 = position(&mesh, tri[1]);
                let p2 = position(&mesh, tri[2]);
                let n = cross(sub(p1, p0), sub(p2, p0));
                let dot = n[0] * normal[0] + n[1] * normal[1] + n[2] * normal[2];
                assert!(dot > 0.0, "{:?} triangle is back-facing", face.direction);
            }
        }
    }

    #[test]
    fn test_positive_face_sits_on_far_side() {
        let mut mesh = ChunkMesh::new();
        mesh.push_face(Face::unit(2, 3, 4, FaceDirection::PosX, VoxelType::Dirt));
        mesh.push_face(Face::unit(2, 3, 4, FaceDirection::NegX, VoxelType::Dirt));
        for v in 0..4 {
            assert_eq!(position(&mesh, v)[0], 3.0);
            assert_eq!(position(&mesh, v + 4)[0], 2.0);
        }
    }

    #[test]
    fn test_merged_face_covers_expected_voxels() {
        let face = Face {
            x: 1,
            y: 5,
            z: 2,
            width: 3,
            height: 2,
            direction: FaceDirection::PosY,
            kind: VoxelType::Grass,
        };
        let cells: Vec<_> = face.covered_voxels().collect();
        assert_eq!(cells.len(), face.area());
        // PosY sweeps u = Z, v = X.
        assert!(cells.contains(&(1, 5, 2)));
        assert!(cells.contains(&(2, 5, 4)));
        assert!(!cells.contains(&(1, 5, 5)));
        assert!(cells.iter().all(|&(_, y, _)| y == 5));
    }

    #[test]
    fn test_count_faces_by_direction() {
        let mut mesh = ChunkMesh::new();
        mesh.push_face(Face::unit(0, 0, 0, FaceDirection::PosY, VoxelType::Stone));
        mesh.push_face(Face::unit(1, 0, 0, FaceDirection::PosY, VoxelType::Stone));
        mesh.push_face(Face::unit(0, 0, 0, FaceDirection::NegY, VoxelType::Stone));
        assert_eq!(mesh.count_faces_for_direction(FaceDirection::PosY), 2);
        assert_eq!(mesh.count_faces_for_direction(FaceDirection::NegY), 1);
        assert_eq!(mesh.count_faces_for_direction(FaceDirection::PosX), 0);
        assert_eq!(mesh.covered_area(), 3);
    }
}
