//! The six axis-aligned directions a voxel face can point.

/// One of the six cardinal directions a voxel face can point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FaceDirection {
    /// +X direction.
    PosX = 0,
    /// −X direction.
    NegX = 1,
    /// +Y direction.
    PosY = 2,
    /// −Y direction.
    NegY = 3,
    /// +Z direction.
    PosZ = 4,
    /// −Z direction.
    NegZ = 5,
}

impl FaceDirection {
    /// All six directions in order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Returns the sweep axes for greedy meshing: `(layer_axis, u_axis, v_axis)`.
    ///
    /// `layer_axis` is perpendicular to the face. `u_axis` and `v_axis` span the
    /// face plane and are ordered so that `u × v` points along `+layer_axis`.
    /// Each value is 0=X, 1=Y, 2=Z.
    pub fn sweep_axes(self) -> (usize, usize, usize) {
        match self {
            Self::PosX | Self::NegX => (0, 1, 2), // layer=X, u=Y, v=Z
            Self::PosY | Self::NegY => (1, 2, 0), // layer=Y, u=Z, v=X
            Self::PosZ | Self::NegZ => (2, 0, 1), // layer=Z, u=X, v=Y
        }
    }

    /// `true` for +X, +Y and +Z.
    pub fn is_positive(self) -> bool {
        matches!(self, Self::PosX | Self::PosY | Self::PosZ)
    }

    /// Returns the unit normal as `[f32; 3]`.
    pub fn normal(self) -> [f32; 3] {
        match self {
            Self::PosX => [1.0, 0.0, 0.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::PosY => [0.0, 1.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::PosZ => [0.0, 0.0, 1.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// Returns the neighbor coordinate in this direction.
    pub fn offset(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        match self {
            Self::PosX => (x + 1, y, z),
            Self::NegX => (x - 1, y, z),
            Self::PosY => (x, y + 1, z),
            Self::NegY => (x, y - 1, z),
            Self::PosZ => (x, y, z + 1),
            Self::NegZ => (x, y, z - 1),
        }
    }

    /// Returns the opposite face direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Returns the direction index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn unit(axis: usize) -> [f32; 3] {
        let mut v = [0.0; 3];
        v[axis] = 1.0;
        v
    }

    #[test]
    fn test_offset_and_opposite() {
        assert_eq!(FaceDirection::PosX.offset(5, 10, 15), (6, 10, 15));
        assert_eq!(FaceDirection::NegX.offset(0, 0, 0), (-1, 0, 0));
        for dir in FaceDirection::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn test_sweep_axes_are_right_handed() {
        for dir in FaceDirection::ALL {
            let (layer, u, v) = dir.sweep_axes();
            assert_eq!(cross(unit(u), unit(v)), unit(layer), "{dir:?}");
        }
    }

    #[test]
    fn test_normal_matches_layer_axis_and_sign() {
        for dir in FaceDirection::ALL {
            let (layer, _, _) = dir.sweep_axes();
            let n = dir.normal();
            let sign = if dir.is_positive() { 1.0 } else { -1.0 };
            assert_eq!(n[layer], sign);
        }
    }
}
