//! Voxel cells and the static material property table.
//!
//! Every [`VoxelType`] has exactly one [`VoxelTypeInfo`] row in [`TYPE_TABLE`],
//! indexed by the enum discriminant. Air is always discriminant 0 so that a
//! zero-initialized voxel represents empty space.

use serde::{Deserialize, Serialize};

/// Highest light level a voxel can store.
pub const MAX_LIGHT: u8 = 15;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Material tag stored in every voxel cell (1 byte).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum VoxelType {
    /// Empty space.
    #[default]
    Air = 0,
    Stone,
    Dirt,
    Grass,
    Sand,
    Water,
    Wood,
    Leaves,
    Bedrock,
    Snow,
    Ice,
    Cobblestone,
    Planks,
    Glass,
}

/// Broad material classification used by gameplay systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoxelMaterial {
    /// Hard, requires a pickaxe.
    Stone,
    /// Soft, diggable by hand.
    Dirt,
    /// Medium, requires an axe.
    Wood,
    /// Very hard.
    Metal,
    /// Fragile and see-through.
    Glass,
    /// Flowing, non-collidable.
    Liquid,
    /// Soft, cuttable.
    Plant,
    /// Unique properties (bedrock, air).
    Special,
}

/// Static properties of a voxel type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelTypeInfo {
    /// Human-readable name.
    pub name: &'static str,
    /// Base RGB color (0–255).
    pub color: [u8; 3],
    /// Material classification.
    pub material: VoxelMaterial,
    /// Mining time multiplier (1.0 = normal). Negative means unbreakable.
    pub hardness: f32,
    /// Emitted light level (0–15).
    pub light_emission: u8,
    /// Occupies space (everything except air).
    pub solid: bool,
    /// Hides the faces of voxels behind it.
    pub opaque: bool,
    /// Rendered with blending.
    pub transparent: bool,
}

const fn info(
    name: &'static str,
    color: [u8; 3],
    material: VoxelMaterial,
    hardness: f32,
    opaque: bool,
    transparent: bool,
) -> VoxelTypeInfo {
    VoxelTypeInfo {
        name,
        color,
        material,
        hardness,
        light_emission: 0,
        solid: true,
        opaque,
        transparent,
    }
}

/// Property rows, one per [`VoxelType`] in discriminant order.
const TYPE_TABLE: [VoxelTypeInfo; VoxelType::COUNT] = [
    VoxelTypeInfo {
        name: "Air",
        color: [0, 0, 0],
        material: VoxelMaterial::Special,
        hardness: 0.0,
        light_emission: 0,
        solid: false,
        opaque: false,
        transparent: false,
    },
    info("Stone", [128, 128, 128], VoxelMaterial::Stone, 3.0, true, false),
    info("Dirt", [139, 69, 19], VoxelMaterial::Dirt, 0.5, true, false),
    info("Grass", [34, 139, 34], VoxelMaterial::Dirt, 0.5, true, false),
    info("Sand", [238, 214, 175], VoxelMaterial::Dirt, 0.5, true, false),
    info("Water", [30, 144, 255], VoxelMaterial::Liquid, 0.0, false, true),
    info("Wood", [139, 90, 43], VoxelMaterial::Wood, 2.0, true, false),
    info("Leaves", [34, 139, 34], VoxelMaterial::Plant, 0.2, true, false),
    info("Bedrock", [50, 50, 50], VoxelMaterial::Special, -1.0, true, false),
    info("Snow", [255, 250, 250], VoxelMaterial::Dirt, 0.2, true, false),
    // Ice is drawn blended but still culls the faces behind it.
    info("Ice", [175, 225, 255], VoxelMaterial::Glass, 0.5, true, true),
    info("Cobblestone", [128, 128, 128], VoxelMaterial::Stone, 3.0, true, false),
    info("Planks", [139, 90, 43], VoxelMaterial::Wood, 2.0, true, false),
    info("Glass", [200, 230, 255], VoxelMaterial::Glass, 0.3, false, true),
];

impl VoxelType {
    /// Number of voxel types.
    pub const COUNT: usize = 14;

    /// All voxel types in discriminant order.
    pub const ALL: [VoxelType; Self::COUNT] = [
        Self::Air,
        Self::Stone,
        Self::Dirt,
        Self::Grass,
        Self::Sand,
        Self::Water,
        Self::Wood,
        Self::Leaves,
        Self::Bedrock,
        Self::Snow,
        Self::Ice,
        Self::Cobblestone,
        Self::Planks,
        Self::Glass,
    ];

    /// Returns the property row for this type.
    #[inline]
    pub fn info(self) -> &'static VoxelTypeInfo {
        &TYPE_TABLE[self as usize]
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Looks a type up by its display name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        self.info().solid
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.info().opaque
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.info().transparent
    }
}

/// A single voxel cell: material plus a light level in `0..=15`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voxel {
    /// Material tag.
    pub kind: VoxelType,
    /// Light level (0–15).
    pub light: u8,
}

impl Voxel {
    /// Empty space with no light.
    pub const AIR: Self = Self {
        kind: VoxelType::Air,
        light: 0,
    };

    /// Creates an unlit voxel of the given type.
    pub const fn new(kind: VoxelType) -> Self {
        Self { kind, light: 0 }
    }

    /// Creates a voxel with a light level, clamped to [`MAX_LIGHT`].
    pub fn with_light(kind: VoxelType, light: u8) -> Self {
        Self {
            kind,
            light: light.min(MAX_LIGHT),
        }
    }

    /// `true` for anything but air.
    #[inline]
    pub fn is_solid(self) -> bool {
        self.kind.is_solid()
    }

    /// `true` for solid voxels that are not water or glass.
    #[inline]
    pub fn is_opaque(self) -> bool {
        self.kind.is_opaque()
    }

    /// `true` for water, glass, and ice.
    #[inline]
    pub fn is_transparent(self) -> bool {
        self.kind.is_transparent()
    }
}

impl From<VoxelType> for Voxel {
    fn from(kind: VoxelType) -> Self {
        Self::new(kind)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows_match_discriminants() {
        for (i, kind) in VoxelType::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
            assert!(!kind.name().is_empty());
        }
    }

    #[test]
    fn test_default_voxel_is_air() {
        let v = Voxel::default();
        assert_eq!(v, Voxel::AIR);
        assert!(!v.is_solid());
        assert!(!v.is_opaque());
        assert!(!v.is_transparent());
    }

    #[test]
    fn test_classification_predicates() {
        assert!(Voxel::new(VoxelType::Stone).is_opaque());
        assert!(!Voxel::new(VoxelType::Stone).is_transparent());

        let water = Voxel::new(VoxelType::Water);
        assert!(water.is_solid());
        assert!(!water.is_opaque());
        assert!(water.is_transparent());

        let glass = Voxel::new(VoxelType::Glass);
        assert!(!glass.is_opaque());
        assert!(glass.is_transparent());

        // Ice culls like an opaque block but renders blended.
        let ice = Voxel::new(VoxelType::Ice);
        assert!(ice.is_opaque());
        assert!(ice.is_transparent());
    }

    #[test]
    fn test_light_is_clamped() {
        assert_eq!(Voxel::with_light(VoxelType::Stone, 200).light, MAX_LIGHT);
        assert_eq!(Voxel::with_light(VoxelType::Stone, 7).light, 7);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(VoxelType::from_name("grass"), Some(VoxelType::Grass));
        assert_eq!(VoxelType::from_name("Cobblestone"), Some(VoxelType::Cobblestone));
        assert_eq!(VoxelType::from_name("unobtainium"), None);
    }
}
