//! Noise-driven heightmap terrain with layered columns and carved caves.
//!
//! Surface height comes from multi-octave fractal Brownian motion (fBm) over
//! Perlin noise. Each column is then layered top to bottom: a surface block
//! chosen by height, a few sub-surface layers, stone with 3D-noise caves, and
//! bedrock at the floor.

use noise::{NoiseFn, Perlin};
use strata_voxel::{CHUNK_HEIGHT, CHUNK_SIZE, Chunk, Voxel, VoxelType};

use crate::{TerrainError, TerrainGenerator};

/// Tuning for [`HeightmapTerrain`].
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// World seed for deterministic generation.
    pub seed: u64,
    /// Number of noise octaves composited into the surface height.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// World-space frequency of the first octave.
    pub scale: f64,
    /// Surface height where the noise sits at −1.
    pub base_height: i32,
    /// Height gained per unit of noise; the surface spans
    /// `base_height ..= base_height + 2 * height_range`.
    pub height_range: f64,
    /// World-space frequency of the cave noise.
    pub cave_scale: f64,
    /// Deep voxels whose cave noise exceeds this become air.
    pub cave_threshold: f64,
    /// Number of sub-surface layers under the top block.
    pub subsurface_depth: i32,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 0.01,
            base_height: 40,
            height_range: 20.0,
            cave_scale: 0.05,
            cave_threshold: 0.5,
            subsurface_depth: 3,
        }
    }
}

/// Surface above this is grassland.
const GRASS_LINE: i32 = 62;
/// Surface above this (and at most [`GRASS_LINE`]) is beach.
const SAND_LINE: i32 = 58;

/// Heightmap terrain generator.
pub struct HeightmapTerrain {
    height_noise: Perlin,
    cave_noise: Perlin,
    params: HeightmapParams,
}

impl HeightmapTerrain {
    pub fn new(params: HeightmapParams) -> Self {
        let folded = (params.seed ^ (params.seed >> 32)) as u32;
        Self {
            height_noise: Perlin::new(folded),
            // Offset so caves don't line up with hills.
            cave_noise: Perlin::new(folded.wrapping_add(0xCAFE_BABE)),
            params,
        }
    }

    /// Default parameters with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(HeightmapParams {
            seed,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }

    /// fBm sample in `[-1, 1]`, normalized by the summed octave amplitudes.
    fn fbm(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut max_amplitude = 0.0;
        let mut frequency = self.params.scale;
        let mut amplitude = 1.0;

        for _ in 0..self.params.octaves {
            total += self.height_noise.get([x * frequency, z * frequency]) * amplitude;
            max_amplitude += amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        if max_amplitude > 0.0 {
            (total / max_amplitude).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Surface height of the world column `(x, z)`, clamped to the chunk.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let n = self.fbm(x as f64, z as f64);
        let height = self.params.base_height + ((n + 1.0) * self.params.height_range) as i32;
        height.clamp(0, CHUNK_HEIGHT as i32 - 1)
    }

    /// Block type at world `(x, y, z)` in a column whose surface is `surface`.
    pub fn block_at(&self, x: i32, y: i32, z: i32, surface: i32) -> VoxelType {
        if y > surface {
            VoxelType::Air
        } else if y == 0 {
            VoxelType::Bedrock
        } else if y == surface {
            if surface > GRASS_LINE {
                VoxelType::Grass
            } else if surface > SAND_LINE {
                VoxelType::Sand
            } else {
                VoxelType::Stone
            }
        } else if y >= surface - self.params.subsurface_depth {
            if surface > SAND_LINE {
                VoxelType::Dirt
            } else {
                VoxelType::Stone
            }
        } else {
            let s = self.params.cave_scale;
            let cave = self
                .cave_noise
                .get([x as f64 * s, y as f64 * s, z as f64 * s]);
            if cave > self.params.cave_threshold {
                VoxelType::Air
            } else {
                VoxelType::Stone
            }
        }
    }
}

impl TerrainGenerator for HeightmapTerrain {
    fn seed(&self) -> u64 {
        self.params.seed
    }

    fn generate(&self, chunk: &mut Chunk) -> Result<(), TerrainError> {
        let pos = chunk.position();
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let world = pos.to_world(lx, 0, lz);
                let surface = self.surface_height(world.x, world.z);
                for y in 0..=surface {
                    let kind = self.block_at(world.x, y, world.z, surface);
                    if kind != VoxelType::Air {
                        chunk.set_voxel(lx, y as usize, lz, Voxel::new(kind))?;
                    }
                }
            }
        }
        tracing::trace!(
            "Generated heightmap chunk {:?} ({} solid voxels)",
            pos,
            chunk.solid_count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strata_voxel::ChunkPos;

    use super::*;

    fn generate(terrain: &HeightmapTerrain, pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(pos);
        terrain.generate(&mut chunk).unwrap();
        chunk
    }

    #[test]
    fn test_same_seed_same_voxels() {
        let a = HeightmapTerrain::with_seed(12345);
        let b = HeightmapTerrain::with_seed(12345);
        for pos in [ChunkPos::new(0, 0), ChunkPos::new(-3, 7), ChunkPos::new(40, -12)] {
            assert_eq!(generate(&a, pos).voxels(), generate(&b, pos).voxels(), "{pos:?}");
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = HeightmapTerrain::with_seed(1);
        let b = HeightmapTerrain::with_seed(999);
        let differs = (0..64).any(|i| {
            let (x, z) = (i * 7 + 3, i * 13 + 5);
            a.surface_height(x, z) != b.surface_height(x, z)
        });
        assert!(differs, "two seeds produced identical heightmaps");
    }

    #[test]
    fn test_surface_height_in_expected_band() {
        let terrain = HeightmapTerrain::with_seed(7);
        for x in (-200..200).step_by(9) {
            for z in (-200..200).step_by(11) {
                let h = terrain.surface_height(x, z);
                assert!((40..=80).contains(&h), "height {h} at ({x}, {z})");
            }
        }
    }

    #[test]
    fn test_column_layers() {
        let terrain = HeightmapTerrain::with_seed(3);
        let chunk = generate(&terrain, ChunkPos::new(2, -1));
        let origin = ChunkPos::new(2, -1).world_origin();

        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let surface = terrain.surface_height(origin.x + lx as i32, origin.z + lz as i32);
                let s = surface as usize;
                assert_eq!(chunk.get_voxel(lx, 0, lz).kind, VoxelType::Bedrock);
                assert_eq!(chunk.get_voxel(lx, s + 1, lz), Voxel::AIR);

                let expected_top = if surface > GRASS_LINE {
                    VoxelType::Grass
                } else if surface > SAND_LINE {
                    VoxelType::Sand
                } else {
                    VoxelType::Stone
                };
                assert_eq!(chunk.get_voxel(lx, s, lz).kind, expected_top);

                let expected_sub = if surface > SAND_LINE {
                    VoxelType::Dirt
                } else {
                    VoxelType::Stone
                };
                for y in s - 3..s {
                    assert_eq!(chunk.get_voxel(lx, y, lz).kind, expected_sub);
                }
            }
        }
    }

    #[test]
    fn test_deep_voxels_are_stone_or_cave() {
        let terrain = HeightmapTerrain::with_seed(99);
        let chunk = generate(&terrain, ChunkPos::new(0, 0));
        for y in 1..30 {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let kind = chunk.get_voxel(x, y, z).kind;
                    assert!(matches!(kind, VoxelType::Stone | VoxelType::Air), "{kind:?}");
                }
            }
        }
    }
}
