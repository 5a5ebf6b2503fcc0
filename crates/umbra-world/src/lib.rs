//! Region construction: terrain streams, loc placement, collision, colour blending and occluders.
#![forbid(unsafe_code)]

pub mod build;
pub mod collision;
pub mod error;
pub mod ground;
pub mod locs;
pub mod noise;
pub mod occlusion;
pub mod scene;
pub mod tiles;

pub use build::BuildOptions;
pub use collision::CollisionGrid;
pub use error::WorldError;
pub use locs::LocContext;
pub use scene::{GroundTile, Occluder, OccluderKind, PlacedLoc, Scene};
pub use tiles::{LEVELS, Tile, TileMap};

/// Region side length in tiles (13x13 zones of 8 tiles).
pub const REGION_SIZE: usize = 104;

/// Tiles per mapsquare side in the ground and loc streams.
pub const MAPSQUARE_SIZE: i32 = 64;

pub struct World {
    pub tiles: TileMap,
    pub options: BuildOptions,
}

impl World {
    pub fn new(size_x: usize, size_z: usize) -> Self {
        Self::with_options(size_x, size_z, BuildOptions::default())
    }

    pub fn with_options(size_x: usize, size_z: usize, options: BuildOptions) -> Self {
        Self {
            tiles: TileMap::new(size_x, size_z),
            options,
        }
    }

    #[inline]
    pub fn size_x(&self) -> usize {
        self.tiles.size_x
    }

    #[inline]
    pub fn size_z(&self) -> usize {
        self.tiles.size_z
    }
}
