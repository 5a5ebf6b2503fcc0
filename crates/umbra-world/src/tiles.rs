/// Number of vertical levels in a region.
pub const LEVELS: usize = 4;

/// Per-tile record. Heights, shadow and occlusion describe the tile's
/// south-west corner, so the arena is one cell larger than the region on each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub height: i32,
    /// Floor id + 1, zero for none.
    pub underlay: u8,
    /// Floor id + 1, zero for none.
    pub overlay: u8,
    pub overlay_shape: u8,
    pub overlay_rotation: u8,
    pub flags: u8,
    /// Three bits (wall along z, wall along x, floor) per top level.
    pub occlude: u16,
    pub shadow: u8,
    pub lightness: i32,
}

pub mod flags {
    /// Blocks movement.
    pub const BLOCKED: u8 = 0x1;
    /// On level 1: the column is a bridge and everything below moves down a level.
    pub const LINK_BELOW: u8 = 0x2;
    pub const ROOF: u8 = 0x4;
    /// Drawn on level 0 regardless of its own level.
    pub const FORCE_LOWEST: u8 = 0x8;
    pub const VIS_BELOW: u8 = 0x10;
}

pub mod occlude {
    pub const WALL_Z: u16 = 0x249;
    pub const WALL_X: u16 = 0x492;
    pub const FLOOR: u16 = 0x924;
}

#[derive(Clone, Debug)]
pub struct TileMap {
    pub size_x: usize,
    pub size_z: usize,
    tiles: Vec<Tile>,
}

impl TileMap {
    pub fn new(size_x: usize, size_z: usize) -> Self {
        Self {
            size_x,
            size_z,
            tiles: vec![Tile::default(); LEVELS * (size_x + 1) * (size_z + 1)],
        }
    }

    #[inline]
    fn idx(&self, level: usize, x: usize, z: usize) -> usize {
        debug_assert!(level < LEVELS && x <= self.size_x && z <= self.size_z);
        (level * (self.size_x + 1) + x) * (self.size_z + 1) + z
    }

    #[inline]
    pub fn get(&self, level: usize, x: usize, z: usize) -> &Tile {
        &self.tiles[self.idx(level, x, z)]
    }

    #[inline]
    pub fn get_mut(&mut self, level: usize, x: usize, z: usize) -> &mut Tile {
        let i = self.idx(level, x, z);
        &mut self.tiles[i]
    }

    #[inline]
    pub fn height(&self, level: usize, x: usize, z: usize) -> i32 {
        self.get(level, x, z).height
    }

    #[inline]
    pub fn flags(&self, level: usize, x: usize, z: usize) -> u8 {
        self.get(level, x, z).flags
    }

    #[inline]
    pub fn occlude(&self, level: usize, x: usize, z: usize) -> u16 {
        self.get(level, x, z).occlude
    }

    /// Corner heights `[sw, se, ne, nw]` of a tile.
    #[inline]
    pub fn corner_heights(&self, level: usize, x: usize, z: usize) -> [i32; 4] {
        [
            self.height(level, x, z),
            self.height(level, x + 1, z),
            self.height(level, x + 1, z + 1),
            self.height(level, x, z + 1),
        ]
    }

    /// Level a tile is drawn on once bridges and forced-lowest tiles are resolved.
    pub fn draw_level(&self, level: usize, x: usize, z: usize) -> usize {
        if self.flags(level, x, z) & flags::FORCE_LOWEST != 0 {
            0
        } else if level > 0 && self.flags(1, x, z) & flags::LINK_BELOW != 0 {
            level - 1
        } else {
            level
        }
    }

    /// Raises the shadow at a corner to at least `power`.
    #[inline]
    pub fn raise_shadow(&mut self, level: usize, x: usize, z: usize, power: u8) {
        let t = self.get_mut(level, x, z);
        t.shadow = t.shadow.max(power);
    }
}
