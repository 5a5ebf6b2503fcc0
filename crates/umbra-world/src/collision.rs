use umbra_defs::WallKind;

/// Collision flag bits. Projectile-blocking variants are the walk bits `<< 9`.
pub mod flag {
    pub const WALL_NORTH_WEST: i32 = 0x1;
    pub const WALL_NORTH: i32 = 0x2;
    pub const WALL_NORTH_EAST: i32 = 0x4;
    pub const WALL_EAST: i32 = 0x8;
    pub const WALL_SOUTH_EAST: i32 = 0x10;
    pub const WALL_SOUTH: i32 = 0x20;
    pub const WALL_SOUTH_WEST: i32 = 0x40;
    pub const WALL_WEST: i32 = 0x80;
    pub const LOC: i32 = 0x100;
    pub const LOC_PROJ_BLOCKER: i32 = 0x20000;
    pub const FLOOR: i32 = 0x20_0000;
    pub const OPEN: i32 = 0x100_0000;
    pub const BORDER: i32 = 0xff_ffff;
}

/// Walkability flags for one level of a region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionGrid {
    pub size_x: usize,
    pub size_z: usize,
    flags: Vec<i32>,
}

impl CollisionGrid {
    pub fn new(size_x: usize, size_z: usize) -> Self {
        let mut grid = Self {
            size_x,
            size_z,
            flags: vec![0; size_x * size_z],
        };
        grid.reset();
        grid
    }

    /// One grid per level.
    pub fn levels(size_x: usize, size_z: usize) -> Vec<CollisionGrid> {
        (0..crate::tiles::LEVELS)
            .map(|_| CollisionGrid::new(size_x, size_z))
            .collect()
    }

    pub fn reset(&mut self) {
        for x in 0..self.size_x {
            for z in 0..self.size_z {
                let border = x == 0 || z == 0 || x == self.size_x - 1 || z == self.size_z - 1;
                self.flags[x * self.size_z + z] = if border { flag::BORDER } else { flag::OPEN };
            }
        }
    }

    #[inline]
    pub fn get(&self, x: i32, z: i32) -> Option<i32> {
        self.index(x, z).map(|i| self.flags[i])
    }

    #[inline]
    fn index(&self, x: i32, z: i32) -> Option<usize> {
        if x < 0 || z < 0 || x as usize >= self.size_x || z as usize >= self.size_z {
            None
        } else {
            Some(x as usize * self.size_z + z as usize)
        }
    }

    #[inline]
    fn add(&mut self, x: i32, z: i32, bits: i32) {
        if let Some(i) = self.index(x, z) {
            self.flags[i] |= bits;
        }
    }

    pub fn add_floor(&mut self, x: i32, z: i32) {
        self.add(x, z, flag::FLOOR);
    }

    /// Blocks a `width` x `length` footprint; the axes swap for odd angles.
    pub fn add_loc(&mut self, x: i32, z: i32, width: i32, length: i32, angle: i32, blockrange: bool) {
        let mut bits = flag::LOC;
        if blockrange {
            bits |= flag::LOC_PROJ_BLOCKER;
        }
        let (w, l) = if angle == 1 || angle == 3 {
            (length, width)
        } else {
            (width, length)
        };
        for tx in x..x + w {
            for tz in z..z + l {
                self.add(tx, tz, bits);
            }
        }
    }

    pub fn add_wall(&mut self, x: i32, z: i32, kind: WallKind, angle: i32, blockrange: bool) {
        self.wall_bits(x, z, kind, angle, 0);
        if blockrange {
            self.wall_bits(x, z, kind, angle, 9);
        }
    }

    fn wall_bits(&mut self, x: i32, z: i32, kind: WallKind, angle: i32, shift: u32) {
        use flag::*;
        let mut put = |dx: i32, dz: i32, bits: i32| self.add(x + dx, z + dz, bits << shift);
        match (kind, angle & 3) {
            (WallKind::Straight, 0) => {
                put(0, 0, WALL_WEST);
                put(-1, 0, WALL_EAST);
            }
            (WallKind::Straight, 1) => {
                put(0, 0, WALL_NORTH);
                put(0, 1, WALL_SOUTH);
            }
            (WallKind::Straight, 2) => {
                put(0, 0, WALL_EAST);
                put(1, 0, WALL_WEST);
            }
            (WallKind::Straight, _) => {
                put(0, 0, WALL_SOUTH);
                put(0, -1, WALL_NORTH);
            }
            (WallKind::DiagonalCorner | WallKind::SquareCorner, 0) => {
                put(0, 0, WALL_NORTH_WEST);
                put(-1, 1, WALL_SOUTH_EAST);
            }
            (WallKind::DiagonalCorner | WallKind::SquareCorner, 1) => {
                put(0, 0, WALL_NORTH_EAST);
                put(1, 1, WALL_SOUTH_WEST);
            }
            (WallKind::DiagonalCorner | WallKind::SquareCorner, 2) => {
                put(0, 0, WALL_SOUTH_EAST);
                put(1, -1, WALL_NORTH_WEST);
            }
            (WallKind::DiagonalCorner | WallKind::SquareCorner, _) => {
                put(0, 0, WALL_SOUTH_WEST);
                put(-1, -1, WALL_NORTH_EAST);
            }
            (WallKind::L, 0) => {
                put(0, 0, WALL_WEST | WALL_NORTH);
                put(-1, 0, WALL_EAST);
                put(0, 1, WALL_SOUTH);
            }
            (WallKind::L, 1) => {
                put(0, 0, WALL_NORTH | WALL_EAST);
                put(0, 1, WALL_SOUTH);
                put(1, 0, WALL_WEST);
            }
            (WallKind::L, 2) => {
                put(0, 0, WALL_EAST | WALL_SOUTH);
                put(1, 0, WALL_WEST);
                put(0, -1, WALL_NORTH);
            }
            (WallKind::L, _) => {
                put(0, 0, WALL_SOUTH | WALL_WEST);
                put(0, -1, WALL_NORTH);
                put(-1, 0, WALL_EAST);
            }
        }
    }
}
