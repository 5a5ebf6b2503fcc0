//! Greedy merging of per-tile occlusion bits into occluder rectangles.

use crate::ground::LEVEL_HEIGHT;
use crate::scene::{Occluder, OccluderKind, Scene};
use crate::tiles::{LEVELS, TileMap};

/// Smallest wall occluder, in tile-levels.
pub const MIN_WALL_AREA: i32 = 8;
/// Smallest floor occluder, in tiles.
pub const MIN_FLOOR_AREA: i32 = 4;

const WALL_Z_BIT: u16 = 1;
const WALL_X_BIT: u16 = 2;
const FLOOR_BIT: u16 = 4;

/// Merges occlusion bits into occluders, top level by top level, clearing every
/// bit it covers. Returns the number of occluders emitted.
pub fn build_occluders(tiles: &mut TileMap, scene: &mut Scene) -> usize {
    let mut merger = Merger { tiles, emitted: 0 };
    for top in 0..LEVELS {
        let shift = 3 * top as u32;
        let bits = [WALL_Z_BIT << shift, WALL_X_BIT << shift, FLOOR_BIT << shift];
        for level in 0..=top {
            for z in 0..=merger.tiles.size_z {
                for x in 0..=merger.tiles.size_x {
                    if let Some(o) = merger.wall_z(top, level, x, z, bits[0]) {
                        scene.add_occluder(o);
                    }
                    if let Some(o) = merger.wall_x(top, level, x, z, bits[1]) {
                        scene.add_occluder(o);
                    }
                    if let Some(o) = merger.floor(top, level, x, z, bits[2]) {
                        scene.add_occluder(o);
                    }
                }
            }
        }
    }
    log::debug!("merged {} occluders", merger.emitted);
    merger.emitted
}

struct Merger<'a> {
    tiles: &'a mut TileMap,
    emitted: usize,
}

impl Merger<'_> {
    #[inline]
    fn has(&self, level: usize, x: usize, z: usize, bit: u16) -> bool {
        self.tiles.occlude(level, x, z) & bit != 0
    }

    fn clear(&mut self, levels: (usize, usize), xs: (usize, usize), zs: (usize, usize), bit: u16) {
        for level in levels.0..=levels.1 {
            for x in xs.0..=xs.1 {
                for z in zs.0..=zs.1 {
                    self.tiles.get_mut(level, x, z).occlude &= !bit;
                }
            }
        }
        self.emitted += 1;
    }

    /// Wall running along z at constant x.
    fn wall_z(&mut self, top: usize, level: usize, x: usize, z: usize, bit: u16) -> Option<Occluder> {
        if !self.has(level, x, z, bit) {
            return None;
        }
        let (mut min_z, mut max_z) = (z, z);
        while min_z > 0 && self.has(level, x, min_z - 1, bit) {
            min_z -= 1;
        }
        while max_z < self.tiles.size_z && self.has(level, x, max_z + 1, bit) {
            max_z += 1;
        }
        let (mut min_level, mut max_level) = (level, level);
        while min_level > 0 && (min_z..=max_z).all(|z| self.has(min_level - 1, x, z, bit)) {
            min_level -= 1;
        }
        while max_level < top && (min_z..=max_z).all(|z| self.has(max_level + 1, x, z, bit)) {
            max_level += 1;
        }
        let area = (max_level + 1 - min_level) as i32 * (max_z - min_z + 1) as i32;
        if area < MIN_WALL_AREA {
            return None;
        }
        let min_y = self.tiles.height(max_level, x, min_z) - LEVEL_HEIGHT;
        let max_y = self.tiles.height(min_level, x, min_z);
        self.clear((min_level, max_level), (x, x), (min_z, max_z), bit);
        let wx = x as i32 * 128;
        Some(Occluder::new(
            OccluderKind::WallZ,
            top,
            (min_level, max_level),
            wx,
            wx,
            min_y,
            max_y,
            min_z as i32 * 128,
            max_z as i32 * 128 + 128,
        ))
    }

    /// Wall running along x at constant z.
    fn wall_x(&mut self, top: usize, level: usize, x: usize, z: usize, bit: u16) -> Option<Occluder> {
        if !self.has(level, x, z, bit) {
            return None;
        }
        let (mut min_x, mut max_x) = (x, x);
        while min_x > 0 && self.has(level, min_x - 1, z, bit) {
            min_x -= 1;
        }
        while max_x < self.tiles.size_x && self.has(level, max_x + 1, z, bit) {
            max_x += 1;
        }
        let (mut min_level, mut max_level) = (level, level);
        while min_level > 0 && (min_x..=max_x).all(|x| self.has(min_level - 1, x, z, bit)) {
            min_level -= 1;
        }
        while max_level < top && (min_x..=max_x).all(|x| self.has(max_level + 1, x, z, bit)) {
            max_level += 1;
        }
        let area = (max_level + 1 - min_level) as i32 * (max_x - min_x + 1) as i32;
        if area < MIN_WALL_AREA {
            return None;
        }
        let min_y = self.tiles.height(max_level, min_x, z) - LEVEL_HEIGHT;
        let max_y = self.tiles.height(min_level, min_x, z);
        self.clear((min_level, max_level), (min_x, max_x), (z, z), bit);
        let wz = z as i32 * 128;
        Some(Occluder::new(
            OccluderKind::WallX,
            top,
            (min_level, max_level),
            min_x as i32 * 128,
            max_x as i32 * 128 + 128,
            min_y,
            max_y,
            wz,
            wz,
        ))
    }

    /// Flat floor on a single level.
    fn floor(&mut self, top: usize, level: usize, x: usize, z: usize, bit: u16) -> Option<Occluder> {
        if !self.has(level, x, z, bit) {
            return None;
        }
        let (mut min_z, mut max_z) = (z, z);
        while min_z > 0 && self.has(level, x, min_z - 1, bit) {
            min_z -= 1;
        }
        while max_z < self.tiles.size_z && self.has(level, x, max_z + 1, bit) {
            max_z += 1;
        }
        let (mut min_x, mut max_x) = (x, x);
        while min_x > 0 && (min_z..=max_z).all(|z| self.has(level, min_x - 1, z, bit)) {
            min_x -= 1;
        }
        while max_x < self.tiles.size_x && (min_z..=max_z).all(|z| self.has(level, max_x + 1, z, bit)) {
            max_x += 1;
        }
        let area = (max_x - min_x + 1) as i32 * (max_z - min_z + 1) as i32;
        if area < MIN_FLOOR_AREA {
            return None;
        }
        let y = self.tiles.height(level, min_x, min_z);
        self.clear((level, level), (min_x, max_x), (min_z, max_z), bit);
        Some(Occluder::new(
            OccluderKind::Floor,
            top,
            (level, level),
            min_x as i32 * 128,
            max_x as i32 * 128 + 128,
            y,
            y,
            min_z as i32 * 128,
            max_z as i32 * 128 + 128,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::occlude;

    #[test]
    fn long_wall_merges_into_one_occluder() {
        let mut tiles = TileMap::new(16, 16);
        for z in 2..10 {
            tiles.get_mut(0, 5, z).occlude |= occlude::WALL_Z;
        }
        let mut scene = Scene::new(16, 16);
        // one per top level: a level-0 wall hides things from every level above
        assert_eq!(build_occluders(&mut tiles, &mut scene), 4);
        assert_eq!(scene.occluders_on(0).count(), 1);
        let o = scene.occluders[0];
        assert_eq!(o.kind, OccluderKind::WallZ);
        assert_eq!(o.top_level, 0);
        assert_eq!((o.min_x, o.max_x), (640, 640));
        assert_eq!((o.min_z, o.max_z), (256, 1280));
        assert_eq!((o.min_y, o.max_y), (-240, 0));
        assert_eq!(tiles.occlude(0, 5, 2), 0);
    }

    #[test]
    fn short_walls_are_left_alone() {
        let mut tiles = TileMap::new(16, 16);
        for z in 2..5 {
            tiles.get_mut(0, 5, z).occlude |= occlude::WALL_Z;
        }
        let mut scene = Scene::new(16, 16);
        assert_eq!(build_occluders(&mut tiles, &mut scene), 0);
        assert_eq!(tiles.occlude(0, 5, 3), occlude::WALL_Z);
    }

    #[test]
    fn stacked_walls_count_levels() {
        let mut tiles = TileMap::new(16, 16);
        for level in 0..2 {
            for x in 3..7 {
                tiles.get_mut(level, x, 8).occlude |= occlude::WALL_X;
            }
        }
        let mut scene = Scene::new(16, 16);
        build_occluders(&mut tiles, &mut scene);
        let spanning: Vec<_> = scene.occluders_on(1).collect();
        assert_eq!(spanning.len(), 1);
        assert_eq!((spanning[0].min_x, spanning[0].max_x), (384, 896));
        assert_eq!(spanning[0].kind, OccluderKind::WallX);
        // on top level 0 only one level is available: area 4 is below the threshold
        assert_eq!(scene.occluders_on(0).count(), 0);
    }

    #[test]
    fn floors_merge_rectangles() {
        let mut tiles = TileMap::new(16, 16);
        for x in 4..6 {
            for z in 4..6 {
                tiles.get_mut(1, x, z).occlude |= occlude::FLOOR;
                tiles.get_mut(1, x, z).height = -240;
            }
        }
        let mut scene = Scene::new(16, 16);
        build_occluders(&mut tiles, &mut scene);
        let floors: Vec<_> = scene
            .occluders
            .iter()
            .filter(|o| o.kind == OccluderKind::Floor)
            .collect();
        // visible from top levels 1, 2 and 3
        assert_eq!(floors.len(), 3);
        assert!(floors.iter().all(|o| o.min_y == -240 && o.max_tile_x == 6));
    }
}
