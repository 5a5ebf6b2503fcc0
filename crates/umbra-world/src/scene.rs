//! Placed geometry produced by a region build.

use std::sync::Arc;

use hashbrown::HashMap;
use umbra_defs::LocShape;
use umbra_model::Model;

use crate::tiles::LEVELS;

/// A loc instance resolved against its definition.
#[derive(Clone, Debug)]
pub struct PlacedLoc {
    pub loc_id: u32,
    pub shape: LocShape,
    pub angle: u8,
    pub level: usize,
    pub x: i32,
    pub z: i32,
    /// Average of the tile's corner heights.
    pub y: i32,
    pub bitset: u32,
    pub typecode2: u8,
    pub model: Option<Arc<Model>>,
}

impl PlacedLoc {
    /// Loc id packed into a placement bitset.
    #[inline]
    pub fn bitset_loc_id(bitset: u32) -> u32 {
        (bitset >> 14) & 0x7fff
    }
}

#[derive(Clone, Debug)]
pub struct SceneWall {
    pub loc: PlacedLoc,
    /// Second half of an L-shaped wall.
    pub second: Option<Arc<Model>>,
    pub type_a: u8,
    pub type_b: u8,
}

#[derive(Clone, Debug)]
pub struct SceneWallDecoration {
    pub loc: PlacedLoc,
    pub offset_x: i32,
    pub offset_z: i32,
    pub yaw: i32,
    pub wall_type: u8,
}

#[derive(Clone, Debug)]
pub struct SceneLoc {
    pub loc: PlacedLoc,
    pub width: i32,
    pub length: i32,
    pub yaw: i32,
}

/// Which scene slot an animated loc occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneLayer {
    Wall,
    WallDecoration,
    Loc,
    GroundDecoration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimatedLoc {
    pub loc_id: u32,
    pub level: usize,
    pub layer: SceneLayer,
    pub x: i32,
    pub z: i32,
    pub anim: i32,
}

/// One terrain tile ready for drawing. Corners are ordered `[sw, se, ne, nw]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroundTile {
    pub level: usize,
    pub x: i32,
    pub z: i32,
    /// Zero for a plain underlay tile, otherwise overlay shape + 1.
    pub shape: u8,
    pub rotation: u8,
    pub texture: Option<i32>,
    pub heights: [i32; 4],
    pub underlay: [i32; 4],
    pub overlay: [i32; 4],
    /// Blended underlay colour with the build's hue and lightness offsets, or -1.
    pub tint: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OccluderKind {
    /// Vertical plane at constant x, extending along z.
    WallZ,
    /// Vertical plane at constant z, extending along x.
    WallX,
    Floor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occluder {
    pub kind: OccluderKind,
    pub top_level: usize,
    pub min_level: usize,
    pub max_level: usize,
    pub min_tile_x: i32,
    pub max_tile_x: i32,
    pub min_tile_z: i32,
    pub max_tile_z: i32,
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl Occluder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: OccluderKind,
        top_level: usize,
        levels: (usize, usize),
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
        min_z: i32,
        max_z: i32,
    ) -> Self {
        Self {
            kind,
            top_level,
            min_level: levels.0,
            max_level: levels.1,
            min_tile_x: min_x / 128,
            max_tile_x: max_x / 128,
            min_tile_z: min_z / 128,
            max_tile_z: max_z / 128,
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
        }
    }
}

type TileKey = (usize, i32, i32);

pub struct Scene {
    pub size_x: usize,
    pub size_z: usize,
    pub ground: Vec<GroundTile>,
    pub walls: HashMap<TileKey, SceneWall>,
    pub wall_decorations: HashMap<TileKey, SceneWallDecoration>,
    pub ground_decorations: HashMap<TileKey, PlacedLoc>,
    pub locs: Vec<SceneLoc>,
    pub animated: Vec<AnimatedLoc>,
    pub bridges: Vec<(i32, i32)>,
    pub occluders: Vec<Occluder>,
    /// Lowest level anything was placed on.
    pub min_level: usize,
    draw_levels: Vec<u8>,
}

impl Scene {
    pub fn new(size_x: usize, size_z: usize) -> Self {
        Self {
            size_x,
            size_z,
            ground: Vec::new(),
            walls: HashMap::new(),
            wall_decorations: HashMap::new(),
            ground_decorations: HashMap::new(),
            locs: Vec::new(),
            animated: Vec::new(),
            bridges: Vec::new(),
            occluders: Vec::new(),
            min_level: LEVELS,
            draw_levels: vec![0; LEVELS * size_x * size_z],
        }
    }

    pub fn note_level(&mut self, level: usize) {
        self.min_level = self.min_level.min(level);
    }

    pub fn add_wall(&mut self, wall: SceneWall) {
        if wall.loc.model.is_none() && wall.second.is_none() {
            return;
        }
        let key = (wall.loc.level, wall.loc.x, wall.loc.z);
        self.walls.insert(key, wall);
    }

    /// Bitset of the wall on a tile, if any.
    pub fn wall_bitset(&self, level: usize, x: i32, z: i32) -> Option<u32> {
        self.walls.get(&(level, x, z)).map(|w| w.loc.bitset)
    }

    pub fn set_wall_decoration(&mut self, decoration: SceneWallDecoration) {
        if decoration.loc.model.is_none() {
            return;
        }
        let key = (decoration.loc.level, decoration.loc.x, decoration.loc.z);
        self.wall_decorations.insert(key, decoration);
    }

    /// Rescales an existing decoration's offset to a wall of `width` (16 = default).
    pub fn set_wall_decoration_offset(&mut self, level: usize, x: i32, z: i32, width: i32) {
        if let Some(d) = self.wall_decorations.get_mut(&(level, x, z)) {
            d.offset_x = d.offset_x * width / 16;
            d.offset_z = d.offset_z * width / 16;
        }
    }

    pub fn add_ground_decoration(&mut self, loc: PlacedLoc) {
        if loc.model.is_none() {
            return;
        }
        self.ground_decorations.insert((loc.level, loc.x, loc.z), loc);
    }

    /// Adds a free-standing loc. Returns false when it has no model to place.
    pub fn add_loc(&mut self, loc: SceneLoc) -> bool {
        if loc.loc.model.is_none() {
            return false;
        }
        self.locs.push(loc);
        true
    }

    pub fn add_ground(&mut self, tile: GroundTile) {
        self.ground.push(tile);
    }

    #[inline]
    fn draw_index(&self, level: usize, x: i32, z: i32) -> Option<usize> {
        if level >= LEVELS || x < 0 || z < 0 || x as usize >= self.size_x || z as usize >= self.size_z {
            return None;
        }
        Some((level * self.size_x + x as usize) * self.size_z + z as usize)
    }

    pub fn set_draw_level(&mut self, level: usize, x: i32, z: i32, draw_level: usize) {
        if let Some(i) = self.draw_index(level, x, z) {
            self.draw_levels[i] = draw_level as u8;
        }
    }

    pub fn draw_level(&self, level: usize, x: i32, z: i32) -> Option<usize> {
        self.draw_index(level, x, z).map(|i| self.draw_levels[i] as usize)
    }

    pub fn set_bridge(&mut self, x: i32, z: i32) {
        self.bridges.push((x, z));
    }

    pub fn add_occluder(&mut self, occluder: Occluder) {
        self.occluders.push(occluder);
    }

    pub fn occluders_on(&self, top_level: usize) -> impl Iterator<Item = &Occluder> {
        self.occluders.iter().filter(move |o| o.top_level == top_level)
    }

    /// Visits every placed model, including the second half of L walls.
    pub fn for_each_model_mut(&mut self, mut f: impl FnMut(&mut Arc<Model>)) {
        let placed = self
            .walls
            .values_mut()
            .map(|w| &mut w.loc)
            .chain(self.wall_decorations.values_mut().map(|d| &mut d.loc))
            .chain(self.ground_decorations.values_mut())
            .chain(self.locs.iter_mut().map(|l| &mut l.loc));
        for loc in placed {
            if let Some(model) = loc.model.as_mut() {
                f(model);
            }
        }
        for wall in self.walls.values_mut() {
            if let Some(model) = wall.second.as_mut() {
                f(model);
            }
        }
    }

    /// Number of placed loc instances.
    pub fn loc_count(&self) -> usize {
        self.walls.len() + self.wall_decorations.len() + self.ground_decorations.len() + self.locs.len()
    }
}
