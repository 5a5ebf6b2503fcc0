use std::sync::Arc;

use umbra_cache::{ModelCache, ModelProvider};
use umbra_defs::{DecorKind, DefsRegistry, LocShape, LocType, WallKind};
use umbra_model::{Model, NoFrames, Packet};

use crate::collision::CollisionGrid;
use crate::error::WorldError;
use crate::scene::{
    AnimatedLoc, PlacedLoc, Scene, SceneLayer, SceneLoc, SceneWall, SceneWallDecoration,
};
use crate::tiles::{LEVELS, flags, occlude};
use crate::World;

/// Wall edge bits for angles 0..4 (west, north, east, south).
pub const WALL_TYPES: [u8; 4] = [1, 2, 4, 8];
/// Wall corner bits for angles 0..4.
pub const CORNER_TYPES: [u8; 4] = [16, 32, 64, 128];
const DECOR_FORWARD_X: [i32; 4] = [1, 0, -1, 0];
const DECOR_FORWARD_Z: [i32; 4] = [0, -1, 0, 1];

const WALL_SHADOW: u8 = 50;
const MAX_LOC_SHADOW: i32 = 30;
const DEFAULT_WALL_WIDTH: i32 = 16;

/// Everything loc placement writes to or reads from besides the tile arena.
pub struct LocContext<'a, P: ModelProvider> {
    pub scene: &'a mut Scene,
    pub collision: &'a mut [CollisionGrid],
    pub defs: &'a DefsRegistry,
    pub cache: &'a mut ModelCache<P>,
}

/// Model shape a placement shape draws its base models from.
pub fn model_shape(shape: LocShape) -> u8 {
    match shape {
        LocShape::WallDecor(_) => LocShape::WALL_DECOR_STRAIGHT_NOOFFSET,
        LocShape::Centrepiece { .. } => LocShape::CENTREPIECE_STRAIGHT,
        other => other.id(),
    }
}

/// One entry of a loc stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocEntry {
    pub loc_id: u32,
    pub level: usize,
    pub x: i32,
    pub z: i32,
    pub shape: u8,
    pub angle: u8,
}

/// Walks a loc stream: smart id deltas, then smart position deltas per id.
pub fn read_loc_stream(
    bytes: &[u8],
    mut visit: impl FnMut(LocEntry) -> Result<(), WorldError>,
) -> Result<(), WorldError> {
    let mut buf = Packet::new(bytes);
    let mut loc_id: i32 = -1;
    loop {
        let delta = buf.gsmart()?;
        if delta == 0 {
            return Ok(());
        }
        loc_id += delta;
        let mut pos = 0;
        loop {
            let step = buf.gsmart()?;
            if step == 0 {
                break;
            }
            pos += step - 1;
            let info = buf.g1()?;
            visit(LocEntry {
                loc_id: loc_id as u32,
                level: (pos >> 12) as usize,
                x: (pos >> 6) & 0x3f,
                z: pos & 0x3f,
                shape: info >> 2,
                angle: info & 3,
            })?;
        }
    }
}

impl World {
    /// True once every model the stream's locs need is resident. Missing
    /// models are requested as a side effect, so callers poll until ready.
    pub fn locs_ready<P: ModelProvider>(
        bytes: &[u8],
        defs: &DefsRegistry,
        cache: &mut ModelCache<P>,
    ) -> Result<bool, WorldError> {
        let mut ready = true;
        read_loc_stream(bytes, |e| {
            let loc = defs.loc(e.loc_id).ok_or(WorldError::UnknownLoc {
                id: e.loc_id,
                level: e.level,
                x: e.x,
                z: e.z,
            })?;
            let shape = LocShape::from_id(e.shape).ok_or(WorldError::BadShape {
                id: e.loc_id,
                shape: e.shape,
            })?;
            ready &= cache.loc_ready(loc, model_shape(shape));
            Ok(())
        })?;
        Ok(ready)
    }

    /// Places every loc of a mapsquare stream at `(x_off, z_off)`. Border tiles are
    /// skipped. Returns the number of placements attempted.
    pub fn load_locations<P: ModelProvider>(
        &mut self,
        bytes: &[u8],
        x_off: i32,
        z_off: i32,
        ctx: &mut LocContext<'_, P>,
    ) -> Result<usize, WorldError> {
        let (size_x, size_z) = (self.size_x() as i32, self.size_z() as i32);
        let mut placed = 0;
        read_loc_stream(bytes, |e| {
            let x = e.x + x_off;
            let z = e.z + z_off;
            if x <= 0 || z <= 0 || x >= size_x - 1 || z >= size_z - 1 {
                return Ok(());
            }
            if e.level >= LEVELS {
                return Err(WorldError::BadLevel(e.level));
            }
            let shape = LocShape::from_id(e.shape).ok_or(WorldError::BadShape {
                id: e.loc_id,
                shape: e.shape,
            })?;
            let mut collision_level = e.level as i32;
            if self.tiles.flags(1, x as usize, z as usize) & flags::LINK_BELOW != 0 {
                collision_level -= 1;
            }
            let collision_level = (collision_level >= 0).then_some(collision_level as usize);
            self.add_loc(ctx, e.level, x, z, e.loc_id, shape, e.angle, collision_level)?;
            placed += 1;
            Ok(())
        })?;
        log::debug!("placed {} locs at ({}, {})", placed, x_off, z_off);
        Ok(placed)
    }

    /// Places one loc: requests its model, updates shadow and occlusion on the
    /// tile arena and marks collision on `collision_level` when given.
    #[allow(clippy::too_many_arguments)]
    pub fn add_loc<P: ModelProvider>(
        &mut self,
        ctx: &mut LocContext<'_, P>,
        level: usize,
        x: i32,
        z: i32,
        loc_id: u32,
        shape: LocShape,
        angle: u8,
        collision_level: Option<usize>,
    ) -> Result<(), WorldError> {
        let (ux, uz) = (x as usize, z as usize);
        if self.options.low_memory && self.tiles.flags(0, ux, uz) & flags::LINK_BELOW == 0 {
            if self.tiles.flags(level, ux, uz) & flags::VIS_BELOW != 0 {
                return Ok(());
            }
            if self.tiles.draw_level(level, ux, uz) != self.options.draw_level {
                return Ok(());
            }
        }
        ctx.scene.note_level(level);

        let defs = ctx.defs;
        let loc = defs
            .loc(loc_id)
            .ok_or(WorldError::UnknownLoc { id: loc_id, level, x, z })?;
        let heights = self.tiles.corner_heights(level, ux, uz);
        let y = heights.iter().sum::<i32>() >> 2;
        let mut bitset = x as u32 | (z as u32) << 7 | loc_id << 14 | 0x4000_0000;
        if !loc.active {
            bitset |= 0x8000_0000;
        }
        let typecode2 = (angle << 6) + shape.id();
        let placed = |model: Option<Arc<Model>>| PlacedLoc {
            loc_id,
            shape,
            angle,
            level,
            x,
            z,
            y,
            bitset,
            typecode2,
            model,
        };
        let a = angle as usize & 3;
        let mut fetch = |model_angle: i32| {
            let model = ctx
                .cache
                .get_loc_model(loc, model_shape(shape), model_angle, heights, -1, &NoFrames);
            if model.is_none() {
                log::debug!("loc {} shape {} has no model yet", loc_id, shape.id());
            }
            model
        };

        let layer = match shape {
            LocShape::GroundDecor => {
                if self.options.low_memory && !loc.active && !loc.forcedecor {
                    return Ok(());
                }
                let model = fetch(angle as i32);
                ctx.scene.add_ground_decoration(placed(model));
                if loc.blockwalk && loc.active {
                    if let Some(grid) = grid(ctx.collision, collision_level) {
                        grid.add_floor(x, z);
                    }
                }
                SceneLayer::GroundDecoration
            }
            LocShape::Centrepiece { diagonal } => {
                let model = fetch(angle as i32);
                let (width, length) = if a == 1 || a == 3 {
                    (loc.length, loc.width)
                } else {
                    (loc.width, loc.length)
                };
                if let Some(model) = model {
                    let power = (model.bounds.radius / 4).min(MAX_LOC_SHADOW);
                    ctx.scene.add_loc(SceneLoc {
                        loc: placed(Some(model)),
                        width,
                        length,
                        yaw: if diagonal { 256 } else { 0 },
                    });
                    if loc.shadow {
                        self.shade_footprint(level, ux, uz, width, length, power.max(0) as u8);
                    }
                }
                if loc.blockwalk {
                    if let Some(grid) = grid(ctx.collision, collision_level) {
                        grid.add_loc(x, z, loc.width, loc.length, angle as i32, loc.blockrange);
                    }
                }
                SceneLayer::Loc
            }
            LocShape::Roof(id) => {
                let model = fetch(angle as i32);
                ctx.scene.add_loc(SceneLoc {
                    loc: placed(model),
                    width: 1,
                    length: 1,
                    yaw: 0,
                });
                if (12..=17).contains(&id) && id != 13 && level > 0 {
                    self.tiles.get_mut(level, ux, uz).occlude |= occlude::FLOOR;
                }
                if loc.blockwalk {
                    if let Some(grid) = grid(ctx.collision, collision_level) {
                        grid.add_loc(x, z, loc.width, loc.length, angle as i32, loc.blockrange);
                    }
                }
                SceneLayer::Loc
            }
            LocShape::WallDiagonal => {
                let model = fetch(angle as i32);
                ctx.scene.add_loc(SceneLoc {
                    loc: placed(model),
                    width: 1,
                    length: 1,
                    yaw: 0,
                });
                if loc.blockwalk {
                    if let Some(grid) = grid(ctx.collision, collision_level) {
                        grid.add_loc(x, z, loc.width, loc.length, angle as i32, loc.blockrange);
                    }
                }
                SceneLayer::Loc
            }
            LocShape::Wall(kind) => {
                let wall = match kind {
                    WallKind::Straight => {
                        let model = fetch(angle as i32);
                        if loc.shadow {
                            for (dx, dz) in straight_wall_shadow(a) {
                                self.tiles.get_mut(level, ux + dx, uz + dz).shadow = WALL_SHADOW;
                            }
                        }
                        if loc.occlude {
                            let (dx, dz, bits) = straight_wall_occlusion(a);
                            self.tiles.get_mut(level, ux + dx, uz + dz).occlude |= bits;
                        }
                        SceneWall {
                            loc: placed(model),
                            second: None,
                            type_a: WALL_TYPES[a],
                            type_b: 0,
                        }
                    }
                    WallKind::DiagonalCorner | WallKind::SquareCorner => {
                        let model = fetch(angle as i32);
                        if loc.shadow {
                            let (dx, dz) = corner_shadow(a);
                            self.tiles.get_mut(level, ux + dx, uz + dz).shadow = WALL_SHADOW;
                        }
                        SceneWall {
                            loc: placed(model),
                            second: None,
                            type_a: CORNER_TYPES[a],
                            type_b: 0,
                        }
                    }
                    WallKind::L => {
                        let next = (a + 1) & 3;
                        let first = fetch(angle as i32 + 4);
                        let second = fetch(next as i32);
                        if loc.occlude {
                            for (dx, dz, bits) in l_wall_occlusion(a) {
                                self.tiles.get_mut(level, ux + dx, uz + dz).occlude |= bits;
                            }
                        }
                        SceneWall {
                            loc: placed(first),
                            second,
                            type_a: WALL_TYPES[a],
                            type_b: WALL_TYPES[next],
                        }
                    }
                };
                ctx.scene.add_wall(wall);
                if loc.blockwalk {
                    if let Some(grid) = grid(ctx.collision, collision_level) {
                        grid.add_wall(x, z, kind, angle as i32, loc.blockrange);
                    }
                }
                if matches!(kind, WallKind::Straight | WallKind::L) && loc.wallwidth != DEFAULT_WALL_WIDTH {
                    ctx.scene.set_wall_decoration_offset(level, x, z, loc.wallwidth);
                }
                SceneLayer::Wall
            }
            LocShape::WallDecor(kind) => {
                let model = fetch(0);
                let (offset_x, offset_z, yaw, wall_type) = match kind {
                    DecorKind::StraightNoOffset => (0, 0, a as i32 * 512, WALL_TYPES[a]),
                    DecorKind::StraightOffset => {
                        let width = wall_width(defs, ctx.scene, level, x, z);
                        (
                            DECOR_FORWARD_X[a] * width,
                            DECOR_FORWARD_Z[a] * width,
                            a as i32 * 512,
                            WALL_TYPES[a],
                        )
                    }
                    DecorKind::DiagonalOffset => (0, 0, 256, a as u8),
                    DecorKind::DiagonalNoOffset => (0, 0, 512, a as u8),
                    DecorKind::DiagonalBoth => (0, 0, 768, a as u8),
                };
                ctx.scene.set_wall_decoration(SceneWallDecoration {
                    loc: placed(model),
                    offset_x,
                    offset_z,
                    yaw,
                    wall_type,
                });
                SceneLayer::WallDecoration
            }
        };

        if let Some(anim) = loc.anim {
            ctx.scene.animated.push(AnimatedLoc {
                loc_id,
                level,
                layer,
                x,
                z,
                anim,
            });
        }
        Ok(())
    }

    /// Raises shadow over the corners of a `width` x `length` footprint.
    fn shade_footprint(&mut self, level: usize, x: usize, z: usize, width: i32, length: i32, power: u8) {
        let max_x = (x + width.max(0) as usize).min(self.size_x());
        let max_z = (z + length.max(0) as usize).min(self.size_z());
        for sx in x..=max_x {
            for sz in z..=max_z {
                self.tiles.raise_shadow(level, sx, sz, power);
            }
        }
    }
}

fn grid(collision: &mut [CollisionGrid], level: Option<usize>) -> Option<&mut CollisionGrid> {
    level.and_then(|l| collision.get_mut(l))
}

/// Width of the wall already on a tile, used to push decorations off its face.
fn wall_width(defs: &DefsRegistry, scene: &Scene, level: usize, x: i32, z: i32) -> i32 {
    scene
        .wall_bitset(level, x, z)
        .and_then(|bitset| defs.loc(PlacedLoc::bitset_loc_id(bitset)))
        .map_or(DEFAULT_WALL_WIDTH, |wall: &LocType| wall.wallwidth)
}

fn straight_wall_shadow(angle: usize) -> [(usize, usize); 2] {
    match angle {
        0 => [(0, 0), (0, 1)],
        1 => [(0, 1), (1, 1)],
        2 => [(1, 0), (1, 1)],
        _ => [(0, 0), (1, 0)],
    }
}

fn straight_wall_occlusion(angle: usize) -> (usize, usize, u16) {
    match angle {
        0 => (0, 0, occlude::WALL_Z),
        1 => (0, 1, occlude::WALL_X),
        2 => (1, 0, occlude::WALL_Z),
        _ => (0, 0, occlude::WALL_X),
    }
}

fn corner_shadow(angle: usize) -> (usize, usize) {
    match angle {
        0 => (0, 1),
        1 => (1, 1),
        2 => (1, 0),
        _ => (0, 0),
    }
}

fn l_wall_occlusion(angle: usize) -> [(usize, usize, u16); 2] {
    match angle {
        0 => [(0, 0, occlude::WALL_Z), (0, 1, occlude::WALL_X)],
        1 => [(0, 1, occlude::WALL_X), (1, 0, occlude::WALL_Z)],
        2 => [(1, 0, occlude::WALL_Z), (0, 0, occlude::WALL_X)],
        _ => [(0, 0, occlude::WALL_X), (0, 0, occlude::WALL_Z)],
    }
}
