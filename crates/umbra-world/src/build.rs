use std::sync::Arc;

use umbra_defs::{DefsRegistry, FloorType};
use umbra_geom::{IVec3, isqrt};
use umbra_model::{Lighting, adjust_lightness, hsl24_to_16, mul_hsl};

use crate::collision::CollisionGrid;
use crate::error::WorldError;
use crate::occlusion::build_occluders;
use crate::scene::{GroundTile, Scene};
use crate::tiles::{LEVELS, flags, occlude};
use crate::World;

/// Half-open blend window: a tile averages the columns and rows
/// `coord - BLEND_RADIUS + 1 ..= coord + BLEND_RADIUS`.
pub const BLEND_RADIUS: i32 = 5;

const TERRAIN_AMBIENT: i32 = 96;
const TERRAIN_CONTRAST: i32 = 768;
const SHARED_AMBIENT: i32 = 64;
const SHARED_CONTRAST: i32 = 768;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Skip tiles and locs not visible from `draw_level`.
    pub low_memory: bool,
    pub draw_level: usize,
    /// Added to blended hues for the tint colour, clamped to `-8..=8`.
    pub hue_offset: i32,
    /// Added to blended lightness for the tint colour, clamped to `-16..=16`.
    pub lightness_offset: i32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            low_memory: false,
            draw_level: 0,
            hue_offset: 0,
            lightness_offset: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub ground_tiles: usize,
    pub lit_models: usize,
    pub occluders: usize,
    pub bridges: usize,
}

/// Running sums of underlay colour terms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlendSums {
    pub chroma: i32,
    pub saturation: i32,
    pub lightness: i32,
    pub luminance: i32,
    pub count: i32,
}

impl BlendSums {
    #[inline]
    fn add(&mut self, f: &FloorType) {
        self.chroma += f.chroma;
        self.saturation += f.saturation;
        self.lightness += f.lightness;
        self.luminance += f.luminance;
        self.count += 1;
    }

    #[inline]
    fn sub(&mut self, f: &FloorType) {
        self.chroma -= f.chroma;
        self.saturation -= f.saturation;
        self.lightness -= f.lightness;
        self.luminance -= f.luminance;
        self.count -= 1;
    }

    #[inline]
    fn merge(&mut self, other: &BlendSums, sign: i32) {
        self.chroma += sign * other.chroma;
        self.saturation += sign * other.saturation;
        self.lightness += sign * other.lightness;
        self.luminance += sign * other.luminance;
        self.count += sign * other.count;
    }

    /// Averaged `(hue, saturation, lightness)`, or `None` for an empty window.
    pub fn average(&self) -> Option<(i32, i32, i32)> {
        if self.count <= 0 || self.luminance <= 0 {
            return None;
        }
        Some((
            self.chroma * 256 / self.luminance,
            self.saturation / self.count,
            self.lightness / self.count,
        ))
    }
}

impl World {
    /// Finishes a region once all ground and loc streams are loaded: floor
    /// collision, terrain lighting and colour blending, ground tiles, draw
    /// levels, deferred model lighting, bridges and occluders.
    pub fn build(
        &mut self,
        scene: &mut Scene,
        collision: &mut [CollisionGrid],
        defs: &DefsRegistry,
    ) -> Result<BuildStats, WorldError> {
        self.mark_floor_collision(collision);

        let mut stats = BuildStats::default();
        for level in 0..LEVELS {
            self.compute_lightmap(level);
            stats.ground_tiles += self.blend_level(level, scene, defs)?;
            for z in 1..self.size_z().saturating_sub(1) {
                for x in 1..self.size_x().saturating_sub(1) {
                    scene.set_draw_level(level, x as i32, z as i32, self.tiles.draw_level(level, x, z));
                }
            }
        }

        let shared = Lighting::new(SHARED_AMBIENT, SHARED_CONTRAST, Lighting::DEFAULT_SOURCE);
        let attenuation = shared.scaled_attenuation();
        scene.for_each_model_mut(|model| {
            if model.vertex_normal.is_some() {
                Arc::make_mut(model).apply_lighting(shared.ambient, attenuation, shared.source);
                stats.lit_models += 1;
            }
        });

        for x in 0..self.size_x() {
            for z in 0..self.size_z() {
                if self.tiles.flags(1, x, z) & flags::LINK_BELOW != 0 {
                    scene.set_bridge(x as i32, z as i32);
                    stats.bridges += 1;
                }
            }
        }

        stats.occluders = build_occluders(&mut self.tiles, scene);
        log::info!(
            "built region: {} ground tiles, {} locs, {} lit models, {} occluders, {} bridges",
            stats.ground_tiles,
            scene.loc_count(),
            stats.lit_models,
            stats.occluders,
            stats.bridges
        );
        Ok(stats)
    }

    fn mark_floor_collision(&self, collision: &mut [CollisionGrid]) {
        for level in 0..LEVELS {
            for x in 0..self.size_x() {
                for z in 0..self.size_z() {
                    if self.tiles.flags(level, x, z) & flags::BLOCKED == 0 {
                        continue;
                    }
                    let mut target = level as i32;
                    if self.tiles.flags(1, x, z) & flags::LINK_BELOW != 0 {
                        target -= 1;
                    }
                    if target >= 0 {
                        if let Some(grid) = collision.get_mut(target as usize) {
                            grid.add_floor(x as i32, z as i32);
                        }
                    }
                }
            }
        }
    }

    /// Per-corner lightness from the height gradient, darkened by nearby shadow.
    pub fn compute_lightmap(&mut self, level: usize) {
        let light = Lighting::DEFAULT_SOURCE;
        let attenuation = (TERRAIN_CONTRAST * light.length()) >> 8;
        let (size_x, size_z) = (self.size_x(), self.size_z());
        for z in 1..size_z.saturating_sub(1) {
            for x in 1..size_x.saturating_sub(1) {
                let t = &self.tiles;
                let dx = t.height(level, x + 1, z) - t.height(level, x - 1, z);
                let dz = t.height(level, x, z + 1) - t.height(level, x, z - 1);
                let len = isqrt(dx * dx + 65536 + dz * dz).max(1);
                let normal = IVec3::new((dx << 8) / len, 65536 / len, (dz << 8) / len);
                let lightness = TERRAIN_AMBIENT + light.dot(normal) / attenuation;
                let s = |x: usize, z: usize| t.get(level, x, z).shadow as i32;
                let shade = (s(x - 1, z) >> 2)
                    + (s(x + 1, z) >> 3)
                    + (s(x, z - 1) >> 2)
                    + (s(x, z + 1) >> 3)
                    + (s(x, z) >> 1);
                self.tiles.get_mut(level, x, z).lightness = lightness - shade;
            }
        }
    }

    fn underlays<'d>(&self, level: usize, defs: &'d DefsRegistry) -> Result<Vec<Option<&'d FloorType>>, WorldError> {
        let mut out = Vec::with_capacity(self.size_x() * self.size_z());
        for x in 0..self.size_x() {
            for z in 0..self.size_z() {
                let id = self.tiles.get(level, x, z).underlay;
                out.push(lookup_floor(defs, id, level, x, z)?);
            }
        }
        Ok(out)
    }

    /// Sliding-window underlay blend for one level, emitting ground tiles.
    fn blend_level(&mut self, level: usize, scene: &mut Scene, defs: &DefsRegistry) -> Result<usize, WorldError> {
        let (size_x, size_z) = (self.size_x() as i32, self.size_z() as i32);
        let underlays = self.underlays(level, defs)?;
        let underlay = |x: i32, z: i32| {
            if x < 0 || z < 0 || x >= size_x || z >= size_z {
                None
            } else {
                underlays[(x * size_z + z) as usize]
            }
        };

        let mut columns = vec![BlendSums::default(); size_z as usize];
        let mut emitted = 0;
        for xi in -BLEND_RADIUS..size_x + BLEND_RADIUS {
            for z in 0..size_z {
                if let Some(f) = underlay(xi + BLEND_RADIUS, z) {
                    columns[z as usize].add(f);
                }
                if let Some(f) = underlay(xi - BLEND_RADIUS, z) {
                    columns[z as usize].sub(f);
                }
            }
            if xi < 1 || xi >= size_x - 1 {
                continue;
            }
            let mut window = BlendSums::default();
            for zi in -BLEND_RADIUS..size_z + BLEND_RADIUS {
                let entering = zi + BLEND_RADIUS;
                if (0..size_z).contains(&entering) {
                    window.merge(&columns[entering as usize], 1);
                }
                let leaving = zi - BLEND_RADIUS;
                if (0..size_z).contains(&leaving) {
                    window.merge(&columns[leaving as usize], -1);
                }
                if zi < 1 || zi >= size_z - 1 {
                    continue;
                }
                let (x, z) = (xi as usize, zi as usize);
                if !self.visible(level, x, z) {
                    continue;
                }
                scene.note_level(level);
                if self.emit_tile(level, x, z, &window, scene, defs)? {
                    emitted += 1;
                }
            }
        }
        Ok(emitted)
    }

    fn visible(&self, level: usize, x: usize, z: usize) -> bool {
        !self.options.low_memory
            || self.tiles.flags(0, x, z) & flags::LINK_BELOW != 0
            || (self.tiles.flags(level, x, z) & flags::VIS_BELOW == 0
                && self.tiles.draw_level(level, x, z) == self.options.draw_level)
    }

    fn emit_tile(
        &mut self,
        level: usize,
        x: usize,
        z: usize,
        window: &BlendSums,
        scene: &mut Scene,
        defs: &DefsRegistry,
    ) -> Result<bool, WorldError> {
        let tile = *self.tiles.get(level, x, z);
        if tile.underlay == 0 && tile.overlay == 0 {
            return Ok(false);
        }
        let heights = self.tiles.corner_heights(level, x, z);
        let lights = [
            self.tiles.get(level, x, z).lightness,
            self.tiles.get(level, x + 1, z).lightness,
            self.tiles.get(level, x + 1, z + 1).lightness,
            self.tiles.get(level, x, z + 1).lightness,
        ];

        let mut base = -1;
        let mut tint = -1;
        if tile.underlay > 0 {
            if let Some((hue, saturation, lightness)) = window.average() {
                base = hsl24_to_16(hue, saturation, lightness);
                let hue = (hue + self.options.hue_offset.clamp(-8, 8)) & 0xff;
                let lightness = (lightness + self.options.lightness_offset.clamp(-16, 16)).clamp(0, 255);
                tint = hsl24_to_16(hue, saturation, lightness);
            }
        }
        let overlay = lookup_floor(defs, tile.overlay, level, x, z)?;

        if level > 0 {
            let mut occludes = !(tile.underlay == 0 && tile.overlay_shape != 0);
            if overlay.is_some_and(|f| !f.occlude) {
                occludes = false;
            }
            if occludes && heights.iter().all(|&h| h == heights[0]) {
                self.tiles.get_mut(level, x, z).occlude |= occlude::FLOOR;
            }
        }

        let underlay = lights.map(|l| mul_hsl(base, l));
        let ground = match overlay {
            None => GroundTile {
                level,
                x: x as i32,
                z: z as i32,
                shape: 0,
                rotation: 0,
                texture: None,
                heights,
                underlay,
                overlay: [0; 4],
                tint,
            },
            Some(floor) => {
                let hsl = floor.overlay_hsl();
                GroundTile {
                    level,
                    x: x as i32,
                    z: z as i32,
                    shape: tile.overlay_shape + 1,
                    rotation: tile.overlay_rotation,
                    texture: floor.texture,
                    heights,
                    underlay,
                    overlay: lights.map(|l| adjust_lightness(hsl, l)),
                    tint,
                }
            }
        };
        scene.add_ground(ground);
        Ok(true)
    }
}

fn lookup_floor<'d>(
    defs: &'d DefsRegistry,
    id: u8,
    level: usize,
    x: usize,
    z: usize,
) -> Result<Option<&'d FloorType>, WorldError> {
    if id == 0 {
        return Ok(None);
    }
    let id = id as u16 - 1;
    defs.floor(id)
        .map(Some)
        .ok_or(WorldError::UnknownFloor { id, level, x, z })
}

/// Underlay sums over a tile's full window, computed without the sliding pass.
pub fn window_sums(world: &World, level: usize, x: i32, z: i32, defs: &DefsRegistry) -> BlendSums {
    let mut sums = BlendSums::default();
    for wx in x - BLEND_RADIUS + 1..=x + BLEND_RADIUS {
        for wz in z - BLEND_RADIUS + 1..=z + BLEND_RADIUS {
            if wx < 0 || wz < 0 || wx >= world.size_x() as i32 || wz >= world.size_z() as i32 {
                continue;
            }
            let id = world.tiles.get(level, wx as usize, wz as usize).underlay;
            if let Ok(Some(f)) = lookup_floor(defs, id, level, wx as usize, wz as usize) {
                sums.add(f);
            }
        }
    }
    sums
}
