use std::sync::Arc;

use umbra_defs::LocType;
use umbra_model::{FrameSource, Lighting, Model};

use crate::lru::{LruCache, LruStats};
use crate::provider::ModelProvider;
use crate::store::ModelStore;

/// Static-cache key offset for mirrored base models.
pub const MIRRORED: i32 = 0x10000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelCacheConfig {
    pub static_capacity: usize,
    pub dynamic_capacity: usize,
}

impl Default for ModelCacheConfig {
    fn default() -> Self {
        Self {
            static_capacity: 500,
            dynamic_capacity: 30,
        }
    }
}

/// Dynamic cache key for a loc model variant.
#[inline]
pub fn typecode(transform_id: i32, loc_id: u32, shape_index: usize, angle: i32) -> i64 {
    (((transform_id as i64) + 1) << 32)
        | ((loc_id as i64) << 6)
        | ((shape_index as i64) << 3)
        | (angle as i64 & 7)
}

/// Two-tier model cache: decoded (and mirror-adjusted) base models by id, and
/// fully built loc variants by typecode.
pub struct ModelCache<P: ModelProvider> {
    pub store: ModelStore<P>,
    statics: LruCache<i32, Arc<Model>>,
    dynamics: LruCache<i64, Arc<Model>>,
}

impl<P: ModelProvider> ModelCache<P> {
    pub fn new(provider: P, config: ModelCacheConfig) -> Self {
        Self {
            store: ModelStore::new(provider),
            statics: LruCache::new(config.static_capacity),
            dynamics: LruCache::new(config.dynamic_capacity),
        }
    }

    pub fn static_stats(&self) -> LruStats {
        self.statics.stats()
    }

    pub fn dynamic_stats(&self) -> LruStats {
        self.dynamics.stats()
    }

    pub fn clear(&mut self) {
        self.statics.clear();
        self.dynamics.clear();
    }

    /// Base model by id, mirrored when `mirrored` is set.
    pub fn base_model(&mut self, id: i32, mirrored: bool) -> Option<Arc<Model>> {
        let key = if mirrored { id + MIRRORED } else { id };
        if let Some(model) = self.statics.get(&key) {
            return Some(model);
        }
        let mut model = self.store.try_get(id)?;
        if mirrored {
            model.mirror();
        }
        let model = Arc::new(model);
        self.statics.insert(key, model.clone());
        Some(model)
    }

    /// True once every base model `loc` needs for `shape` is resident.
    /// Missing blobs are requested.
    pub fn loc_ready(&mut self, loc: &LocType, shape: u8) -> bool {
        let Some(models) = loc.base_models(shape) else {
            return true;
        };
        let mut ready = true;
        for &id in models {
            ready &= self.store.is_ready(id);
        }
        ready
    }

    /// Built model for a loc placement. `heights` are the tile corner heights
    /// `[sw, se, ne, nw]`. Hill-skewed and shared-light locs get a private
    /// copy; the cached variant is never handed out for mutation.
    pub fn get_loc_model(
        &mut self,
        loc: &LocType,
        shape: u8,
        angle: i32,
        heights: [i32; 4],
        transform_id: i32,
        frames: &dyn FrameSource,
    ) -> Option<Arc<Model>> {
        let shape_index = loc.shape_index(shape)?;
        let key = typecode(transform_id, loc.id, shape_index, angle);
        let cached = match self.dynamics.get(&key) {
            Some(model) => model,
            None => {
                let built = Arc::new(self.build_loc_model(loc, shape, angle, transform_id, frames)?);
                self.dynamics.insert(key, built.clone());
                built
            }
        };

        if !loc.hillskew && !loc.sharelight {
            return Some(cached);
        }
        let mut copy = (*cached).clone();
        if loc.hillskew {
            let [sw, se, ne, nw] = heights;
            copy.hill_skew(sw, se, ne, nw);
        }
        Some(Arc::new(copy))
    }

    fn build_loc_model(
        &mut self,
        loc: &LocType,
        shape: u8,
        angle: i32,
        transform_id: i32,
        frames: &dyn FrameSource,
    ) -> Option<Model> {
        let mirrored = loc.mirror ^ (angle > 3);
        let ids = loc.base_models(shape)?;
        let mut bases = Vec::with_capacity(ids.len());
        for &id in ids {
            bases.push(self.base_model(id, mirrored)?);
        }
        log::debug!("building loc {} shape {} angle {}", loc.id, shape, angle);

        let mut model = match bases.as_slice() {
            [] => return None,
            [one] => (**one).clone(),
            many => {
                let refs: Vec<&Model> = many.iter().map(|m| m.as_ref()).collect();
                Model::merge(&refs)
            }
        };

        if transform_id != -1 {
            if let Some(frame) = frames.frame(transform_id) {
                model.create_label_references();
                model.apply_frame(&frame);
                model.label_vertices = None;
                model.label_faces = None;
            }
        }
        for _ in 0..(angle & 3) {
            model.rotate_y90();
        }
        for &(src, dst) in &loc.recolours {
            model.recolour(src, dst);
        }
        if loc.needs_resize() {
            let [x, y, z] = loc.resize;
            model.scale(x, y, z);
        }
        if loc.needs_offset() {
            let [x, y, z] = loc.offset;
            model.translate(x, y, z);
        }
        model.calculate_normals(&Lighting::for_loc(loc.ambient, loc.contrast), !loc.sharelight);
        Some(model)
    }
}
