use std::sync::Arc;

use umbra_geom::{IVec3, cos, isqrt, sin};

/// Accumulated vertex normal; `w` counts contributing faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexNormal {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub w: i32,
}

/// Shading mode selected by the low two bits of a face's info byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceShading {
    Gouraud,
    Flat,
    Textured,
    TexturedFlat,
}

impl FaceShading {
    #[inline]
    pub fn from_info(info: i32) -> Self {
        match info & 3 {
            0 => FaceShading::Gouraud,
            1 => FaceShading::Flat,
            2 => FaceShading::Textured,
            _ => FaceShading::TexturedFlat,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModelBounds {
    pub radius: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
    pub min_depth: i32,
    pub max_depth: i32,
}

/// Per-face render priority: one shared value or one byte per face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FacePriorities {
    Constant(u8),
    PerFace(Arc<Vec<u8>>),
}

impl Default for FacePriorities {
    fn default() -> Self {
        FacePriorities::Constant(0)
    }
}

impl FacePriorities {
    #[inline]
    pub fn get(&self, face: usize) -> u8 {
        match self {
            FacePriorities::Constant(p) => *p,
            FacePriorities::PerFace(v) => v[face],
        }
    }
}

/// Decoded mesh. Every array is reference counted; clones share storage and
/// mutating operations take a private copy of only the arrays they touch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub vertex_x: Arc<Vec<i32>>,
    pub vertex_y: Arc<Vec<i32>>,
    pub vertex_z: Arc<Vec<i32>>,
    pub vertex_label: Option<Arc<Vec<u8>>>,

    pub face_a: Arc<Vec<u32>>,
    pub face_b: Arc<Vec<u32>>,
    pub face_c: Arc<Vec<u32>>,
    pub face_colour: Arc<Vec<i32>>,
    pub face_info: Option<Arc<Vec<i32>>>,
    pub face_priority: FacePriorities,
    pub face_alpha: Option<Arc<Vec<i32>>>,
    pub face_label: Option<Arc<Vec<u8>>>,

    pub textured_a: Arc<Vec<u32>>,
    pub textured_b: Arc<Vec<u32>>,
    pub textured_c: Arc<Vec<u32>>,

    pub face_colour_a: Option<Arc<Vec<i32>>>,
    pub face_colour_b: Option<Arc<Vec<i32>>>,
    pub face_colour_c: Option<Arc<Vec<i32>>>,

    pub label_vertices: Option<Arc<Vec<Vec<u32>>>>,
    pub label_faces: Option<Arc<Vec<Vec<u32>>>>,

    pub vertex_normal: Option<Vec<VertexNormal>>,
    pub vertex_normal_original: Option<Vec<VertexNormal>>,

    pub bounds: ModelBounds,
}

impl Model {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_x.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_a.len()
    }

    #[inline]
    pub fn textured_face_count(&self) -> usize {
        self.textured_a.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0 && self.face_count() == 0
    }

    #[inline]
    pub fn vertex(&self, v: usize) -> IVec3 {
        IVec3::new(self.vertex_x[v], self.vertex_y[v], self.vertex_z[v])
    }

    #[inline]
    pub fn face(&self, f: usize) -> [usize; 3] {
        [
            self.face_a[f] as usize,
            self.face_b[f] as usize,
            self.face_c[f] as usize,
        ]
    }

    #[inline]
    pub fn info(&self, f: usize) -> Option<i32> {
        self.face_info.as_ref().map(|info| info[f])
    }

    #[inline]
    pub fn shading(&self, f: usize) -> FaceShading {
        FaceShading::from_info(self.info(f).unwrap_or(0))
    }

    /// True when faces carry their own priorities rather than one shared value.
    #[inline]
    pub fn has_face_priorities(&self) -> bool {
        matches!(self.face_priority, FacePriorities::PerFace(_))
    }

    /// Quarter turn about Y: `(x, z) -> (z, -x)`.
    pub fn rotate_y90(&mut self) {
        let xs = Arc::make_mut(&mut self.vertex_x);
        let zs = Arc::make_mut(&mut self.vertex_z);
        for (x, z) in xs.iter_mut().zip(zs.iter_mut()) {
            let tmp = *x;
            *x = *z;
            *z = -tmp;
        }
    }

    /// Pitch rotation by a 2048-step angle.
    pub fn rotate_x(&mut self, angle: i32) {
        let s = sin(angle);
        let c = cos(angle);
        let ys = Arc::make_mut(&mut self.vertex_y);
        let zs = Arc::make_mut(&mut self.vertex_z);
        for (y, z) in ys.iter_mut().zip(zs.iter_mut()) {
            let ny = (*y * c - *z * s) >> 16;
            *z = (*y * s + *z * c) >> 16;
            *y = ny;
        }
    }

    /// Mirrors across the XY plane and flips winding so faces stay front-facing.
    pub fn mirror(&mut self) {
        for z in Arc::make_mut(&mut self.vertex_z).iter_mut() {
            *z = -*z;
        }
        let a = Arc::make_mut(&mut self.face_a);
        let c = Arc::make_mut(&mut self.face_c);
        for (a, c) in a.iter_mut().zip(c.iter_mut()) {
            std::mem::swap(a, c);
        }
    }

    pub fn translate(&mut self, x: i32, y: i32, z: i32) {
        for v in Arc::make_mut(&mut self.vertex_x).iter_mut() {
            *v += x;
        }
        for v in Arc::make_mut(&mut self.vertex_y).iter_mut() {
            *v += y;
        }
        for v in Arc::make_mut(&mut self.vertex_z).iter_mut() {
            *v += z;
        }
    }

    /// Scales each axis by `n / 128`.
    pub fn scale(&mut self, x: i32, y: i32, z: i32) {
        for v in Arc::make_mut(&mut self.vertex_x).iter_mut() {
            *v = *v * x / 128;
        }
        for v in Arc::make_mut(&mut self.vertex_y).iter_mut() {
            *v = *v * y / 128;
        }
        for v in Arc::make_mut(&mut self.vertex_z).iter_mut() {
            *v = *v * z / 128;
        }
    }

    pub fn recolour(&mut self, src: i32, dst: i32) {
        if !self.face_colour.contains(&src) {
            return;
        }
        for colour in Arc::make_mut(&mut self.face_colour).iter_mut() {
            if *colour == src {
                *colour = dst;
            }
        }
    }

    /// Bends the model to follow four tile-corner heights (`sw, se, ne, nw`),
    /// keeping its average height in place.
    pub fn hill_skew(&mut self, sw: i32, se: i32, ne: i32, nw: i32) {
        let average = (sw + se + ne + nw) / 4;
        let xs = &self.vertex_x;
        let zs = &self.vertex_z;
        let ys = Arc::make_mut(&mut self.vertex_y);
        for (v, y) in ys.iter_mut().enumerate() {
            let x = xs[v];
            let z = zs[v];
            let south = sw + (se - sw) * (x + 64) / 128;
            let north = nw + (ne - nw) * (x + 64) / 128;
            let height = south + (north - south) * (z + 64) / 128;
            *y += height - average;
        }
        self.calculate_bounds_y();
    }

    /// Radius over XZ, vertical extents and the depth range they imply.
    pub fn calculate_bounds_cylinder(&mut self) {
        let mut b = ModelBounds::default();
        let mut radius_sq = 0;
        for v in 0..self.vertex_count() {
            let x = self.vertex_x[v];
            let y = self.vertex_y[v];
            let z = self.vertex_z[v];
            b.max_y = b.max_y.max(-y);
            b.min_y = b.min_y.max(y);
            radius_sq = radius_sq.max(x.wrapping_mul(x).wrapping_add(z.wrapping_mul(z)));
        }
        b.radius = isqrt(radius_sq);
        self.bounds = b;
        self.update_depth();
    }

    /// Recomputes only the vertical extents, keeping the radius.
    pub fn calculate_bounds_y(&mut self) {
        self.bounds.min_y = 0;
        self.bounds.max_y = 0;
        for &y in self.vertex_y.iter() {
            self.bounds.max_y = self.bounds.max_y.max(-y);
            self.bounds.min_y = self.bounds.min_y.max(y);
        }
        self.update_depth();
    }

    /// Cylinder bounds plus the XZ box, used by models lit later.
    pub fn calculate_bounds_aabb(&mut self) {
        let mut b = ModelBounds {
            min_x: 999_999,
            max_x: -999_999,
            max_z: -99_999,
            min_z: 99_999,
            ..ModelBounds::default()
        };
        let mut radius_sq = 0;
        for v in 0..self.vertex_count() {
            let x = self.vertex_x[v];
            let y = self.vertex_y[v];
            let z = self.vertex_z[v];
            b.min_x = b.min_x.min(x);
            b.max_x = b.max_x.max(x);
            b.min_z = b.min_z.min(z);
            b.max_z = b.max_z.max(z);
            b.max_y = b.max_y.max(-y);
            b.min_y = b.min_y.max(y);
            radius_sq = radius_sq.max(x.wrapping_mul(x).wrapping_add(z.wrapping_mul(z)));
        }
        b.radius = isqrt(radius_sq);
        self.bounds = b;
        self.update_depth();
    }

    fn update_depth(&mut self) {
        let b = &mut self.bounds;
        let r2 = b.radius.wrapping_mul(b.radius);
        b.min_depth = isqrt(r2.wrapping_add(b.max_y.wrapping_mul(b.max_y)));
        b.max_depth = b.min_depth + isqrt(r2.wrapping_add(b.min_y.wrapping_mul(b.min_y)));
    }
}
