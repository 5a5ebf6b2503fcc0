/// Per-frame working memory for the rasterizer. Arrays grow to the largest
/// model seen and are reused across draws.
#[derive(Debug, Default)]
pub struct FrameScratch {
    pub(crate) screen_x: Vec<i32>,
    pub(crate) screen_y: Vec<i32>,
    pub(crate) screen_z: Vec<i32>,
    pub(crate) view_x: Vec<i32>,
    pub(crate) view_y: Vec<i32>,
    pub(crate) view_z: Vec<i32>,
    pub(crate) near_clipped: Vec<bool>,
    pub(crate) hclip: Vec<bool>,
    pub(crate) depth_buckets: Vec<Vec<u32>>,
    pub(crate) priority_buckets: [Vec<u32>; 12],
    pub(crate) priority_depth_sum: [i32; 12],
    /// Per-face depths for priorities 10 and 11, parallel to their buckets.
    pub(crate) dynamic_depths: [Vec<i32>; 2],
}

impl FrameScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, faces: usize, depth: usize) -> Self {
        let mut scratch = Self::default();
        scratch.prepare_vertices(vertices);
        scratch.prepare_faces(faces, depth);
        scratch
    }

    pub fn vertex_capacity(&self) -> usize {
        self.screen_x.len()
    }

    pub fn face_capacity(&self) -> usize {
        self.near_clipped.len()
    }

    pub fn depth_capacity(&self) -> usize {
        self.depth_buckets.len()
    }

    pub(crate) fn prepare_vertices(&mut self, count: usize) {
        if self.screen_x.len() >= count {
            return;
        }
        for v in [
            &mut self.screen_x,
            &mut self.screen_y,
            &mut self.screen_z,
            &mut self.view_x,
            &mut self.view_y,
            &mut self.view_z,
        ] {
            v.resize(count, 0);
        }
    }

    pub(crate) fn prepare_faces(&mut self, count: usize, depth: usize) {
        if self.near_clipped.len() < count {
            self.near_clipped.resize(count, false);
            self.hclip.resize(count, false);
        }
        if self.depth_buckets.len() < depth {
            self.depth_buckets.resize_with(depth, Vec::new);
        }
        for bucket in &mut self.depth_buckets[..depth] {
            bucket.clear();
        }
    }

    pub(crate) fn reset_priorities(&mut self) {
        for bucket in &mut self.priority_buckets {
            bucket.clear();
        }
        self.priority_depth_sum = [0; 12];
        self.dynamic_depths[0].clear();
        self.dynamic_depths[1].clear();
    }
}
