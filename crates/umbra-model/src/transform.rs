//! Label-group transforms driven by decoded animation frames.

use std::sync::Arc;

use umbra_geom::{IVec3, cos, rotate_pair, sin};

use crate::model::Model;

/// Operation a transform group performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformKind {
    /// Sets the pivot to the centroid of the group's vertices plus an offset.
    Origin,
    Translate,
    /// Roll, pitch then yaw about the pivot.
    Rotate,
    /// `v * p / 128` about the pivot.
    Scale,
    /// Adds `x * 8` to the alpha of every face in the group.
    Alpha,
}

impl TransformKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TransformKind::Origin),
            1 => Some(TransformKind::Translate),
            2 => Some(TransformKind::Rotate),
            3 => Some(TransformKind::Scale),
            5 => Some(TransformKind::Alpha),
            _ => None,
        }
    }
}

/// Skeleton shared by frames: a raw kind code and label list per group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransformBase {
    pub kinds: Vec<u8>,
    pub labels: Vec<Vec<u8>>,
}

impl TransformBase {
    pub fn push(&mut self, kind: u8, labels: Vec<u8>) {
        self.kinds.push(kind);
        self.labels.push(labels);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameEntry {
    pub group: usize,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformFrame {
    pub base: Arc<TransformBase>,
    pub entries: Vec<FrameEntry>,
}

/// Supplies decoded frames by id.
pub trait FrameSource {
    fn frame(&self, id: i32) -> Option<Arc<TransformFrame>>;
}

/// A source with no frames; every transform id is treated as absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFrames;

impl FrameSource for NoFrames {
    fn frame(&self, _id: i32) -> Option<Arc<TransformFrame>> {
        None
    }
}

impl FrameSource for hashbrown::HashMap<i32, Arc<TransformFrame>> {
    fn frame(&self, id: i32) -> Option<Arc<TransformFrame>> {
        self.get(&id).cloned()
    }
}

/// End-of-mask sentinel for `apply_frames`.
pub const MASK_END: usize = 9_999_999;

fn label_groups(labels: &[u8]) -> Vec<Vec<u32>> {
    let count = labels.iter().copied().max().map_or(0, |m| m as usize + 1);
    let mut groups = vec![Vec::new(); count];
    for (i, &label) in labels.iter().enumerate() {
        groups[label as usize].push(i as u32);
    }
    groups
}

impl Model {
    /// Converts per-vertex and per-face labels into per-label index lists and
    /// drops the raw label arrays.
    pub fn create_label_references(&mut self) {
        if let Some(labels) = self.vertex_label.take() {
            self.label_vertices = Some(Arc::new(label_groups(&labels)));
        }
        if let Some(labels) = self.face_label.take() {
            self.label_faces = Some(Arc::new(label_groups(&labels)));
        }
    }

    pub fn apply_frame(&mut self, frame: &TransformFrame) {
        if self.label_vertices.is_none() {
            return;
        }
        let mut origin = IVec3::ZERO;
        for e in &frame.entries {
            let Some(&code) = frame.base.kinds.get(e.group) else {
                continue;
            };
            self.apply_transform_group(&mut origin, code, &frame.base.labels[e.group], e.x, e.y, e.z);
        }
    }

    /// Applies `primary` to groups outside `mask` and `secondary` to groups
    /// inside it. Origin groups run in both passes. `mask` is sorted ascending.
    pub fn apply_frames(
        &mut self,
        primary: &TransformFrame,
        secondary: Option<&TransformFrame>,
        mask: &[usize],
    ) {
        let Some(secondary) = secondary else {
            self.apply_frame(primary);
            return;
        };
        if self.label_vertices.is_none() {
            return;
        }
        let base = &primary.base;
        let mask_at = |i: usize| mask.get(i).copied().unwrap_or(MASK_END);

        let mut origin = IVec3::ZERO;
        let mut m = 0;
        let mut mask_base = mask_at(m);
        m += 1;
        for e in &primary.entries {
            while e.group > mask_base {
                mask_base = mask_at(m);
                m += 1;
            }
            let Some(&code) = base.kinds.get(e.group) else {
                continue;
            };
            if e.group != mask_base || code == 0 {
                self.apply_transform_group(&mut origin, code, &base.labels[e.group], e.x, e.y, e.z);
            }
        }

        origin = IVec3::ZERO;
        m = 0;
        mask_base = mask_at(m);
        m += 1;
        for e in &secondary.entries {
            while e.group > mask_base {
                mask_base = mask_at(m);
                m += 1;
            }
            let Some(&code) = base.kinds.get(e.group) else {
                continue;
            };
            if e.group == mask_base || code == 0 {
                self.apply_transform_group(&mut origin, code, &base.labels[e.group], e.x, e.y, e.z);
            }
        }
    }

    /// Applies one group operation. Labels beyond the model's groups are ignored.
    pub fn apply_transform_group(
        &mut self,
        origin: &mut IVec3,
        code: u8,
        labels: &[u8],
        x: i32,
        y: i32,
        z: i32,
    ) {
        let Some(kind) = TransformKind::from_code(code) else {
            return;
        };
        if kind == TransformKind::Alpha {
            self.apply_alpha(labels, x);
            return;
        }
        let Some(all) = self.label_vertices.clone() else {
            return;
        };
        let groups = labels.iter().filter_map(|&l| all.get(l as usize));

        match kind {
            TransformKind::Origin => {
                let mut sum = IVec3::ZERO;
                let mut count = 0;
                for group in groups {
                    for &v in group {
                        sum += self.vertex(v as usize);
                        count += 1;
                    }
                }
                *origin = if count > 0 {
                    IVec3::new(sum.x / count + x, sum.y / count + y, sum.z / count + z)
                } else {
                    IVec3::new(x, y, z)
                };
            }
            TransformKind::Translate => {
                let (xs, ys, zs) = self.vertices_mut();
                for group in groups {
                    for &v in group {
                        let v = v as usize;
                        xs[v] += x;
                        ys[v] += y;
                        zs[v] += z;
                    }
                }
            }
            TransformKind::Rotate => {
                let pitch = (x & 0xff) * 8;
                let yaw = (y & 0xff) * 8;
                let roll = (z & 0xff) * 8;
                let o = *origin;
                let (xs, ys, zs) = self.vertices_mut();
                for group in groups {
                    for &v in group {
                        let v = v as usize;
                        let (mut vx, mut vy, mut vz) = (xs[v] - o.x, ys[v] - o.y, zs[v] - o.z);
                        if roll != 0 {
                            (vx, vy) = rotate_pair(vx, vy, sin(roll), cos(roll));
                        }
                        if pitch != 0 {
                            (vz, vy) = rotate_pair(vz, vy, sin(pitch), cos(pitch));
                        }
                        if yaw != 0 {
                            (vx, vz) = rotate_pair(vx, vz, sin(yaw), cos(yaw));
                        }
                        xs[v] = vx + o.x;
                        ys[v] = vy + o.y;
                        zs[v] = vz + o.z;
                    }
                }
            }
            TransformKind::Scale => {
                let o = *origin;
                let (xs, ys, zs) = self.vertices_mut();
                for group in groups {
                    for &v in group {
                        let v = v as usize;
                        xs[v] = (xs[v] - o.x) * x / 128 + o.x;
                        ys[v] = (ys[v] - o.y) * y / 128 + o.y;
                        zs[v] = (zs[v] - o.z) * z / 128 + o.z;
                    }
                }
            }
            TransformKind::Alpha => {}
        }
    }

    fn apply_alpha(&mut self, labels: &[u8], x: i32) {
        let (Some(groups), Some(alpha)) = (self.label_faces.clone(), self.face_alpha.as_mut()) else {
            return;
        };
        let alpha = Arc::make_mut(alpha);
        for group in labels.iter().filter_map(|&l| groups.get(l as usize)) {
            for &f in group {
                let f = f as usize;
                alpha[f] = (alpha[f] + x * 8).clamp(0, 255);
            }
        }
    }

    fn vertices_mut(&mut self) -> (&mut Vec<i32>, &mut Vec<i32>, &mut Vec<i32>) {
        (
            Arc::make_mut(&mut self.vertex_x),
            Arc::make_mut(&mut self.vertex_y),
            Arc::make_mut(&mut self.vertex_z),
        )
    }
}
