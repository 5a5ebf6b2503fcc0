use std::sync::Arc;

use umbra_geom::{cos, sin};
use umbra_model::{FaceShading, Model};

use crate::canvas::{Canvas, FillError, FillState, TextureSpace};
use crate::clip::{ClipVertex, NEAR_Z, clip_near_face};
use crate::palette::Palette;
use crate::scratch::FrameScratch;
use crate::viewport::{Camera, Viewport};

/// Screen X written for vertices behind the near plane.
const BEHIND: i32 = -5000;
/// Models whose centre is this far away or more are not drawn.
const FAR_Z: i32 = 3500;
/// Dynamic-priority stream marker once both buckets 10 and 11 are drained.
const EXHAUSTED: i32 = -1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub models: usize,
    pub culled: usize,
    pub faces: usize,
    pub skipped: usize,
}

pub struct Rasterizer {
    pub viewport: Viewport,
    pub palette: Arc<Palette>,
    pub scratch: FrameScratch,
    stats: DrawStats,
}

impl Rasterizer {
    pub fn new(viewport: Viewport, palette: Arc<Palette>) -> Self {
        Self {
            viewport,
            palette,
            scratch: FrameScratch::new(),
            stats: DrawStats::default(),
        }
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DrawStats::default();
    }

    /// Draws a scene model at `rel_*` from the eye, turned by `yaw`. Models
    /// outside the view volume are rejected from their bounds before any
    /// vertex is projected. Returns whether the model reached the face pass.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_model(
        &mut self,
        model: &Model,
        yaw: i32,
        camera: &Camera,
        rel_x: i32,
        rel_y: i32,
        rel_z: i32,
        canvas: &mut dyn Canvas,
    ) -> bool {
        let Camera {
            sin_pitch,
            cos_pitch,
            sin_yaw,
            cos_yaw,
        } = *camera;
        let radius = model.bounds.radius;
        let half_w = self.viewport.centre_x;
        let half_h = self.viewport.centre_y;

        let z_turned = (rel_z * cos_yaw - rel_x * sin_yaw) >> 16;
        let mid_z = (rel_y * sin_pitch + z_turned * cos_pitch) >> 16;
        let radius_cos = (radius * cos_pitch) >> 16;
        let max_z = mid_z + radius_cos;
        if max_z <= NEAR_Z || mid_z >= FAR_Z {
            self.stats.culled += 1;
            return false;
        }
        let mid_x = (rel_z * sin_yaw + rel_x * cos_yaw) >> 16;
        let mid_y = (rel_y * cos_pitch - z_turned * sin_pitch) >> 16;
        let radius_sin = (radius * sin_pitch) >> 16;
        let top_extent = radius_sin + ((model.bounds.max_y * cos_pitch) >> 16);
        let outside = ((mid_x - radius) << 9) / max_z >= half_w
            || ((mid_x + radius) << 9) / max_z <= -half_w
            || ((mid_y + radius_sin) << 9) / max_z <= -half_h
            || ((mid_y - top_extent) << 9) / max_z >= half_h;
        if outside {
            self.stats.culled += 1;
            return false;
        }
        let depth_extent = radius_cos + ((model.bounds.max_y * sin_pitch) >> 16);
        let mut clipped = mid_z - depth_extent <= NEAR_Z;

        let (model_sin, model_cos) = (sin(yaw), cos(yaw));
        let keep_view = model.textured_face_count() > 0;
        let vertex_count = model.vertex_count();
        self.scratch.prepare_vertices(vertex_count);
        let (cx, cy) = (self.viewport.centre_x, self.viewport.centre_y);
        let s = &mut self.scratch;
        for v in 0..vertex_count {
            let mut x = model.vertex_x[v];
            let y = model.vertex_y[v];
            let mut z = model.vertex_z[v];
            if yaw != 0 {
                let turned = (z * model_sin + x * model_cos) >> 16;
                z = (z * model_cos - x * model_sin) >> 16;
                x = turned;
            }
            x += rel_x;
            let y = y + rel_y;
            z += rel_z;
            let turned = (z * sin_yaw + x * cos_yaw) >> 16;
            z = (z * cos_yaw - x * sin_yaw) >> 16;
            x = turned;
            let pitched = (y * cos_pitch - z * sin_pitch) >> 16;
            z = (y * sin_pitch + z * cos_pitch) >> 16;
            let y = pitched;

            s.screen_z[v] = z - mid_z;
            if z >= NEAR_Z {
                s.screen_x[v] = cx + (x << 9) / z;
                s.screen_y[v] = cy + (y << 9) / z;
            } else {
                s.screen_x[v] = BEHIND;
                clipped = true;
            }
            if clipped || keep_view {
                s.view_x[v] = x;
                s.view_y[v] = y;
                s.view_z[v] = z;
            }
        }
        self.draw_faces(model, clipped, canvas);
        true
    }

    /// Draws a model rotated in place and viewed from a fixed eye, as used for
    /// previews. No frustum rejection is done.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_simple(
        &mut self,
        model: &Model,
        pitch: i32,
        yaw: i32,
        roll: i32,
        eye_pitch: i32,
        eye_x: i32,
        eye_y: i32,
        eye_z: i32,
        canvas: &mut dyn Canvas,
    ) {
        let (sin_pitch, cos_pitch) = (sin(pitch), cos(pitch));
        let (sin_yaw, cos_yaw) = (sin(yaw), cos(yaw));
        let (sin_roll, cos_roll) = (sin(roll), cos(roll));
        let (sin_eye, cos_eye) = (sin(eye_pitch), cos(eye_pitch));
        let mid_z = (eye_y * sin_eye + eye_z * cos_eye) >> 16;
        let keep_view = model.textured_face_count() > 0;
        let vertex_count = model.vertex_count();
        self.scratch.prepare_vertices(vertex_count);
        let (cx, cy) = (self.viewport.centre_x, self.viewport.centre_y);
        let s = &mut self.scratch;
        for v in 0..vertex_count {
            let (mut x, mut y, mut z) = (model.vertex_x[v], model.vertex_y[v], model.vertex_z[v]);
            if roll != 0 {
                let t = (y * sin_roll + x * cos_roll) >> 16;
                y = (y * cos_roll - x * sin_roll) >> 16;
                x = t;
            }
            if pitch != 0 {
                let t = (y * cos_pitch - z * sin_pitch) >> 16;
                z = (y * sin_pitch + z * cos_pitch) >> 16;
                y = t;
            }
            if yaw != 0 {
                let t = (z * sin_yaw + x * cos_yaw) >> 16;
                z = (z * cos_yaw - x * sin_yaw) >> 16;
                x = t;
            }
            x += eye_x;
            y += eye_y;
            z += eye_z;
            let t = (y * cos_eye - z * sin_eye) >> 16;
            z = (y * sin_eye + z * cos_eye) >> 16;
            y = t;

            s.screen_z[v] = z - mid_z;
            let d = if z == 0 { 1 } else { z };
            s.screen_x[v] = cx + (x << 9) / d;
            s.screen_y[v] = cy + (y << 9) / d;
            if keep_view {
                s.view_x[v] = x;
                s.view_y[v] = y;
                s.view_z[v] = z;
            }
        }
        self.draw_faces(model, false, canvas);
    }

    /// Sorts the projected faces and fills them back to front. Expects the
    /// scratch vertex arrays to hold this model's projection.
    pub fn draw_faces(&mut self, model: &Model, clipped: bool, canvas: &mut dyn Canvas) {
        let face_count = model.face_count();
        let min_depth = model.bounds.min_depth;
        let max_depth = model.bounds.max_depth.max(0) as usize;
        self.scratch.prepare_faces(face_count, max_depth);
        self.stats.models += 1;

        let viewport = self.viewport;
        let s = &mut self.scratch;
        for f in 0..face_count {
            let [a, b, c] = model.face(f);
            let xs = [s.screen_x[a], s.screen_x[b], s.screen_x[c]];
            let near = clipped && xs.contains(&BEHIND);
            if !near {
                let ys = [s.screen_y[a], s.screen_y[b], s.screen_y[c]];
                let area = (xs[0] - xs[1])
                    .wrapping_mul(ys[2] - ys[1])
                    .wrapping_sub((ys[0] - ys[1]).wrapping_mul(xs[2] - xs[1]));
                if area <= 0 {
                    continue;
                }
                s.hclip[f] = viewport.needs_hclip(&xs);
            }
            s.near_clipped[f] = near;
            let depth = (s.screen_z[a] + s.screen_z[b] + s.screen_z[c]) / 3 + min_depth;
            match usize::try_from(depth).ok().filter(|&d| d < max_depth) {
                Some(d) => s.depth_buckets[d].push(f as u32),
                None => {
                    log::trace!("face {} depth {} outside 0..{}", f, depth, max_depth);
                    self.stats.skipped += 1;
                }
            }
        }

        if !model.has_face_priorities() {
            let mut painter = Painter::new(model, &self.scratch, &self.palette, viewport, canvas);
            for depth in (0..max_depth).rev() {
                for &f in &self.scratch.depth_buckets[depth] {
                    painter.paint(f);
                }
            }
            painter.finish(&mut self.stats);
            return;
        }

        self.bucket_priorities(model, max_depth);
        let s = &self.scratch;
        let count = |p: usize| s.priority_buckets[p].len() as i32;
        let average = |p: usize, q: usize| {
            let n = count(p) + count(q);
            if n > 0 {
                (s.priority_depth_sum[p] + s.priority_depth_sum[q]) / n
            } else {
                0
            }
        };
        // dynamic faces deeper than these are drawn ahead of buckets 0, 3 and 5
        let thresholds = [(0, average(1, 2)), (3, average(3, 4)), (5, average(6, 8))];

        let mut painter = Painter::new(model, s, &self.palette, viewport, canvas);
        let mut dynamic = DynamicFaces::new(s);
        for priority in 0..10 {
            if let Some(&(_, threshold)) = thresholds.iter().find(|(p, _)| *p == priority) {
                while dynamic.depth() > threshold {
                    painter.paint(dynamic.advance());
                }
            }
            for &f in &s.priority_buckets[priority] {
                painter.paint(f);
            }
        }
        while dynamic.depth() != EXHAUSTED {
            painter.paint(dynamic.advance());
        }
        painter.finish(&mut self.stats);
    }

    fn bucket_priorities(&mut self, model: &Model, max_depth: usize) {
        let s = &mut self.scratch;
        s.reset_priorities();
        for depth in (0..max_depth).rev() {
            for &f in &s.depth_buckets[depth] {
                let priority = model.face_priority.get(f as usize) as usize;
                match priority {
                    0..=9 => s.priority_depth_sum[priority] += depth as i32,
                    10 | 11 => s.dynamic_depths[priority - 10].push(depth as i32),
                    _ => {
                        log::trace!("face {} has priority {}", f, priority);
                        self.stats.skipped += 1;
                        continue;
                    }
                }
                s.priority_buckets[priority].push(f);
            }
        }
    }
}

/// Faces of priorities 10 then 11, each in far-to-near order.
struct DynamicFaces<'a> {
    faces: [&'a [u32]; 2],
    depths: [&'a [i32]; 2],
    stream: usize,
    index: usize,
}

impl<'a> DynamicFaces<'a> {
    fn new(s: &'a FrameScratch) -> Self {
        let faces = [s.priority_buckets[10].as_slice(), s.priority_buckets[11].as_slice()];
        Self {
            stream: usize::from(faces[0].is_empty()),
            faces,
            depths: [s.dynamic_depths[0].as_slice(), s.dynamic_depths[1].as_slice()],
            index: 0,
        }
    }

    fn depth(&self) -> i32 {
        self.depths[self.stream]
            .get(self.index)
            .copied()
            .unwrap_or(EXHAUSTED)
    }

    /// Next face. Only valid while `depth()` is not `EXHAUSTED`.
    fn advance(&mut self) -> u32 {
        let face = self.faces[self.stream][self.index];
        self.index += 1;
        if self.stream == 0 && self.index == self.faces[0].len() {
            self.stream = 1;
            self.index = 0;
        }
        face
    }
}

/// Issues fills for one model's sorted faces.
struct Painter<'a> {
    model: &'a Model,
    scratch: &'a FrameScratch,
    palette: &'a Palette,
    viewport: Viewport,
    canvas: &'a mut dyn Canvas,
    drawn: usize,
    failed: usize,
}

impl<'a> Painter<'a> {
    fn new(
        model: &'a Model,
        scratch: &'a FrameScratch,
        palette: &'a Palette,
        viewport: Viewport,
        canvas: &'a mut dyn Canvas,
    ) -> Self {
        Self {
            model,
            scratch,
            palette,
            viewport,
            canvas,
            drawn: 0,
            failed: 0,
        }
    }

    fn paint(&mut self, face: u32) {
        let face = face as usize;
        match self.draw_face(face) {
            Ok(()) => self.drawn += 1,
            Err(e) => {
                log::trace!("skipping face {}: {}", face, e);
                self.failed += 1;
            }
        }
    }

    fn finish(self, stats: &mut DrawStats) {
        stats.faces += self.drawn;
        stats.skipped += self.failed;
    }

    fn lit(&self, face: usize) -> [i32; 3] {
        let m = self.model;
        let pick = |c: &Option<Arc<Vec<i32>>>| {
            c.as_ref()
                .and_then(|c| c.get(face).copied())
                .unwrap_or(m.face_colour[face])
        };
        [pick(&m.face_colour_a), pick(&m.face_colour_b), pick(&m.face_colour_c)]
    }

    fn texture_space(&self, face: usize) -> Result<TextureSpace, FillError> {
        let m = self.model;
        let texture = m.face_colour[face];
        let t = (m.info(face).unwrap_or(0) >> 2) as usize;
        if t >= m.textured_face_count() {
            return Err(FillError::MissingTexture(texture));
        }
        let s = self.scratch;
        let axes = [m.textured_a[t], m.textured_b[t], m.textured_c[t]].map(|v| v as usize);
        Ok(TextureSpace {
            x: axes.map(|v| s.view_x[v]),
            y: axes.map(|v| s.view_y[v]),
            z: axes.map(|v| s.view_z[v]),
        })
    }

    fn draw_face(&mut self, face: usize) -> Result<(), FillError> {
        if self.scratch.near_clipped[face] {
            return self.draw_clipped_face(face);
        }
        let [a, b, c] = self.model.face(face);
        let s = self.scratch;
        let x = [s.screen_x[a], s.screen_x[b], s.screen_x[c]];
        let y = [s.screen_y[a], s.screen_y[b], s.screen_y[c]];
        let state = FillState {
            hclip: s.hclip[face],
            alpha: self.alpha(face),
        };
        let lit = self.lit(face);
        self.fill(face, x, y, lit, state)
    }

    fn alpha(&self, face: usize) -> i32 {
        self.model.face_alpha.as_ref().map_or(0, |a| a[face])
    }

    fn fill(
        &mut self,
        face: usize,
        x: [i32; 3],
        y: [i32; 3],
        lit: [i32; 3],
        state: FillState,
    ) -> Result<(), FillError> {
        match self.model.shading(face) {
            FaceShading::Gouraud => self.canvas.gouraud_triangle(x, y, lit, state),
            FaceShading::Flat => {
                let rgb = self.palette.rgb(lit[0]);
                self.canvas.flat_triangle(x, y, rgb, state)
            }
            FaceShading::Textured => {
                let space = self.texture_space(face)?;
                let texture = self.model.face_colour[face];
                self.canvas.textured_triangle(x, y, lit, space, texture, state)
            }
            FaceShading::TexturedFlat => {
                let space = self.texture_space(face)?;
                let texture = self.model.face_colour[face];
                let flat = [lit[0]; 3];
                self.canvas.textured_triangle(x, y, flat, space, texture, state)
            }
        }
    }

    fn draw_clipped_face(&mut self, face: usize) -> Result<(), FillError> {
        let [a, b, c] = self.model.face(face);
        let s = self.scratch;
        let lit = self.lit(face);
        let corner = |v: usize, colour: i32| ClipVertex {
            screen_x: s.screen_x[v],
            screen_y: s.screen_y[v],
            view_x: s.view_x[v],
            view_y: s.view_y[v],
            view_z: s.view_z[v],
            colour,
        };
        let poly = clip_near_face(
            [corner(a, lit[0]), corner(b, lit[1]), corner(c, lit[2])],
            self.viewport.centre_x,
            self.viewport.centre_y,
        );
        if poly.len < 3 || poly.winding(0, 1, 2) <= 0 {
            return Ok(());
        }
        let state = FillState {
            hclip: self.viewport.needs_hclip(&poly.x[..poly.len]),
            alpha: self.alpha(face),
        };
        for [i, j, k] in poly.triangles() {
            let x = [poly.x[i], poly.x[j], poly.x[k]];
            let y = [poly.y[i], poly.y[j], poly.y[k]];
            let colours = [poly.colour[i], poly.colour[j], poly.colour[k]];
            self.fill(face, x, y, colours, state)?;
        }
        Ok(())
    }
}
