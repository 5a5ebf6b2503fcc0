use std::sync::Arc;

use crate::error::DecodeError;
use crate::metadata::{ModelMetadata, PrioritySource};
use crate::model::{FacePriorities, Model};
use crate::packet::Packet;

impl Model {
    /// Decodes a packed model blob. Missing or corrupt data yields an empty
    /// model; nothing is returned to the caller as an error.
    pub fn decode(blob: &[u8]) -> Model {
        if blob.is_empty() {
            return Model::empty();
        }
        match Self::try_decode(blob) {
            Ok(model) => model,
            Err(e) => {
                log::warn!("model decode failed, using empty model: {}", e);
                Model::empty()
            }
        }
    }

    pub fn try_decode(blob: &[u8]) -> Result<Model, DecodeError> {
        let meta = ModelMetadata::parse(blob)?;
        Self::decode_with(blob, &meta)
    }

    pub fn decode_with(blob: &[u8], meta: &ModelMetadata) -> Result<Model, DecodeError> {
        let body = &blob[..meta.body_len];
        let vertex_count = meta.vertex_count;
        let face_count = meta.face_count;

        // vertices
        let mut flags = Packet::at(body, meta.vertex_flags_offset);
        let mut dx = Packet::at(body, meta.vertex_x_offset);
        let mut dy = Packet::at(body, meta.vertex_y_offset);
        let mut dz = Packet::at(body, meta.vertex_z_offset);
        let mut vertex_labels = meta.vertex_labels_offset.map(|o| Packet::at(body, o));

        let mut vertex_x = Vec::with_capacity(vertex_count);
        let mut vertex_y = Vec::with_capacity(vertex_count);
        let mut vertex_z = Vec::with_capacity(vertex_count);
        let mut vertex_label = vertex_labels
            .as_ref()
            .map(|_| Vec::with_capacity(vertex_count));
        let (mut x, mut y, mut z) = (0i32, 0i32, 0i32);
        for _ in 0..vertex_count {
            let flag = flags.g1()?;
            if flag & 1 != 0 {
                x += dx.gsmarts()?;
            }
            if flag & 2 != 0 {
                y += dy.gsmarts()?;
            }
            if flag & 4 != 0 {
                z += dz.gsmarts()?;
            }
            vertex_x.push(x);
            vertex_y.push(y);
            vertex_z.push(z);
            if let (Some(p), Some(out)) = (vertex_labels.as_mut(), vertex_label.as_mut()) {
                out.push(p.g1()?);
            }
        }

        // face attributes
        let mut colours = Packet::at(body, meta.face_colours_offset);
        let mut infos = meta.face_infos_offset.map(|o| Packet::at(body, o));
        let mut priorities = match meta.face_priorities {
            PrioritySource::PerFace(o) => Some(Packet::at(body, o)),
            PrioritySource::Constant(_) => None,
        };
        let mut alphas = meta.face_alphas_offset.map(|o| Packet::at(body, o));
        let mut labels = meta.face_labels_offset.map(|o| Packet::at(body, o));

        let mut face_colour = Vec::with_capacity(face_count);
        let mut face_info = infos.as_ref().map(|_| Vec::with_capacity(face_count));
        let mut face_priority = priorities.as_ref().map(|_| Vec::with_capacity(face_count));
        let mut face_alpha = alphas.as_ref().map(|_| Vec::with_capacity(face_count));
        let mut face_label = labels.as_ref().map(|_| Vec::with_capacity(face_count));
        for _ in 0..face_count {
            face_colour.push(colours.g2()? as i32);
            if let (Some(p), Some(out)) = (infos.as_mut(), face_info.as_mut()) {
                out.push(p.g1()? as i32);
            }
            if let (Some(p), Some(out)) = (priorities.as_mut(), face_priority.as_mut()) {
                out.push(p.g1()?);
            }
            if let (Some(p), Some(out)) = (alphas.as_mut(), face_alpha.as_mut()) {
                out.push(p.g1()? as i32);
            }
            if let (Some(p), Some(out)) = (labels.as_mut(), face_label.as_mut()) {
                out.push(p.g1()?);
            }
        }

        // face indices
        let mut deltas = Packet::at(body, meta.face_vertices_offset);
        let mut orientations = Packet::at(body, meta.face_orientations_offset);
        let mut face_a = Vec::with_capacity(face_count);
        let mut face_b = Vec::with_capacity(face_count);
        let mut face_c = Vec::with_capacity(face_count);
        let (mut a, mut b, mut c, mut last) = (0i32, 0i32, 0i32, 0i32);
        for face in 0..face_count {
            match orientations.g1()? {
                1 => {
                    a = deltas.gsmarts()? + last;
                    last = a;
                    b = deltas.gsmarts()? + last;
                    last = b;
                    c = deltas.gsmarts()? + last;
                    last = c;
                }
                2 => {
                    b = c;
                    c = deltas.gsmarts()? + last;
                    last = c;
                }
                3 => {
                    a = c;
                    c = deltas.gsmarts()? + last;
                    last = c;
                }
                4 => {
                    std::mem::swap(&mut a, &mut b);
                    c = deltas.gsmarts()? + last;
                    last = c;
                }
                code => return Err(DecodeError::BadOrientation { face, code }),
            }
            for vertex in [a, b, c] {
                if vertex < 0 || vertex as usize >= vertex_count {
                    return Err(DecodeError::VertexOutOfRange {
                        face,
                        vertex,
                        vertex_count,
                    });
                }
            }
            face_a.push(a as u32);
            face_b.push(b as u32);
            face_c.push(c as u32);
        }

        // texture axes
        let mut axes = Packet::at(body, meta.texture_axes_offset);
        let textured_count = meta.textured_face_count;
        let mut textured_a = Vec::with_capacity(textured_count);
        let mut textured_b = Vec::with_capacity(textured_count);
        let mut textured_c = Vec::with_capacity(textured_count);
        for face in 0..textured_count {
            let axis = [axes.g2()?, axes.g2()?, axes.g2()?];
            if let Some(&vertex) = axis.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(DecodeError::VertexOutOfRange {
                    face,
                    vertex: vertex as i32,
                    vertex_count,
                });
            }
            textured_a.push(axis[0] as u32);
            textured_b.push(axis[1] as u32);
            textured_c.push(axis[2] as u32);
        }

        let face_priority = match (face_priority, meta.face_priorities) {
            (Some(per_face), _) => FacePriorities::PerFace(Arc::new(per_face)),
            (None, PrioritySource::Constant(p)) => FacePriorities::Constant(p),
            (None, PrioritySource::PerFace(_)) => FacePriorities::Constant(0),
        };

        Ok(Model {
            vertex_x: Arc::new(vertex_x),
            vertex_y: Arc::new(vertex_y),
            vertex_z: Arc::new(vertex_z),
            vertex_label: vertex_label.map(Arc::new),
            face_a: Arc::new(face_a),
            face_b: Arc::new(face_b),
            face_c: Arc::new(face_c),
            face_colour: Arc::new(face_colour),
            face_info: face_info.map(Arc::new),
            face_priority,
            face_alpha: face_alpha.map(Arc::new),
            face_label: face_label.map(Arc::new),
            textured_a: Arc::new(textured_a),
            textured_b: Arc::new(textured_b),
            textured_c: Arc::new(textured_c),
            ..Model::default()
        })
    }
}
