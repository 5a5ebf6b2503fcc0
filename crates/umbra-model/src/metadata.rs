use crate::error::DecodeError;
use crate::packet::Packet;

pub const TRAILER_LEN: usize = 18;

/// Where the per-face priority comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrioritySource {
    PerFace(usize),
    Constant(u8),
}

/// Offset table into a packed model blob, read from its 18-byte trailer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelMetadata {
    pub vertex_count: usize,
    pub face_count: usize,
    pub textured_face_count: usize,
    pub vertex_flags_offset: usize,
    pub face_orientations_offset: usize,
    pub face_priorities: PrioritySource,
    pub face_labels_offset: Option<usize>,
    pub face_infos_offset: Option<usize>,
    pub vertex_labels_offset: Option<usize>,
    pub face_alphas_offset: Option<usize>,
    pub face_vertices_offset: usize,
    pub face_colours_offset: usize,
    pub texture_axes_offset: usize,
    pub vertex_x_offset: usize,
    pub vertex_y_offset: usize,
    pub vertex_z_offset: usize,
    /// Length of the stream body, which ends where the trailer starts.
    pub body_len: usize,
}

struct Cursor {
    offset: usize,
    body_len: usize,
}

impl Cursor {
    fn claim(&mut self, stream: &'static str, len: usize) -> Result<usize, DecodeError> {
        let start = self.offset;
        let end = start + len;
        if end > self.body_len {
            return Err(DecodeError::StreamOverrun {
                stream,
                end,
                len: self.body_len,
            });
        }
        self.offset = end;
        Ok(start)
    }

    fn claim_if(
        &mut self,
        present: bool,
        stream: &'static str,
        len: usize,
    ) -> Result<Option<usize>, DecodeError> {
        if present {
            self.claim(stream, len).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl ModelMetadata {
    pub fn parse(blob: &[u8]) -> Result<Self, DecodeError> {
        if blob.len() < TRAILER_LEN {
            return Err(DecodeError::MissingTrailer { len: blob.len() });
        }
        let body_len = blob.len() - TRAILER_LEN;
        let mut p = Packet::at(blob, body_len);
        let vertex_count = p.g2()? as usize;
        let face_count = p.g2()? as usize;
        let textured_face_count = p.g1()? as usize;
        let has_info = p.g1()? == 1;
        let priority = p.g1()?;
        let has_alpha = p.g1()? == 1;
        let has_face_labels = p.g1()? == 1;
        let has_vertex_labels = p.g1()? == 1;
        let x_len = p.g2()? as usize;
        let y_len = p.g2()? as usize;
        let z_len = p.g2()? as usize;
        let face_vertices_len = p.g2()? as usize;

        let mut c = Cursor {
            offset: 0,
            body_len,
        };
        let vertex_flags_offset = c.claim("vertex flags", vertex_count)?;
        let face_orientations_offset = c.claim("face orientations", face_count)?;
        let face_priorities = if priority == 255 {
            PrioritySource::PerFace(c.claim("face priorities", face_count)?)
        } else {
            PrioritySource::Constant(priority)
        };
        let face_labels_offset = c.claim_if(has_face_labels, "face labels", face_count)?;
        let face_infos_offset = c.claim_if(has_info, "face info", face_count)?;
        let vertex_labels_offset = c.claim_if(has_vertex_labels, "vertex labels", vertex_count)?;
        let face_alphas_offset = c.claim_if(has_alpha, "face alphas", face_count)?;
        let face_vertices_offset = c.claim("face vertices", face_vertices_len)?;
        let face_colours_offset = c.claim("face colours", face_count * 2)?;
        let texture_axes_offset = c.claim("texture axes", textured_face_count * 6)?;
        let vertex_x_offset = c.claim("vertex x", x_len)?;
        let vertex_y_offset = c.claim("vertex y", y_len)?;
        let vertex_z_offset = c.claim("vertex z", z_len)?;

        Ok(Self {
            vertex_count,
            face_count,
            textured_face_count,
            vertex_flags_offset,
            face_orientations_offset,
            face_priorities,
            face_labels_offset,
            face_infos_offset,
            vertex_labels_offset,
            face_alphas_offset,
            face_vertices_offset,
            face_colours_offset,
            texture_axes_offset,
            vertex_x_offset,
            vertex_y_offset,
            vertex_z_offset,
            body_len,
        })
    }
}
