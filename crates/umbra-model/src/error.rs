use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of data reading {want} byte(s) at offset {pos} (len {len})")]
    Truncated { pos: usize, want: usize, len: usize },

    #[error("blob of {len} bytes is too short for a model trailer")]
    MissingTrailer { len: usize },

    #[error("stream `{stream}` ends at {end}, past the {len} byte body")]
    StreamOverrun {
        stream: &'static str,
        end: usize,
        len: usize,
    },

    #[error("face {face} references vertex {vertex} but the model has {vertex_count}")]
    VertexOutOfRange {
        face: usize,
        vertex: i32,
        vertex_count: usize,
    },

    #[error("invalid face orientation code {code} on face {face}")]
    BadOrientation { face: usize, code: u8 },
}
