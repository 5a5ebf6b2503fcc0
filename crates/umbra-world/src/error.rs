use thiserror::Error;
use umbra_model::DecodeError;

/// Region load failures. Terrain and loc streams are trusted data, so any of
/// these aborts the region.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("truncated region stream: {0}")]
    Stream(#[from] DecodeError),

    #[error("unknown loc type {id} at ({x}, {z}) level {level}")]
    UnknownLoc { id: u32, level: usize, x: i32, z: i32 },

    #[error("invalid loc shape {shape} for loc {id}")]
    BadShape { id: u32, shape: u8 },

    #[error("unknown floor type {id} at ({x}, {z}) level {level}")]
    UnknownFloor { id: u16, level: usize, x: usize, z: usize },

    #[error("level {0} is out of range")]
    BadLevel(usize),
}
