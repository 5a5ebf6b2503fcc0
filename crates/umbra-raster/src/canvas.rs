use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FillError {
    #[error("triangle spans ({x}, {y}) outside the target")]
    OutOfBounds { x: i32, y: i32 },
    #[error("texture {0} is not available")]
    MissingTexture(i32),
    #[error("{0}")]
    Other(String),
}

/// Per-triangle fill state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillState {
    /// A vertex lies outside `0..=safe_width`, so spans must be clipped horizontally.
    pub hclip: bool,
    /// 0 is opaque.
    pub alpha: i32,
}

/// View-space texture axis vertices `(a, b, c)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureSpace {
    pub x: [i32; 3],
    pub y: [i32; 3],
    pub z: [i32; 3],
}

/// Triangle fill target. Screen coordinates are `[a, b, c]`; Gouraud and
/// textured colours are HSL16 values resolved by the implementation.
pub trait Canvas {
    fn flat_triangle(
        &mut self,
        x: [i32; 3],
        y: [i32; 3],
        rgb: u32,
        state: FillState,
    ) -> Result<(), FillError>;

    fn gouraud_triangle(
        &mut self,
        x: [i32; 3],
        y: [i32; 3],
        hsl: [i32; 3],
        state: FillState,
    ) -> Result<(), FillError>;

    fn textured_triangle(
        &mut self,
        x: [i32; 3],
        y: [i32; 3],
        hsl: [i32; 3],
        space: TextureSpace,
        texture: i32,
        state: FillState,
    ) -> Result<(), FillError>;
}
