//! Software triangle rasterization of lit models in painter's order.
#![forbid(unsafe_code)]

pub mod canvas;
pub mod clip;
pub mod palette;
pub mod rasterizer;
pub mod scratch;
pub mod viewport;

pub use canvas::{Canvas, FillError, FillState, TextureSpace};
pub use clip::{ClipVertex, ClippedPolygon, NEAR_Z, clip_near_face};
pub use palette::Palette;
pub use rasterizer::{DrawStats, Rasterizer};
pub use scratch::FrameScratch;
pub use viewport::{Camera, Viewport};
