//! Packed mesh decoding, copy-on-write model geometry, label transforms and face lighting.
#![forbid(unsafe_code)]

pub mod colour;
mod decode;
pub mod encode;
pub mod error;
pub mod lighting;
mod merge;
pub mod metadata;
pub mod model;
pub mod packet;
pub mod transform;

pub use colour::{HIDDEN_COLOUR, adjust_lightness, hsl24_to_16, mul_colour_lightness, mul_hsl};
pub use encode::encode;
pub use error::DecodeError;
pub use lighting::Lighting;
pub use metadata::{ModelMetadata, PrioritySource};
pub use model::{FacePriorities, FaceShading, Model, ModelBounds, VertexNormal};
pub use packet::{Packet, PacketWriter};
pub use transform::{FrameEntry, FrameSource, NoFrames, TransformBase, TransformFrame, TransformKind};
