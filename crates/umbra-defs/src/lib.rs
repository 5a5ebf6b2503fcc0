//! Static scenery and floor definitions loaded from TOML.
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod floor;
pub mod loc;
pub mod registry;

pub use error::DefsError;
pub use floor::FloorType;
pub use loc::{DecorKind, LocShape, LocType, WallKind};
pub use registry::DefsRegistry;
