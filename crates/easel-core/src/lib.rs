pub mod backend;
pub mod blend;
pub mod color;
pub mod config;
pub mod error;
pub mod id;
pub mod property;
pub mod surface;
pub mod validate;

pub use backend::Backend;
pub use blend::{BlendMode, deprecated_alias};
pub use color::Color;
pub use config::SketchConfig;
pub use error::{EaselError, PropertyError, Result};
pub use id::SurfaceId;
pub use property::{PropertySnapshot, Scalar, ScalarProperties, restore_snapshot};
pub use surface::{SurfaceHandle, backing_extent, pixel_extent};
pub use validate::{Arg, FriendlyValidator, NoValidation, ParamValidator};
