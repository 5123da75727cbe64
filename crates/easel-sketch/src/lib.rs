pub mod dispatch;
pub mod host;
pub mod lifecycle;
pub mod registry;
pub mod sketch;

pub use dispatch::resolve_blend_mode;
pub use host::{DisplayHost, DisplayNode, MemoryDisplay, SurfaceFactory};
pub use registry::{RendererRef, RendererRegistry};
pub use sketch::{RedrawTrigger, Sketch};

// Re-export so sketches can name backends and modes without a direct
// dependency on the lower crates.
pub use easel_core::{Backend, BlendMode, EaselError, Result, SketchConfig, SurfaceId};
pub use easel_render::Renderer;
