//! Renderer backends for Easel sketches.
//!
//! Two incompatible backends share one contract ([`RenderBackend`]): a
//! CPU-rasterized 2D context and a GPU-accelerated 3D context. The
//! [`Renderer`] wraps exactly one of them together with the surface it
//! draws into.

pub mod backend;
pub mod context2d;
pub mod context3d;
pub mod renderer;

pub use backend::RenderBackend;
pub use context2d::{Context2d, State2d};
pub use context3d::{GpuContext, State3d};
pub use renderer::{BackendContext, Renderer};
