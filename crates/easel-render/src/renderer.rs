//! The polymorphic renderer handed to drawing code.
//!
//! A `Renderer` owns its surface and one backend context. The backend is
//! chosen at construction and never changes; switching backend means
//! building a new renderer.

use crate::backend::RenderBackend;
use crate::context2d::Context2d;
use crate::context3d::GpuContext;
use easel_core::{
    Backend, BlendMode, PropertySnapshot, ScalarProperties, SurfaceHandle, SurfaceId,
    backing_extent, restore_snapshot,
};

/// Backend-specific context owned by a renderer.
#[derive(Debug)]
pub enum BackendContext {
    Rasterized2d(Context2d),
    Accelerated3d(GpuContext),
}

impl BackendContext {
    fn new(backend: Backend, width: u32, height: u32) -> Self {
        match backend {
            Backend::Rasterized2d => BackendContext::Rasterized2d(Context2d::new(width, height)),
            Backend::Accelerated3d => BackendContext::Accelerated3d(GpuContext::new(width, height)),
        }
    }

    pub fn as_backend(&self) -> &dyn RenderBackend {
        match self {
            BackendContext::Rasterized2d(ctx) => ctx,
            BackendContext::Accelerated3d(ctx) => ctx,
        }
    }

    pub fn as_backend_mut(&mut self) -> &mut dyn RenderBackend {
        match self {
            BackendContext::Rasterized2d(ctx) => ctx,
            BackendContext::Accelerated3d(ctx) => ctx,
        }
    }
}

/// A surface plus the backend context drawing into it.
#[derive(Debug)]
pub struct Renderer {
    surface: SurfaceHandle,
    is_default: bool,
    width: u32,
    height: u32,
    pixel_density: f64,
    context: BackendContext,
}

impl Renderer {
    /// Build a renderer around `surface`. The context starts at the
    /// surface's current size; call [`Renderer::resize`] to size both.
    pub fn new(surface: SurfaceHandle, backend: Backend, is_default: bool, pixel_density: f64) -> Self {
        let context = BackendContext::new(backend, surface.width(), surface.height());
        log::debug!(
            "renderer: new {backend} renderer on {:?} (default: {is_default})",
            surface.id()
        );
        Self {
            surface,
            is_default,
            width: 0,
            height: 0,
            pixel_density,
            context,
        }
    }

    /// Whether `backend` can back a surface of `width`×`height` physical
    /// pixels.
    pub fn fits(backend: Backend, width: u32, height: u32) -> bool {
        match backend {
            Backend::Rasterized2d => Context2d::fits(width, height),
            Backend::Accelerated3d => GpuContext::fits(width, height),
        }
    }

    pub fn backend(&self) -> Backend {
        self.context.as_backend().kind()
    }

    pub fn id(&self) -> SurfaceId {
        self.surface.id()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Logical width in sketch pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical height in sketch pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density
    }

    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut SurfaceHandle {
        &mut self.surface
    }

    pub fn context(&self) -> &BackendContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut BackendContext {
        &mut self.context
    }

    pub fn as_2d(&self) -> Option<&Context2d> {
        match &self.context {
            BackendContext::Rasterized2d(ctx) => Some(ctx),
            BackendContext::Accelerated3d(_) => None,
        }
    }

    pub fn as_2d_mut(&mut self) -> Option<&mut Context2d> {
        match &mut self.context {
            BackendContext::Rasterized2d(ctx) => Some(ctx),
            BackendContext::Accelerated3d(_) => None,
        }
    }

    pub fn as_3d(&self) -> Option<&GpuContext> {
        match &self.context {
            BackendContext::Accelerated3d(ctx) => Some(ctx),
            BackendContext::Rasterized2d(_) => None,
        }
    }

    pub fn as_3d_mut(&mut self) -> Option<&mut GpuContext> {
        match &mut self.context {
            BackendContext::Accelerated3d(ctx) => Some(ctx),
            BackendContext::Rasterized2d(_) => None,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Resize surface and context to `width`×`height` logical pixels.
    /// Destructive: the context comes back with default state.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let backing_w = backing_extent(width, self.pixel_density);
        let backing_h = backing_extent(height, self.pixel_density);
        self.surface.set_size(backing_w, backing_h);
        self.context.as_backend_mut().resize(backing_w, backing_h);
    }

    /// Resize while carrying every restorable scalar property across.
    /// Returns how many properties were restored.
    pub fn resize_preserving(&mut self, width: u32, height: u32) -> usize {
        let snapshot = self.snapshot();
        self.resize(width, height);
        let restored = self.restore(&snapshot);
        log::trace!(
            "renderer {:?}: restored {restored}/{} properties after resize",
            self.id(),
            snapshot.len()
        );
        restored
    }

    /// Change pixel density and reallocate at the same logical size,
    /// preserving state.
    pub fn set_pixel_density(&mut self, density: f64) {
        self.pixel_density = density;
        self.resize_preserving(self.width, self.height);
    }

    pub fn apply_defaults(&mut self) {
        self.context.as_backend_mut().apply_defaults();
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.context.as_backend().blend_mode()
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.context.as_backend_mut().set_blend_mode(mode);
    }

    /// Capture the context's scalar properties.
    pub fn snapshot(&self) -> PropertySnapshot {
        self.context.as_backend().scalar_properties()
    }

    /// Best-effort re-application of a snapshot; read-only and rejected
    /// properties are skipped.
    pub fn restore(&mut self, snapshot: &PropertySnapshot) -> usize {
        restore_snapshot(self.context.as_backend_mut(), snapshot)
    }
}
