use easel_core::{Backend, BlendMode, ScalarProperties};

/// Contract shared by every backend context.
///
/// `resize` is destructive: implementations reallocate their pixel storage
/// and reset drawing state to context defaults. Callers that need state to
/// survive go through `Renderer::resize_preserving`.
pub trait RenderBackend: ScalarProperties {
    fn kind(&self) -> Backend;

    /// Reallocate storage for `width`×`height` backing pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Apply the library's drawing defaults (fill, stroke, caps, font…).
    fn apply_defaults(&mut self);

    fn blend_mode(&self) -> BlendMode;

    fn set_blend_mode(&mut self, mode: BlendMode);
}
