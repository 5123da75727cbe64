//! Compositing-mode dispatch.

use crate::host::{DisplayHost, SurfaceFactory};
use crate::registry::RendererRef;
use crate::sketch::Sketch;
use easel_core::{Arg, BlendMode, EaselError, Result, deprecated_alias};

/// Resolve a user-facing mode token. Legacy aliases resolve with a
/// deprecation warning; anything unrecognized is `UnsupportedMode`.
pub fn resolve_blend_mode(token: &str) -> Result<BlendMode> {
    if let Some(mode) = deprecated_alias(token) {
        log::warn!("blendMode({token}) is deprecated, use {} instead", mode.token());
        return Ok(mode);
    }
    BlendMode::from_token(token).ok_or_else(|| EaselError::UnsupportedMode(token.to_string()))
}

impl<H: DisplayHost + SurfaceFactory> Sketch<H> {
    /// Set the compositing mode of the default canvas.
    ///
    /// Without a canvas the token is still checked, and the resolved mode
    /// is returned without being applied anywhere.
    ///
    /// # Errors
    /// `EaselError::Validation` for a blank token, `EaselError::UnsupportedMode`
    /// for an unknown one. The active mode is unchanged on error.
    pub fn blend_mode(&mut self, token: &str) -> Result<BlendMode> {
        self.validate("blendMode", &[Arg::Text(token)])?;
        let mode = resolve_blend_mode(token)?;
        match &self.default_renderer {
            Some(renderer) => renderer.borrow_mut().set_blend_mode(mode),
            None => log::debug!("blendMode({mode}): no canvas, ignoring"),
        }
        Ok(mode)
    }

    /// Set the compositing mode of a graphics buffer.
    ///
    /// # Errors
    /// Same as [`Sketch::blend_mode`].
    pub fn graphics_blend_mode(&self, graphics: &RendererRef, token: &str) -> Result<BlendMode> {
        self.validate("blendMode", &[Arg::Text(token)])?;
        let mode = resolve_blend_mode(token)?;
        graphics.borrow_mut().set_blend_mode(mode);
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::Backend;

    #[test]
    fn resolves_tokens_aliases_and_composite_names() {
        assert_eq!(resolve_blend_mode("SCREEN"), Ok(BlendMode::Screen));
        assert_eq!(resolve_blend_mode("NORMAL"), Ok(BlendMode::Blend));
        assert_eq!(resolve_blend_mode("color-dodge"), Ok(BlendMode::Dodge));
        assert_eq!(
            resolve_blend_mode("screen!"),
            Err(EaselError::UnsupportedMode("screen!".into()))
        );
    }

    #[test]
    fn blank_token_is_a_validation_error() {
        let mut sketch = Sketch::headless();
        assert!(matches!(
            sketch.blend_mode("  "),
            Err(EaselError::Validation { .. })
        ));
    }

    #[test]
    fn mode_without_canvas_is_checked_but_not_applied() {
        let mut sketch = Sketch::headless();
        assert_eq!(sketch.blend_mode("ADD"), Ok(BlendMode::Add));
        assert!(sketch.blend_mode("bogus").is_err());

        let canvas = sketch.create_canvas(4.0, 4.0, Backend::Rasterized2d).unwrap();
        assert_eq!(canvas.borrow().blend_mode(), BlendMode::Blend);
    }

    #[test]
    fn graphics_mode_leaves_default_alone() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(4.0, 4.0, Backend::Rasterized2d).unwrap();
        let buffer = sketch.create_graphics(4.0, 4.0, Backend::Rasterized2d).unwrap();

        sketch.graphics_blend_mode(&buffer, "MULTIPLY").unwrap();

        assert_eq!(buffer.borrow().blend_mode(), BlendMode::Multiply);
        assert_eq!(canvas.borrow().blend_mode(), BlendMode::Blend);
    }
}
