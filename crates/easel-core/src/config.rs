//! Sketch configuration.

use crate::error::{EaselError, Result};
use serde::Deserialize;

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for a `Sketch`.
///
/// Every field has a library default, so a config document only needs the
/// fields it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Id of the host container new surfaces attach to. `None` attaches to
    /// the document root.
    pub container: Option<String>,

    /// Backing pixels per logical pixel. Default: **1.0**.
    pub pixel_density: f64,

    /// Validate arguments of public entry points. Default: **true**.
    /// Turning this off skips the validator; dimensions are still clamped.
    pub friendly_errors: bool,

    /// Prefix of the reserved default surface ids. Default: `defaultCanvas`.
    pub default_id_prefix: String,

    /// Prefix of offscreen buffer ids. Default: `graphics`.
    pub graphics_id_prefix: String,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            container: None,
            pixel_density: 1.0,
            friendly_errors: true,
            default_id_prefix: "defaultCanvas".to_string(),
            graphics_id_prefix: "graphics".to_string(),
        }
    }
}

impl SketchConfig {
    /// Parse a JSON config document and check it.
    ///
    /// # Errors
    /// Returns `EaselError::Config` for malformed JSON or out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SketchConfig =
            serde_json::from_str(json).map_err(|e| EaselError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Reject values no sketch can run with.
    pub fn check(&self) -> Result<()> {
        if !(self.pixel_density.is_finite() && self.pixel_density > 0.0) {
            return Err(EaselError::Config(format!(
                "pixel_density must be a positive number, got {}",
                self.pixel_density
            )));
        }
        if self.default_id_prefix.is_empty() || self.graphics_id_prefix.is_empty() {
            return Err(EaselError::Config("id prefixes must not be empty".to_string()));
        }
        if self.default_id_prefix == self.graphics_id_prefix {
            return Err(EaselError::Config(
                "default and graphics id prefixes must differ".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
