use crate::error::EaselError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The rasterization technology a renderer wraps.
///
/// Fixed for the lifetime of a renderer: switching backend means tearing the
/// renderer down and building a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// CPU-rasterized 2D context.
    #[default]
    #[serde(alias = "p2d")]
    Rasterized2d,
    /// GPU-accelerated 3D context.
    #[serde(alias = "webgl")]
    Accelerated3d,
}

impl Backend {
    /// The renderer constant sketches pass to `createCanvas`.
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Rasterized2d => "p2d",
            Backend::Accelerated3d => "webgl",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p2d" | "2d" | "rasterized2d" => Ok(Backend::Rasterized2d),
            "webgl" | "3d" | "accelerated3d" => Ok(Backend::Accelerated3d),
            other => Err(EaselError::validation(
                "createCanvas",
                format!("unknown renderer `{other}`, expected P2D or WEBGL"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_renderer_constants() {
        assert_eq!("P2D".parse::<Backend>().unwrap(), Backend::Rasterized2d);
        assert_eq!("webgl".parse::<Backend>().unwrap(), Backend::Accelerated3d);
        assert!(matches!(
            "svg".parse::<Backend>(),
            Err(EaselError::Validation { .. })
        ));
    }

    #[test]
    fn default_is_rasterized() {
        assert_eq!(Backend::default(), Backend::Rasterized2d);
    }
}
