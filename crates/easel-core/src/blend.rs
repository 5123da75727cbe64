//! Compositing modes and their per-pixel formulas.
//!
//! A mode combines a newly drawn source color `A` with the destination color
//! `B` already on the surface. Separable modes follow the W3C compositing
//! model: the mix function `B(Cb, Cs)` is blended into the source by the
//! destination alpha, then composited source-over. `REPLACE` and `ADD` are
//! Porter-Duff operators (`copy` and `lighter`) rather than mixes.

use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the fourteen supported compositing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendMode {
    /// Linear interpolation of colors: `C = A·factor + B`. The default.
    #[default]
    Blend,
    /// `C = min(A, B)`.
    Darkest,
    /// `C = max(A, B)`.
    Lightest,
    /// `C = |A − B|`.
    Difference,
    /// `C = A·B`.
    Multiply,
    /// Like DIFFERENCE with less contrast: `C = A + B − 2AB`.
    Exclusion,
    /// Inverse multiply: `C = 1 − (1 − A)(1 − B)`.
    Screen,
    /// `C = A`, alpha ignored.
    Replace,
    /// MULTIPLY on dark destination, SCREEN on light destination.
    Overlay,
    /// OVERLAY with source and destination swapped.
    HardLight,
    /// Softer HARD_LIGHT.
    SoftLight,
    /// Lightens the destination by the source.
    Dodge,
    /// Darkens the destination by the source.
    Burn,
    /// Additive: `C = min(A + B, 1)`.
    Add,
}

/// Legacy tokens still accepted, with the mode they stand for.
const DEPRECATED_ALIASES: &[(&str, BlendMode)] = &[("NORMAL", BlendMode::Blend)];

impl BlendMode {
    pub const ALL: [BlendMode; 14] = [
        BlendMode::Blend,
        BlendMode::Darkest,
        BlendMode::Lightest,
        BlendMode::Difference,
        BlendMode::Multiply,
        BlendMode::Exclusion,
        BlendMode::Screen,
        BlendMode::Replace,
        BlendMode::Overlay,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Dodge,
        BlendMode::Burn,
        BlendMode::Add,
    ];

    /// The constant name sketches use (`HARD_LIGHT`).
    pub fn token(self) -> &'static str {
        match self {
            BlendMode::Blend => "BLEND",
            BlendMode::Darkest => "DARKEST",
            BlendMode::Lightest => "LIGHTEST",
            BlendMode::Difference => "DIFFERENCE",
            BlendMode::Multiply => "MULTIPLY",
            BlendMode::Exclusion => "EXCLUSION",
            BlendMode::Screen => "SCREEN",
            BlendMode::Replace => "REPLACE",
            BlendMode::Overlay => "OVERLAY",
            BlendMode::HardLight => "HARD_LIGHT",
            BlendMode::SoftLight => "SOFT_LIGHT",
            BlendMode::Dodge => "DODGE",
            BlendMode::Burn => "BURN",
            BlendMode::Add => "ADD",
        }
    }

    /// The canvas `globalCompositeOperation` value for this mode.
    pub fn composite_operation(self) -> &'static str {
        match self {
            BlendMode::Blend => "source-over",
            BlendMode::Darkest => "darken",
            BlendMode::Lightest => "lighten",
            BlendMode::Difference => "difference",
            BlendMode::Multiply => "multiply",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Screen => "screen",
            BlendMode::Replace => "copy",
            BlendMode::Overlay => "overlay",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Dodge => "color-dodge",
            BlendMode::Burn => "color-burn",
            BlendMode::Add => "lighter",
        }
    }

    /// Look up a canonical token or composite-operation name. Does not
    /// accept deprecated aliases; see [`deprecated_alias`].
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.token() == token || mode.composite_operation() == token)
    }

    /// Composite `src` over `dst` with this mode.
    pub fn composite(self, src: Color, dst: Color) -> Color {
        match self {
            BlendMode::Replace => src,
            BlendMode::Add => plus_lighter(src, dst),
            _ => self.separable(src, dst),
        }
    }

    fn separable(self, src: Color, dst: Color) -> Color {
        let alpha = src.a + dst.a * (1.0 - src.a);
        if alpha <= f32::EPSILON {
            return Color::TRANSPARENT;
        }
        let channel = |cs: f32, cb: f32| {
            let mixed = (1.0 - dst.a) * cs + dst.a * self.mix(cs, cb);
            ((src.a * mixed + (1.0 - src.a) * dst.a * cb) / alpha).clamp(0.0, 1.0)
        };
        Color::rgba(
            channel(src.r, dst.r),
            channel(src.g, dst.g),
            channel(src.b, dst.b),
            alpha.min(1.0),
        )
    }

    /// Separable mix function `B(Cb, Cs)` for one channel.
    fn mix(self, cs: f32, cb: f32) -> f32 {
        match self {
            BlendMode::Darkest => cs.min(cb),
            BlendMode::Lightest => cs.max(cb),
            BlendMode::Difference => (cb - cs).abs(),
            BlendMode::Multiply => cs * cb,
            BlendMode::Exclusion => cs + cb - 2.0 * cs * cb,
            BlendMode::Screen => screen(cs, cb),
            BlendMode::Overlay => hard_light(cb, cs),
            BlendMode::HardLight => hard_light(cs, cb),
            BlendMode::SoftLight => soft_light(cs, cb),
            BlendMode::Dodge => {
                if cb <= 0.0 {
                    0.0
                } else if cs >= 1.0 {
                    1.0
                } else {
                    (cb / (1.0 - cs)).min(1.0)
                }
            }
            BlendMode::Burn => {
                if cb >= 1.0 {
                    1.0
                } else if cs <= 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - cb) / cs).min(1.0)
                }
            }
            BlendMode::Blend | BlendMode::Replace | BlendMode::Add => cs,
        }
    }
}

/// Resolve a legacy alias to the mode it stands for. Pure lookup; callers
/// own the deprecation warning.
pub fn deprecated_alias(token: &str) -> Option<BlendMode> {
    DEPRECATED_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, mode)| *mode)
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

fn screen(cs: f32, cb: f32) -> f32 {
    cs + cb - cs * cb
}

fn hard_light(cs: f32, cb: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

fn soft_light(cs: f32, cb: f32) -> f32 {
    if cs <= 0.5 {
        cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
    } else {
        let d = if cb <= 0.25 {
            ((16.0 * cb - 12.0) * cb + 4.0) * cb
        } else {
            cb.sqrt()
        };
        cb + (2.0 * cs - 1.0) * (d - cb)
    }
}

fn plus_lighter(src: Color, dst: Color) -> Color {
    let alpha = (src.a + dst.a).min(1.0);
    if alpha <= f32::EPSILON {
        return Color::TRANSPARENT;
    }
    let channel = |cs: f32, cb: f32| ((cs * src.a + cb * dst.a).min(1.0) / alpha).clamp(0.0, 1.0);
    Color::rgba(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        alpha,
    )
}
