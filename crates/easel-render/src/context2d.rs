//! CPU-rasterized 2D drawing context.
//!
//! Holds an RGBA8 pixel buffer plus the canvas drawing state. Resizing is
//! destructive like an HTML canvas: the buffer is reallocated and every
//! state field goes back to its context default.

use crate::backend::RenderBackend;
use easel_core::{Backend, BlendMode, Color, PropertyError, PropertySnapshot, Scalar, ScalarProperties};
use kurbo::Rect;

/// Largest backing store a 2D context allocates, in pixels. Matches the
/// common browser canvas area limit.
pub const MAX_PIXELS: u64 = 1 << 28;

// ─── State enums ─────────────────────────────────────────────────────────

macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $kw:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $kw),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($kw => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

keyword_enum!(
    /// Stroke end shape.
    LineCap { Butt => "butt", Round => "round", Square => "square" }
);

keyword_enum!(
    /// Stroke corner shape.
    LineJoin { Miter => "miter", Round => "round", Bevel => "bevel" }
);

keyword_enum!(
    TextAlign {
        Start => "start",
        End => "end",
        Left => "left",
        Right => "right",
        Center => "center",
    }
);

keyword_enum!(
    TextBaseline {
        Top => "top",
        Hanging => "hanging",
        Middle => "middle",
        Alphabetic => "alphabetic",
        Ideographic => "ideographic",
        Bottom => "bottom",
    }
);

// ─── Context ─────────────────────────────────────────────────────────────

/// Drawing state of a 2D context.
#[derive(Debug, Clone, PartialEq)]
pub struct State2d {
    pub fill_style: Color,
    pub stroke_style: Color,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub global_alpha: f64,
    pub blend: BlendMode,
    pub font: String,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    pub image_smoothing_enabled: bool,
    pub shadow_blur: f64,
    pub shadow_color: Color,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
}

impl Default for State2d {
    /// Values a freshly created (or resized) canvas context starts with.
    fn default() -> Self {
        Self {
            fill_style: Color::BLACK,
            stroke_style: Color::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            global_alpha: 1.0,
            blend: BlendMode::Blend,
            font: "10px sans-serif".to_string(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
            image_smoothing_enabled: true,
            shadow_blur: 0.0,
            shadow_color: Color::TRANSPARENT,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
        }
    }
}

/// Rasterized 2D context over an RGBA8 buffer.
#[derive(Debug)]
pub struct Context2d {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    state: State2d,
}

impl Context2d {
    /// A cleared context. If the buffer cannot be allocated the context
    /// comes back zero-sized instead.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height, pixels) = match alloc_pixels(width, height) {
            Some(pixels) => (width, height, pixels),
            None => {
                log::error!("context2d: cannot allocate a {width}x{height} buffer, falling back to 0x0");
                (0, 0, Vec::new())
            }
        };
        Self {
            width,
            height,
            pixels,
            state: State2d::default(),
        }
    }

    /// Whether a `width`×`height` buffer is within [`MAX_PIXELS`].
    pub fn fits(width: u32, height: u32) -> bool {
        buffer_len(width, height).is_some()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn state(&self) -> &State2d {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State2d {
        &mut self.state
    }

    /// The peniko blend mode equivalent to the current compositing mode.
    pub fn peniko_blend(&self) -> peniko::BlendMode {
        to_peniko(self.state.blend)
    }

    /// Color at backing pixel `(x, y)`, if inside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = pixel_offset(self.width, x, y);
        let p = &self.pixels[i..i + 4];
        Some(Color::from_rgba8(p[0], p[1], p[2], p[3]))
    }

    /// Fill an axis-aligned rectangle with the fill style, compositing with
    /// the current blend mode and global alpha. Clipped to the buffer.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let bounds = Rect::new(0.0, 0.0, self.width as f64, self.height as f64);
        let area = Rect::new(x, y, x + w, y + h).abs().intersect(bounds);
        if area.area() <= 0.0 {
            return;
        }

        let src = self
            .state
            .fill_style
            .with_alpha_scaled(self.state.global_alpha as f32);
        let mode = self.state.blend;
        let (x0, y0) = (area.x0.round() as u32, area.y0.round() as u32);
        let (x1, y1) = (area.x1.round() as u32, area.y1.round() as u32);

        for py in y0..y1 {
            for px in x0..x1 {
                let i = pixel_offset(self.width, px, py);
                let p = &mut self.pixels[i..i + 4];
                let dst = Color::from_rgba8(p[0], p[1], p[2], p[3]);
                p.copy_from_slice(&mode.composite(src, dst).to_rgba8());
            }
        }
    }
}

impl RenderBackend for Context2d {
    fn kind(&self) -> Backend {
        Backend::Rasterized2d
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::trace!("context2d: resize {}x{} -> {width}x{height}", self.width, self.height);
        *self = Context2d::new(width, height);
    }

    fn apply_defaults(&mut self) {
        self.state.fill_style = Color::WHITE;
        self.state.stroke_style = Color::BLACK;
        self.state.line_cap = LineCap::Round;
        self.state.font = "normal 12px sans-serif".to_string();
    }

    fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }
}

// ─── Properties ──────────────────────────────────────────────────────────

impl ScalarProperties for Context2d {
    fn scalar_properties(&self) -> PropertySnapshot {
        let s = &self.state;
        let mut snap = PropertySnapshot::new();
        snap.push("fill_style", s.fill_style);
        snap.push("stroke_style", s.stroke_style);
        snap.push("line_width", s.line_width);
        snap.push("line_cap", s.line_cap.as_str());
        snap.push("line_join", s.line_join.as_str());
        snap.push("miter_limit", s.miter_limit);
        snap.push("global_alpha", s.global_alpha);
        snap.push("global_composite_operation", s.blend.composite_operation());
        snap.push("font", s.font.as_str());
        snap.push("text_align", s.text_align.as_str());
        snap.push("text_baseline", s.text_baseline.as_str());
        snap.push("image_smoothing_enabled", s.image_smoothing_enabled);
        snap.push("shadow_blur", s.shadow_blur);
        snap.push("shadow_color", s.shadow_color);
        snap.push("shadow_offset_x", s.shadow_offset_x);
        snap.push("shadow_offset_y", s.shadow_offset_y);
        snap
    }

    fn set_scalar(&mut self, key: &str, value: Scalar) -> Result<(), PropertyError> {
        let s = &mut self.state;
        match key {
            "fill_style" => s.fill_style = value.expect_color(key)?,
            "stroke_style" => s.stroke_style = value.expect_color(key)?,
            "shadow_color" => s.shadow_color = value.expect_color(key)?,
            "line_width" => s.line_width = positive(key, value.expect_number(key)?)?,
            "miter_limit" => s.miter_limit = positive(key, value.expect_number(key)?)?,
            "global_alpha" => {
                let alpha = value.expect_number(key)?;
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(invalid(key, alpha));
                }
                s.global_alpha = alpha;
            }
            "line_cap" => s.line_cap = keyword(key, &value, LineCap::parse)?,
            "line_join" => s.line_join = keyword(key, &value, LineJoin::parse)?,
            "text_align" => s.text_align = keyword(key, &value, TextAlign::parse)?,
            "text_baseline" => s.text_baseline = keyword(key, &value, TextBaseline::parse)?,
            "global_composite_operation" => {
                s.blend = keyword(key, &value, BlendMode::from_token)?;
            }
            "font" => s.font = value.expect_text(key)?.to_string(),
            "image_smoothing_enabled" => s.image_smoothing_enabled = value.expect_bool(key)?,
            "shadow_blur" => s.shadow_blur = value.expect_number(key)?.max(0.0),
            "shadow_offset_x" => s.shadow_offset_x = value.expect_number(key)?,
            "shadow_offset_y" => s.shadow_offset_y = value.expect_number(key)?,
            _ => return Err(PropertyError::Unknown(key.to_string())),
        }
        Ok(())
    }
}

fn keyword<T>(key: &str, value: &Scalar, parse: impl Fn(&str) -> Option<T>) -> Result<T, PropertyError> {
    let text = value.expect_text(key)?;
    parse(text).ok_or_else(|| invalid(key, text))
}

fn positive(key: &str, n: f64) -> Result<f64, PropertyError> {
    if n.is_finite() && n > 0.0 { Ok(n) } else { Err(invalid(key, n)) }
}

fn invalid(key: &str, value: impl ToString) -> PropertyError {
    PropertyError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Byte length of an RGBA8 buffer, or `None` past [`MAX_PIXELS`].
fn buffer_len(width: u32, height: u32) -> Option<usize> {
    let pixels = u64::from(width).checked_mul(u64::from(height))?;
    if pixels > MAX_PIXELS {
        return None;
    }
    usize::try_from(pixels).ok()?.checked_mul(4)
}

fn alloc_pixels(width: u32, height: u32) -> Option<Vec<u8>> {
    let len = buffer_len(width, height)?;
    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len).ok()?;
    pixels.resize(len, 0);
    Some(pixels)
}

fn pixel_offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

/// Map a compositing mode to peniko's mix/compose pair.
pub fn to_peniko(mode: BlendMode) -> peniko::BlendMode {
    use peniko::{Compose, Mix};
    let (mix, compose) = match mode {
        BlendMode::Blend => (Mix::Normal, Compose::SrcOver),
        BlendMode::Darkest => (Mix::Darken, Compose::SrcOver),
        BlendMode::Lightest => (Mix::Lighten, Compose::SrcOver),
        BlendMode::Difference => (Mix::Difference, Compose::SrcOver),
        BlendMode::Multiply => (Mix::Multiply, Compose::SrcOver),
        BlendMode::Exclusion => (Mix::Exclusion, Compose::SrcOver),
        BlendMode::Screen => (Mix::Screen, Compose::SrcOver),
        BlendMode::Replace => (Mix::Normal, Compose::Copy),
        BlendMode::Overlay => (Mix::Overlay, Compose::SrcOver),
        BlendMode::HardLight => (Mix::HardLight, Compose::SrcOver),
        BlendMode::SoftLight => (Mix::SoftLight, Compose::SrcOver),
        BlendMode::Dodge => (Mix::ColorDodge, Compose::SrcOver),
        BlendMode::Burn => (Mix::ColorBurn, Compose::SrcOver),
        BlendMode::Add => (Mix::Normal, Compose::Plus),
    };
    peniko::BlendMode::new(mix, compose)
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resize_resets_state_and_pixels() {
        let mut ctx = Context2d::new(4, 4);
        ctx.state_mut().fill_style = Color::WHITE;
        ctx.fill_rect(0.0, 0.0, 4.0, 4.0);
        ctx.set_blend_mode(BlendMode::Multiply);

        ctx.resize(8, 2);

        assert_eq!(ctx.width(), 8);
        assert_eq!(ctx.pixels().len(), 8 * 2 * 4);
        assert_eq!(ctx.state(), &State2d::default());
        assert_eq!(ctx.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn fill_rect_composites_with_blend_mode() {
        let mut ctx = Context2d::new(2, 1);
        ctx.state_mut().fill_style = Color::from_rgba8(255, 0, 0, 255);
        ctx.fill_rect(0.0, 0.0, 2.0, 1.0);

        ctx.set_blend_mode(BlendMode::Multiply);
        ctx.state_mut().fill_style = Color::from_rgba8(255, 255, 0, 255);
        ctx.fill_rect(1.0, 0.0, 1.0, 1.0);

        assert_eq!(ctx.pixel(0, 0).map(Color::to_rgba8), Some([255, 0, 0, 255]));
        assert_eq!(ctx.pixel(1, 0).map(Color::to_rgba8), Some([255, 0, 0, 255]));
    }

    #[test]
    fn fill_rect_clips_to_buffer() {
        let mut ctx = Context2d::new(2, 2);
        ctx.fill_rect(-5.0, -5.0, 6.0, 6.0);
        assert_eq!(ctx.pixel(0, 0).map(Color::to_rgba8), Some([0, 0, 0, 255]));
        assert_eq!(ctx.pixel(1, 1), Some(Color::TRANSPARENT));
        assert_eq!(ctx.pixel(2, 0), None);
    }

    #[test]
    fn zero_area_context_is_valid() {
        let mut ctx = Context2d::new(0, 0);
        ctx.fill_rect(0.0, 0.0, 10.0, 10.0);
        assert!(ctx.pixels().is_empty());
    }

    #[test]
    fn oversized_buffer_falls_back_to_empty() {
        for (w, h) in [(u32::MAX, u32::MAX), (u32::MAX, 1), (1 << 15, 1 << 14)] {
            assert!(!Context2d::fits(w, h));
            let mut ctx = Context2d::new(w, h);
            assert_eq!((ctx.width(), ctx.height()), (0, 0));
            ctx.fill_rect(0.0, 0.0, 10.0, 10.0);
            assert_eq!(ctx.pixel(0, 0), None);
        }
        assert!(Context2d::fits(1 << 14, 1 << 14));
    }

    #[test]
    fn composite_operation_property_round_trips() {
        let mut ctx = Context2d::new(1, 1);
        ctx.set_scalar("global_composite_operation", Scalar::from("color-burn"))
            .unwrap();
        assert_eq!(ctx.blend_mode(), BlendMode::Burn);
        assert_eq!(
            ctx.get_scalar("global_composite_operation"),
            Some(Scalar::from("color-burn"))
        );
    }

    #[test]
    fn rejects_bad_property_values() {
        let mut ctx = Context2d::new(1, 1);
        assert!(ctx.set_scalar("line_cap", Scalar::from("pointy")).is_err());
        assert!(ctx.set_scalar("global_alpha", Scalar::from(1.5)).is_err());
        assert!(ctx.set_scalar("line_width", Scalar::from(true)).is_err());
        assert!(matches!(
            ctx.set_scalar("canvas", Scalar::from(1.0)),
            Err(PropertyError::Unknown(_))
        ));
    }

    #[test]
    fn peniko_mapping_matches_canvas_names() {
        assert_eq!(to_peniko(BlendMode::Replace).compose, peniko::Compose::Copy);
        assert_eq!(to_peniko(BlendMode::Add).compose, peniko::Compose::Plus);
        assert_eq!(to_peniko(BlendMode::Dodge).mix, peniko::Mix::ColorDodge);
    }

    #[test]
    fn defaults_differ_from_context_defaults() {
        let mut ctx = Context2d::new(1, 1);
        ctx.apply_defaults();
        assert_eq!(ctx.state().fill_style, Color::WHITE);
        assert_eq!(ctx.state().line_cap, LineCap::Round);
    }
}
