//! GPU-accelerated 3D drawing context.
//!
//! Tracks the fixed-function pipeline state a sketch can change (blend
//! equation, depth test, face culling, clear color) and the descriptor of the
//! color target the context renders into. Pipelines are built against
//! [`GpuContext::blend_state`] and [`GpuContext::target_descriptor`] by the
//! drawing code; this module owns only the state and its lifetime.

use crate::backend::RenderBackend;
use easel_core::{Backend, BlendMode, Color, PropertyError, PropertySnapshot, Scalar, ScalarProperties};

/// Color target format for every accelerated surface.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Pipeline state of a 3D context.
#[derive(Debug, Clone, PartialEq)]
pub struct State3d {
    pub blend: BlendMode,
    pub depth_test: bool,
    pub cull_face: bool,
    pub clear_color: Color,
    pub line_width: f64,
}

impl Default for State3d {
    /// A fresh context: blending off (source replaces destination), no
    /// depth test, transparent clear.
    fn default() -> Self {
        Self {
            blend: BlendMode::Replace,
            depth_test: false,
            cull_face: false,
            clear_color: Color::TRANSPARENT,
            line_width: 1.0,
        }
    }
}

/// Accelerated 3D context.
#[derive(Debug)]
pub struct GpuContext {
    extent: wgpu::Extent3d,
    state: State3d,
    /// Bumped every time the color target is reallocated.
    generation: u64,
}

impl GpuContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            extent: extent(width, height),
            state: State3d::default(),
            generation: 0,
        }
    }

    /// Whether a `width`×`height` color target is within the default
    /// device texture limits.
    pub fn fits(width: u32, height: u32) -> bool {
        let max = wgpu::Limits::default().max_texture_dimension_2d;
        width <= max && height <= max
    }

    pub fn drawing_buffer_width(&self) -> u32 {
        self.extent.width
    }

    pub fn drawing_buffer_height(&self) -> u32 {
        self.extent.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &State3d {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State3d {
        &mut self.state
    }

    /// Blend state for pipelines drawing with the current mode.
    ///
    /// Modes without a fixed-function equation fall back to BLEND.
    pub fn blend_state(&self) -> wgpu::BlendState {
        fixed_function_blend(self.state.blend).unwrap_or(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING)
    }

    /// Clear color for the next render pass.
    pub fn clear_value(&self) -> wgpu::Color {
        let c = self.state.clear_color;
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }

    /// Descriptor of the color target backing this context. A zero extent
    /// is bumped to 1×1; GPU textures cannot be empty.
    pub fn target_descriptor(&self) -> wgpu::TextureDescriptor<'static> {
        wgpu::TextureDescriptor {
            label: Some("easel-accelerated-target"),
            size: wgpu::Extent3d {
                width: self.extent.width.max(1),
                height: self.extent.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        }
    }
}

impl RenderBackend for GpuContext {
    fn kind(&self) -> Backend {
        Backend::Accelerated3d
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::trace!(
            "gpu: reallocating target {}x{} -> {width}x{height}",
            self.extent.width,
            self.extent.height
        );
        self.extent = extent(width, height);
        self.state = State3d::default();
        self.generation += 1;
    }

    fn apply_defaults(&mut self) {
        self.state.blend = BlendMode::Blend;
        self.state.depth_test = true;
        self.state.clear_color = Color::TRANSPARENT;
    }

    fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        if fixed_function_blend(mode).is_none() {
            log::warn!("blendMode({mode}) has no accelerated equivalent; drawing with BLEND");
        }
        self.state.blend = mode;
    }
}

// ─── Properties ──────────────────────────────────────────────────────────

impl ScalarProperties for GpuContext {
    fn scalar_properties(&self) -> PropertySnapshot {
        let s = &self.state;
        let mut snap = PropertySnapshot::new();
        snap.push("drawing_buffer_width", self.extent.width as f64);
        snap.push("drawing_buffer_height", self.extent.height as f64);
        snap.push("blend_mode", s.blend.token());
        snap.push("depth_test", s.depth_test);
        snap.push("cull_face", s.cull_face);
        snap.push("clear_color", s.clear_color);
        snap.push("line_width", s.line_width);
        snap
    }

    fn set_scalar(&mut self, key: &str, value: Scalar) -> Result<(), PropertyError> {
        let s = &mut self.state;
        match key {
            "drawing_buffer_width" | "drawing_buffer_height" => {
                return Err(PropertyError::ReadOnly(key.to_string()));
            }
            "blend_mode" => {
                let token = value.expect_text(key)?;
                s.blend = BlendMode::from_token(token).ok_or_else(|| PropertyError::InvalidValue {
                    key: key.to_string(),
                    value: token.to_string(),
                })?;
            }
            "depth_test" => s.depth_test = value.expect_bool(key)?,
            "cull_face" => s.cull_face = value.expect_bool(key)?,
            "clear_color" => s.clear_color = value.expect_color(key)?,
            "line_width" => s.line_width = value.expect_number(key)?.max(0.0),
            _ => return Err(PropertyError::Unknown(key.to_string())),
        }
        Ok(())
    }
}

// ─── Blend equations ─────────────────────────────────────────────────────

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Fixed-function blend state for `mode`, or `None` when the mode needs a
/// shader (DIFFERENCE, OVERLAY, HARD_LIGHT, SOFT_LIGHT, DODGE, BURN).
pub fn fixed_function_blend(mode: BlendMode) -> Option<wgpu::BlendState> {
    use wgpu::{BlendFactor as F, BlendOperation as Op};

    let component = |src_factor, dst_factor, operation| wgpu::BlendComponent {
        src_factor,
        dst_factor,
        operation,
    };
    let both = |c: wgpu::BlendComponent| wgpu::BlendState { color: c, alpha: c };

    match mode {
        BlendMode::Blend => Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
        BlendMode::Replace => Some(wgpu::BlendState::REPLACE),
        BlendMode::Add => Some(both(component(F::One, F::One, Op::Add))),
        BlendMode::Multiply => Some(both(component(F::Dst, F::OneMinusSrcAlpha, Op::Add))),
        BlendMode::Screen => Some(both(component(F::One, F::OneMinusSrc, Op::Add))),
        BlendMode::Exclusion => Some(both(component(F::OneMinusDst, F::OneMinusSrc, Op::Add))),
        BlendMode::Lightest => Some(both(component(F::One, F::One, Op::Max))),
        BlendMode::Darkest => Some(both(component(F::One, F::One, Op::Min))),
        BlendMode::Difference
        | BlendMode::Overlay
        | BlendMode::HardLight
        | BlendMode::SoftLight
        | BlendMode::Dodge
        | BlendMode::Burn => None,
    }
}
