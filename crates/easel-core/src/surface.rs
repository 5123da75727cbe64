use crate::id::SurfaceId;

/// Opaque handle to a platform drawable surface.
///
/// Exclusively owned by one renderer. `width`/`height` are backing pixels,
/// i.e. logical size × pixel density.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceHandle {
    id: SurfaceId,
    visible: bool,
    width: u32,
    height: u32,
}

impl SurfaceHandle {
    /// A visible, zero-area surface; renderers size it on construction.
    pub fn new(id: SurfaceId) -> Self {
        Self {
            id,
            visible: true,
            width: 0,
            height: 0,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Zero-area surfaces are valid; they simply have no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Convert a sketch-supplied dimension to whole pixels.
///
/// Zero, negative and non-finite values collapse to 0 (a degenerate but
/// valid surface); fractions are truncated.
pub fn pixel_extent(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.trunc().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Backing-store extent for a logical extent at `density`.
pub fn backing_extent(logical: u32, density: f64) -> u32 {
    pixel_extent((logical as f64 * density).ceil())
}
