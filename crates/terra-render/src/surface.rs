//! Viewport and drawing-buffer sizing.
//!
//! Window events report physical pixels and a scale factor. The scene works
//! in logical pixels (for the camera aspect) and renders into a drawing
//! buffer whose size is the logical size times the device pixel ratio,
//! with that ratio capped so very dense displays do not pay for 3× buffers.

/// Minimum drawing-buffer dimension (prevents zero-size surface panics).
pub const MIN_BUFFER_DIMENSION: u32 = 1;

/// Default cap on the device pixel ratio used for the drawing buffer.
pub const DEFAULT_MAX_PIXEL_RATIO: f64 = 2.0;

/// Logical viewport size plus the display's device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Logical width.
    pub width: f64,
    /// Logical height.
    pub height: f64,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Build a viewport from a window's physical size and scale factor.
    ///
    /// A non-positive scale factor is treated as 1.0.
    pub fn from_physical(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        let dpr = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            width: physical_width as f64 / dpr,
            height: physical_height as f64 / dpr,
            device_pixel_ratio: dpr,
        }
    }

    /// Whether both dimensions are non-zero. Minimized windows report 0×0.
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// The pixel ratio actually used for the drawing buffer: `min(dpr, max_pixel_ratio)`.
    pub fn effective_pixel_ratio(&self, max_pixel_ratio: f64) -> f64 {
        self.device_pixel_ratio.min(max_pixel_ratio)
    }

    /// Drawing-buffer size in pixels: logical size times the capped pixel
    /// ratio, rounded and clamped to at least 1×1.
    pub fn buffer_size(&self, max_pixel_ratio: f64) -> (u32, u32) {
        let ratio = self.effective_pixel_ratio(max_pixel_ratio);
        (
            scale_dimension(self.width, ratio),
            scale_dimension(self.height, ratio),
        )
    }
}

fn scale_dimension(logical: f64, ratio: f64) -> u32 {
    let scaled = (logical * ratio).round();
    if scaled.is_finite() && scaled >= MIN_BUFFER_DIMENSION as f64 {
        scaled as u32
    } else {
        MIN_BUFFER_DIMENSION
    }
}

/// Tracks the drawing-buffer size the GPU surface is configured for.
///
/// [`DrawingBuffer::set_size`] reports whether the size actually changed so
/// callers can skip reconfiguring the surface and depth buffer on repeated
/// events with the same dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawingBuffer {
    width: u32,
    height: u32,
}

impl DrawingBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(MIN_BUFFER_DIMENSION),
            height: height.max(MIN_BUFFER_DIMENSION),
        }
    }

    /// Set a new size (clamped to ≥ 1). Returns `true` if it differs from the current one.
    pub fn set_size(&mut self, width: u32, height: u32) -> bool {
        let width = width.max(MIN_BUFFER_DIMENSION);
        let height = height.max(MIN_BUFFER_DIMENSION);
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
