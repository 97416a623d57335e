//! Display/model coordinate conversion
//!
//! Display space is surface-local pixels: origin at the top-left of the
//! rendered page, x to the right, y down. Model space is the page's own
//! coordinate system before zoom and rotation are applied.
//!
//! Every conversion takes the page viewport explicitly so callers always
//! convert against the surface state at call time.

use crate::annotation::{Annotation, AnnotationGeometry, ModelDelta, ModelPoint, ModelRect};

/// Point in surface-local display pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle in display pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn origin(&self) -> DisplayPoint {
        DisplayPoint::new(self.left, self.top)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Grow the rectangle outward by `amount` on every side
    pub fn inflate(&self, amount: f64) -> DisplayRect {
        DisplayRect::new(
            self.left - amount,
            self.top - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }
}

/// Errors building a page viewport
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i32),
    #[error("scale must be finite and positive, got {0}")]
    InvalidScale(f64),
}

/// Clockwise page rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Normalize any multiple of 90 degrees (negative values included)
    pub fn from_degrees(degrees: i32) -> Result<Self, TransformError> {
        if degrees % 90 != 0 {
            return Err(TransformError::InvalidRotation(degrees));
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Rotation::None,
            90 => Rotation::Cw90,
            180 => Rotation::Cw180,
            _ => Rotation::Cw270,
        })
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }
}

/// Placement of one rendered page: zoom, rotation and unscaled page size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageViewport {
    scale: f64,
    rotation: Rotation,
    page_width: f64,
    page_height: f64,
}

impl PageViewport {
    pub fn new(
        scale: f64,
        rotation: Rotation,
        page_width: f64,
        page_height: f64,
    ) -> Result<Self, TransformError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TransformError::InvalidScale(scale));
        }
        Ok(Self { scale, rotation, page_width, page_height })
    }

    /// Unrotated viewport at the given scale
    pub fn scaled(scale: f64, page_width: f64, page_height: f64) -> Result<Self, TransformError> {
        Self::new(scale, Rotation::None, page_width, page_height)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Rendered size in display pixels (swapped for quarter turns)
    pub fn display_size(&self) -> (f64, f64) {
        let (w, h) = (self.page_width * self.scale, self.page_height * self.scale);
        match self.rotation {
            Rotation::None | Rotation::Cw180 => (w, h),
            Rotation::Cw90 | Rotation::Cw270 => (h, w),
        }
    }
}

/// Anything with a model-space bounding box
pub trait ModelBounds {
    fn model_bounds(&self) -> Option<ModelRect>;
}

impl ModelBounds for ModelRect {
    fn model_bounds(&self) -> Option<ModelRect> {
        Some(*self)
    }
}

impl ModelBounds for AnnotationGeometry {
    fn model_bounds(&self) -> Option<ModelRect> {
        self.bounds()
    }
}

impl ModelBounds for Annotation {
    fn model_bounds(&self) -> Option<ModelRect> {
        self.bounds()
    }
}

/// Convert a surface-local display point to model space
pub fn to_model_space(point: DisplayPoint, viewport: &PageViewport) -> ModelPoint {
    let s = viewport.scale;
    let (w, h) = (viewport.page_width, viewport.page_height);
    match viewport.rotation {
        Rotation::None => ModelPoint::new(point.x / s, point.y / s),
        Rotation::Cw90 => ModelPoint::new(point.y / s, h - point.x / s),
        Rotation::Cw180 => ModelPoint::new(w - point.x / s, h - point.y / s),
        Rotation::Cw270 => ModelPoint::new(w - point.y / s, point.x / s),
    }
}

/// Convert a model-space point to surface-local display pixels
pub fn to_display_point(point: ModelPoint, viewport: &PageViewport) -> DisplayPoint {
    let s = viewport.scale;
    let (w, h) = (viewport.page_width, viewport.page_height);
    match viewport.rotation {
        Rotation::None => DisplayPoint::new(point.x * s, point.y * s),
        Rotation::Cw90 => DisplayPoint::new((h - point.y) * s, point.x * s),
        Rotation::Cw180 => DisplayPoint::new((w - point.x) * s, (h - point.y) * s),
        Rotation::Cw270 => DisplayPoint::new(point.y * s, (w - point.x) * s),
    }
}

/// Display bounding box of anything with model bounds
///
/// Rotation turns the model box's corners; the result is the axis-aligned
/// box around all four.
pub fn to_display_rect<B: ModelBounds + ?Sized>(
    item: &B,
    viewport: &PageViewport,
) -> Option<DisplayRect> {
    let bounds = item.model_bounds()?;
    let corners = [
        ModelPoint::new(bounds.x, bounds.y),
        ModelPoint::new(bounds.right(), bounds.y),
        ModelPoint::new(bounds.x, bounds.bottom()),
        ModelPoint::new(bounds.right(), bounds.bottom()),
    ]
    .map(|corner| to_display_point(corner, viewport));

    let left = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let top = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let right = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let bottom = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    Some(DisplayRect::new(left, top, right - left, bottom - top))
}

/// Model-space displacement between two display points
pub fn model_delta(from: DisplayPoint, to: DisplayPoint, viewport: &PageViewport) -> ModelDelta {
    let start = to_model_space(from, viewport);
    let end = to_model_space(to, viewport);
    ModelDelta::new(end.x - start.x, end.y - start.y)
}
