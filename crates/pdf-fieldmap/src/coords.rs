//! Coordinate mapping between a rendered page raster and document space
//!
//! Stored mappings keep the raster convention: origin at the top-left corner
//! of the page, y growing downwards, but in document units (the display scale
//! is already divided out). Flipping to the PDF bottom-left origin is done by
//! the pipeline at stamping time, see [`crate::stamp::flip_to_pdf`].

use crate::types::{FieldMapError, Result};

/// Ratio between raster pixels and document points for one rendered page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterScale(f32);

impl RasterScale {
    /// Create a scale factor; must be finite and strictly positive
    pub fn new(scale: f32) -> Result<Self> {
        if scale.is_finite() && scale > 0.0 {
            Ok(Self(scale))
        } else {
            Err(FieldMapError::Config(format!(
                "Raster scale must be positive, got {}",
                scale
            )))
        }
    }

    /// Scale at which a page `page_width_pt` wide was rendered `raster_width_px` wide
    pub fn fit_width(raster_width_px: f32, page_width_pt: f32) -> Result<Self> {
        if !(page_width_pt.is_finite() && page_width_pt > 0.0) {
            return Err(FieldMapError::Config(format!(
                "Page width must be positive, got {}",
                page_width_pt
            )));
        }
        Self::new(raster_width_px / page_width_pt)
    }

    pub fn factor(self) -> f32 {
        self.0
    }
}

impl Default for RasterScale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// A point in document units, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocPoint {
    pub x: f32,
    pub y: f32,
}

impl DocPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Convert a pointer offset on the rendered page into document units
pub fn to_document(px: f32, py: f32, scale: RasterScale) -> DocPoint {
    DocPoint {
        x: px / scale.0,
        y: py / scale.0,
    }
}

/// Convert a document point back into raster pixels, for overlay markers
pub fn to_raster(point: DocPoint, scale: RasterScale) -> (f32, f32) {
    (point.x * scale.0, point.y * scale.0)
}
