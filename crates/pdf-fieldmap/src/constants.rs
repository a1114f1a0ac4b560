//! Shared constants for field stamping
//!
//! This module centralizes magic numbers used by the coordinate model,
//! the generation pipeline and output pacing.

// =============================================================================
// Page Geometry
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

/// Maximum number of parent `Pages` nodes followed when resolving inherited
/// page attributes
pub const MAX_INHERITANCE_DEPTH: usize = 32;

// =============================================================================
// Stamping
// =============================================================================

/// Distance between the clicked point and the text baseline, in points
pub const BASELINE_OFFSET_PT: f32 = 5.0;

/// Default stamped text size in points
pub const DEFAULT_FONT_SIZE_PT: f32 = 12.0;

/// Prefix of the font resource name added to stamped pages
pub const STAMP_FONT_RESOURCE_PREFIX: &str = "FStamp";

/// Fallback font name when the font carries no PostScript name
pub const FALLBACK_FONT_NAME: &str = "StampFont";

// =============================================================================
// Output
// =============================================================================

/// Delay between two emitted documents, in milliseconds
pub const DEFAULT_PACING_MS: u64 = 500;

/// Extension of every generated file
pub const OUTPUT_EXTENSION: &str = ".pdf";

/// Separator between the base name and row values in filenames
pub const FILENAME_SEPARATOR: &str = "-";
