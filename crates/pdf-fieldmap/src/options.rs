use crate::constants::{BASELINE_OFFSET_PT, DEFAULT_FONT_SIZE_PT, DEFAULT_PACING_MS};
use crate::types::*;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Horizontal anchoring of stamped text relative to the mapping's x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextAlign {
    /// Text starts at x
    Left,
    /// Text is centered on x
    #[default]
    Center,
}

/// Generation configuration shared by every row of a run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GenerationOptions {
    /// Stamped text size
    pub font_size_pt: f32,

    /// Pipeline-wide alignment policy
    pub align: TextAlign,

    /// Baseline distance below the clicked point
    pub vertical_offset_pt: f32,

    /// Delay between emitted documents
    pub pacing_ms: u64,

    /// Compress streams of the output documents
    pub compress: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            font_size_pt: DEFAULT_FONT_SIZE_PT,
            align: TextAlign::Center,
            vertical_offset_pt: BASELINE_OFFSET_PT,
            pacing_ms: DEFAULT_PACING_MS,
            compress: true,
        }
    }
}

impl GenerationOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| FieldMapError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| FieldMapError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !(self.font_size_pt.is_finite() && self.font_size_pt > 0.0) {
            return Err(FieldMapError::Config(format!(
                "Font size must be positive, got {}",
                self.font_size_pt
            )));
        }

        if !self.vertical_offset_pt.is_finite() {
            return Err(FieldMapError::Config(
                "Vertical offset must be a finite number".to_string(),
            ));
        }

        Ok(())
    }
}
