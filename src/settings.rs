//! Runtime settings for decoding and coordinate resolution.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use crate::error::{Result, PickerError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerSettings {
    /// Clamp a click whose rounded coordinate lands one step past the last pixel (default: true)
    pub clamp_edge: bool,
    /// Widest image the decoder will accept (default: 16384)
    pub max_image_width: u32,
    /// Tallest image the decoder will accept (default: 16384)
    pub max_image_height: u32,
    /// Allocation ceiling for a single decode in bytes (default: 512 MiB)
    pub max_alloc_bytes: u64,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            clamp_edge: true,
            max_image_width: 16384,
            max_image_height: 16384,
            max_alloc_bytes: 512 * 1024 * 1024,
        }
    }
}

impl PickerSettings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let settings: PickerSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_image_width == 0 || self.max_image_height == 0 {
            return Err(PickerError::InvalidParameter(
                "image size limits must be positive".to_string(),
            ));
        }
        if self.max_alloc_bytes == 0 {
            return Err(PickerError::InvalidParameter(
                "max_alloc_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
