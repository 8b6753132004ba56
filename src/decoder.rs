//! Turns encoded image bytes into a canonical 8-bit RGB buffer.
//!
//! JPEG, PNG, BMP and TIFF are always available (plus whatever else the `image`
//! crate's default features enable). Grey, alpha and 16-bit inputs are converted
//! to 8-bit RGB; alpha is dropped.

use image::{ImageFormat, ImageReader, Limits, RgbImage};
use std::io::Cursor;
use crate::error::{Result, PickerError};
use crate::settings::PickerSettings;

/// A freshly decoded raster, not yet registered.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples, `width * height` of them
    pub pixels: RgbImage,
}

/// Decode `data`, trusting `hint` when given and sniffing magic bytes otherwise.
pub fn decode(data: &[u8], hint: Option<ImageFormat>, settings: &PickerSettings) -> Result<DecodedImage> {
    if data.is_empty() {
        return Err(PickerError::Decode("empty input".to_string()));
    }

    let mut reader = ImageReader::new(Cursor::new(data));
    match hint {
        Some(format) => reader.set_format(format),
        None => {
            reader = reader
                .with_guessed_format()
                .map_err(|e| PickerError::Decode(format!("Failed to sniff format: {}", e)))?;
        }
    }
    if reader.format().is_none() {
        return Err(PickerError::Decode("unrecognized image encoding".to_string()));
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(settings.max_image_width);
    limits.max_image_height = Some(settings.max_image_height);
    limits.max_alloc = Some(settings.max_alloc_bytes);
    reader.limits(limits);

    let format = reader.format();
    let img = reader.decode()?;
    let pixels = img.to_rgb8();
    let (width, height) = pixels.dimensions();

    if width == 0 || height == 0 {
        return Err(PickerError::Decode(format!(
            "decoded dimensions must be positive, got {}x{}",
            width, height
        )));
    }

    log::debug!("decoded {:?} image {}x{} ({} bytes)", format, width, height, data.len());

    Ok(DecodedImage { width, height, pixels })
}
