//! Image registration and click-to-color lookup.
//!
//! A transport layer (HTTP handler, CLI, UI shell) owns one [`ImageRegistry`] and
//! calls the two entry points:
//! - [`register_image`] at upload time
//! - [`sample_color`] for every click on the rendered image

pub mod decoder;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod ripeness;
pub mod sampler;
pub mod settings;

pub use error::{PickerError, Result};
pub use registry::{ImageId, ImageRecord, ImageRegistry, RegisteredImage};
pub use resolver::{DisplayPoint, PixelCoord};
pub use ripeness::{analyze_ripeness, HsvRange, RipenessReport};
pub use sampler::{rgb_to_hsv, ColorReading};
pub use settings::PickerSettings;

/// Decode an uploaded image and store it under a fresh id.
pub fn register_image(registry: &ImageRegistry, data: &[u8]) -> Result<RegisteredImage> {
    registry.register_bytes(data, None)
}

/// Color of the pixel under a click at (`x`, `y`) on an image rendered at
/// `display_width` x `display_height`.
pub fn sample_color(
    registry: &ImageRegistry,
    id: &str,
    x: f64,
    y: f64,
    display_width: f64,
    display_height: f64,
) -> Result<ColorReading> {
    let record = registry.get(id)?;
    let point = DisplayPoint { x, y, display_width, display_height };
    let coord = resolver::resolve(
        &point,
        record.width(),
        record.height(),
        registry.settings().clamp_edge,
    )?;
    sampler::sample(&record, coord)
}
