//! Pixel sampling and RGB -> HSV conversion.
//!
//! HSV uses the common 8-bit raster convention: hue is the 0-360 degree angle halved
//! into `[0, 180)`, saturation and value are scaled to `[0, 255]`. The conversion is
//! the 12-bit fixed-point one OpenCV uses for `COLOR_RGB2HSV` on 8-bit images, so
//! thresholds tuned against OpenCV output apply unchanged.

use serde::{Deserialize, Serialize};
use crate::error::{Result, PickerError};
use crate::registry::ImageRecord;
use crate::resolver::PixelCoord;
use crate::ripeness::HsvRange;

/// Hue steps on the 8-bit scale (hue degrees / 2)
pub const HUE_STEPS: i32 = 180;

const HSV_SHIFT: u32 = 12;
const HSV_HALF: i32 = 1 << (HSV_SHIFT - 1);

/// Color at one pixel, in both representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorReading {
    pub rgb: [u8; 3],
    pub hsv: [u8; 3],
    /// Native pixel the reading was taken from
    pub coordinates: PixelCoord,
}

impl ColorReading {
    /// Threshold pair for building a mask around this color: from the reading
    /// itself up to full saturation and value at the same hue.
    pub fn suggested_range(&self) -> HsvRange {
        HsvRange::new(self.hsv, [self.hsv[0], 255, 255])
    }
}

// ============================================================================
// COLOR SPACE CONVERSION
// ============================================================================

/// `round(n / d)` for positive operands; none of the table entries sit on a tie.
const fn div_round(n: i32, d: i32) -> i32 {
    (2 * n + d) / (2 * d)
}

/// `(255 << 12) / v`, indexed by value
const SDIV_TABLE: [i32; 256] = {
    let mut table = [0; 256];
    let mut i = 1;
    while i < 256 {
        table[i] = div_round(255 << HSV_SHIFT, i as i32);
        i += 1;
    }
    table
};

/// `(180 << 12) / (6 * diff)`, indexed by chroma
const HDIV_TABLE: [i32; 256] = {
    let mut table = [0; 256];
    let mut i = 1;
    while i < 256 {
        table[i] = div_round(HUE_STEPS << HSV_SHIFT, 6 * i as i32);
        i += 1;
    }
    table
};

/// Convert an 8-bit RGB triple to 8-bit HSV (hue in `[0, 180)`).
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(i32::from);
    let v = r.max(g).max(b);
    let diff = v - r.min(g).min(b);

    // Achromatic: diff is 0 and so is its table entry, giving hue 0
    let s = (diff * SDIV_TABLE[v as usize] + HSV_HALF) >> HSV_SHIFT;

    // Red wins ties with green, green wins ties with blue
    let sector = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    // Arithmetic shift floors negative sectors just below red
    let mut h = (sector * HDIV_TABLE[diff as usize] + HSV_HALF) >> HSV_SHIFT;
    if h < 0 {
        h += HUE_STEPS;
    }

    [h as u8, s as u8, v as u8]
}

// ============================================================================
// SAMPLING
// ============================================================================

/// Read the pixel at `coord`. Pure: the same record and coordinate always give the same reading.
pub fn sample(record: &ImageRecord, coord: PixelCoord) -> Result<ColorReading> {
    let (width, height) = (record.width(), record.height());
    if coord.x >= width || coord.y >= height {
        log::warn!(
            "sample at ({}, {}) outside {}x{} image {}",
            coord.x, coord.y, width, height, record.id()
        );
        return Err(PickerError::Invariant(format!(
            "pixel ({}, {}) outside {}x{} image",
            coord.x, coord.y, width, height
        )));
    }

    // Buffer is stored in RGB order already
    let rgb = record.pixels().get_pixel(coord.x, coord.y).0;

    Ok(ColorReading {
        rgb,
        hsv: rgb_to_hsv(rgb),
        coordinates: coord,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodedImage;
    use crate::registry::{hash_bytes, ImageRegistry};
    use image::{Rgb, RgbImage};

    #[test]
    fn test_hsv_reference_values() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([255, 255, 0]), [30, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 255]), [90, 255, 255]);
        assert_eq!(rgb_to_hsv([255, 0, 255]), [150, 255, 255]);
    }

    #[test]
    fn test_hsv_achromatic() {
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn test_hsv_partial_saturation() {
        assert_eq!(rgb_to_hsv([100, 80, 60]), [15, 102, 100]);
        // Exact value is 127.5; the 12-bit table entry for 200 truncates it to 127
        assert_eq!(rgb_to_hsv([200, 100, 100]), [0, 127, 200]);
    }

    #[test]
    fn test_hsv_fixed_point_hue_steps() {
        // Both sit near 120 where float rounding and the 12-bit tables disagree
        assert_eq!(rgb_to_hsv([0, 1, 58])[0], 120);
        assert_eq!(rgb_to_hsv([0, 1, 61])[0], 119);
        assert_eq!(rgb_to_hsv([200, 150, 100]), [15, 127, 200]);
        assert_eq!(rgb_to_hsv([30, 200, 90]), [71, 217, 200]);
    }

    #[test]
    fn test_hue_wraps_below_180() {
        // A hair below red rounds to 0, not 180
        assert_eq!(rgb_to_hsv([255, 0, 1])[0], 0);
        // A wider offset below red lands on the top step
        assert_eq!(rgb_to_hsv([255, 0, 5])[0], 179);
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(17) {
                for b in (0..=255u16).step_by(17) {
                    let hsv = rgb_to_hsv([r as u8, g as u8, b as u8]);
                    assert!(hsv[0] < 180, "hue {} for ({}, {}, {})", hsv[0], r, g, b);
                }
            }
        }
    }

    fn registered(pixels: RgbImage) -> std::sync::Arc<ImageRecord> {
        let registry = ImageRegistry::new();
        let (width, height) = pixels.dimensions();
        let id = registry.register(DecodedImage { width, height, pixels }, hash_bytes(b"sampler"));
        registry.get(id.as_str()).unwrap()
    }

    #[test]
    fn test_sample_reads_rgb_order() {
        let mut pixels = RgbImage::new(2, 2);
        pixels.put_pixel(1, 0, Rgb([255, 0, 0]));
        pixels.put_pixel(0, 1, Rgb([0, 0, 255]));
        let record = registered(pixels);

        let red = sample(&record, PixelCoord { x: 1, y: 0 }).unwrap();
        assert_eq!(red.rgb, [255, 0, 0]);
        assert_eq!(red.hsv, [0, 255, 255]);
        assert_eq!(red.coordinates, PixelCoord { x: 1, y: 0 });

        let blue = sample(&record, PixelCoord { x: 0, y: 1 }).unwrap();
        assert_eq!(blue.rgb, [0, 0, 255]);
        assert_eq!(blue.hsv, [120, 255, 255]);
    }

    #[test]
    fn test_sample_outside_raster_is_invariant_error() {
        let record = registered(RgbImage::new(3, 3));
        let err = sample(&record, PixelCoord { x: 3, y: 0 }).unwrap_err();
        assert_eq!(err.kind(), "invariant");
    }

    #[test]
    fn test_suggested_range() {
        let reading = ColorReading {
            rgb: [200, 150, 100],
            hsv: [15, 128, 200],
            coordinates: PixelCoord { x: 0, y: 0 },
        };
        let range = reading.suggested_range();
        assert_eq!(range, HsvRange::new([15, 128, 200], [15, 255, 255]));
        assert!(range.contains(reading.hsv));
    }
}
