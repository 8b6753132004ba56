//! HSV range masks and tomato ripeness coverage.
//!
//! Each class is a union of inclusive 8-bit HSV boxes. Classes can overlap, so the
//! three percentages need not add up to 100.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::registry::{ImageRecord, ImageRegistry};
use crate::sampler::rgb_to_hsv;

/// Inclusive HSV box on the 8-bit scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }
}

pub const UNRIPE_RANGES: [HsvRange; 3] = [
    HsvRange::new([30, 30, 50], [80, 255, 200]),  // green
    HsvRange::new([0, 0, 100], [180, 50, 200]),   // whitish
    HsvRange::new([0, 30, 100], [15, 100, 200]),  // light red
];

pub const RIPE_RANGES: [HsvRange; 2] = [
    HsvRange::new([0, 50, 50], [10, 255, 255]),    // red
    HsvRange::new([170, 50, 50], [180, 255, 255]), // dark red
];

pub const TRANSITIONAL_RANGES: [HsvRange; 2] = [
    HsvRange::new([15, 50, 50], [30, 255, 255]),  // yellow
    HsvRange::new([0, 20, 100], [20, 80, 255]),   // light red
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RipenessReport {
    pub unripe_pct: f64,
    pub ripe_pct: f64,
    pub transitional_pct: f64,
    pub total_pixels: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    unripe: u64,
    ripe: u64,
    transitional: u64,
}

impl Counts {
    fn merge(self, other: Counts) -> Counts {
        Counts {
            unripe: self.unripe + other.unripe,
            ripe: self.ripe + other.ripe,
            transitional: self.transitional + other.transitional,
        }
    }
}

fn in_any(ranges: &[HsvRange], hsv: [u8; 3]) -> bool {
    ranges.iter().any(|r| r.contains(hsv))
}

fn percent(count: u64, total: u64) -> f64 {
    (count as f64 / total as f64 * 10000.0).round() / 100.0
}

/// Classify every pixel of `record`.
pub fn ripeness_of(record: &ImageRecord) -> RipenessReport {
    let counts = record
        .pixels()
        .as_raw()
        .par_chunks_exact(3)
        .map(|px| {
            let hsv = rgb_to_hsv([px[0], px[1], px[2]]);
            Counts {
                unripe: in_any(&UNRIPE_RANGES, hsv) as u64,
                ripe: in_any(&RIPE_RANGES, hsv) as u64,
                transitional: in_any(&TRANSITIONAL_RANGES, hsv) as u64,
            }
        })
        .reduce(Counts::default, Counts::merge);

    // Records always have positive dimensions
    let total = record.width() as u64 * record.height() as u64;

    RipenessReport {
        unripe_pct: percent(counts.unripe, total),
        ripe_pct: percent(counts.ripe, total),
        transitional_pct: percent(counts.transitional, total),
        total_pixels: total,
    }
}

/// Ripeness coverage of a registered image.
pub fn analyze_ripeness(registry: &ImageRegistry, id: &str) -> Result<RipenessReport> {
    let record = registry.get(id)?;
    let report = ripeness_of(&record);
    log::debug!("ripeness of {}: {:?}", id, report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodedImage;
    use crate::registry::hash_bytes;
    use image::{Rgb, RgbImage};

    fn register(registry: &ImageRegistry, pixels: RgbImage) -> String {
        let (width, height) = pixels.dimensions();
        registry
            .register(DecodedImage { width, height, pixels }, hash_bytes(b"ripeness"))
            .to_string()
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = HsvRange::new([10, 20, 30], [20, 40, 60]);
        assert!(range.contains([10, 20, 30]));
        assert!(range.contains([20, 40, 60]));
        assert!(!range.contains([21, 30, 40]));
        assert!(!range.contains([15, 19, 40]));
    }

    #[test]
    fn test_all_red_is_ripe() {
        let registry = ImageRegistry::new();
        let id = register(&registry, RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
        let report = analyze_ripeness(&registry, &id).unwrap();

        assert_eq!(report.total_pixels, 16);
        assert_eq!(report.ripe_pct, 100.0);
        assert_eq!(report.unripe_pct, 0.0);
        assert_eq!(report.transitional_pct, 0.0);
    }

    #[test]
    fn test_mixed_image_percentages() {
        // 1 green (unripe), 1 red (ripe), 1 black (none)
        let mut pixels = RgbImage::new(3, 1);
        pixels.put_pixel(0, 0, Rgb([0, 180, 0]));
        pixels.put_pixel(1, 0, Rgb([255, 0, 0]));
        let registry = ImageRegistry::new();
        let id = register(&registry, pixels);
        let report = analyze_ripeness(&registry, &id).unwrap();

        assert_eq!(report.unripe_pct, 33.33);
        assert_eq!(report.ripe_pct, 33.33);
        assert_eq!(report.transitional_pct, 0.0);
    }

    #[test]
    fn test_unknown_id() {
        let registry = ImageRegistry::new();
        assert_eq!(analyze_ripeness(&registry, "missing").unwrap_err().kind(), "not_found");
    }
}
