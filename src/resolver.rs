//! Display-space to native-pixel coordinate mapping.
//!
//! Origin is the top-left corner in both spaces, x grows rightward and y grows
//! downward. A display point maps to `round(d * native / display)` on each axis.

use serde::{Deserialize, Serialize};
use crate::error::{Result, PickerError};

/// A click as reported by the caller, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
    /// Width the image was rendered at when clicked
    pub display_width: f64,
    /// Height the image was rendered at when clicked
    pub display_height: f64,
}

/// Integer index into the native pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

/// Map `point` onto a `width` x `height` raster.
///
/// Points outside `[0, display_width) x [0, display_height)` are rejected. For points
/// inside, rounding can land at most one step past the last pixel; with `clamp_edge`
/// that step is clamped back onto the last pixel, without it the point is rejected.
pub fn resolve(point: &DisplayPoint, width: u32, height: u32, clamp_edge: bool) -> Result<PixelCoord> {
    let DisplayPoint { x, y, display_width, display_height } = *point;

    // Written so NaN fails the check too
    if !(display_width > 0.0 && display_width.is_finite())
        || !(display_height > 0.0 && display_height.is_finite())
    {
        return Err(PickerError::InvalidDimensions {
            width: display_width,
            height: display_height,
        });
    }

    let out_of_bounds = || PickerError::OutOfBounds {
        x,
        y,
        width: display_width,
        height: display_height,
    };

    if !(x >= 0.0 && x < display_width) || !(y >= 0.0 && y < display_height) {
        return Err(out_of_bounds());
    }

    let rx = resolve_axis(x, display_width, width, clamp_edge).ok_or_else(out_of_bounds)?;
    let ry = resolve_axis(y, display_height, height, clamp_edge).ok_or_else(out_of_bounds)?;

    log::debug!(
        "resolved ({}, {}) on {}x{} display to pixel ({}, {}) of {}x{}",
        x, y, display_width, display_height, rx, ry, width, height
    );

    Ok(PixelCoord { x: rx, y: ry })
}

/// Resolve one axis of a point already known to be inside the display. `None` when
/// the rounded value misses the raster and may not be clamped.
fn resolve_axis(d: f64, display: f64, native: u32, clamp_edge: bool) -> Option<u32> {
    if native == 0 {
        return None;
    }
    let native_f = native as f64;

    // Unscaled display is the identity, no multiply/divide drift
    let raw = if display == native_f {
        d.round()
    } else {
        (d * native_f / display).round()
    };

    // d is in [0, display), so raw is in [0, native]
    let max = native_f - 1.0;
    if raw > max {
        if !clamp_edge || raw - max > 1.0 {
            return None;
        }
        return Some(native - 1);
    }

    Some(raw as u32)
}
