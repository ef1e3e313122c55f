// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Brightness/contrast enhancement applied to every committed card image.

use image::Rgba;
use tracing::{debug, instrument};

use crate::RasterImage;

/// Slider range for brightness and contrast, in percent.
pub const ADJUST_RANGE: std::ops::RangeInclusive<f32> = 50.0..=200.0;

/// Per-pixel brightness then contrast, both expressed in percent (100 = no change).
///
/// Brightness shifts R, G and B by `(brightness - 100) / 100 * 255`; contrast
/// then scales the distance from mid-grey by `contrast / 100`. Channels are
/// clamped to `[0, 255]` and alpha is left alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enhancement {
    brightness: f32,
    contrast: f32,
}

/// Clamp a slider percentage into [`ADJUST_RANGE`].
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        return 100.0;
    }
    value.clamp(*ADJUST_RANGE.start(), *ADJUST_RANGE.end())
}

impl Default for Enhancement {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

impl Enhancement {
    /// Values outside [`ADJUST_RANGE`] are clamped; NaN resets to 100.
    pub fn new(brightness: f32, contrast: f32) -> Self {
        Self {
            brightness: clamp_percent(brightness),
            contrast: clamp_percent(contrast),
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn is_identity(&self) -> bool {
        self.brightness() == 100.0 && self.contrast() == 100.0
    }

    /// Adjust a single channel value.
    pub fn apply_channel(&self, channel: u8) -> u8 {
        let offset = (self.brightness() - 100.0) / 100.0 * 255.0;
        let gain = self.contrast() / 100.0;
        let brightened = channel as f32 + offset;
        let contrasted = (brightened - 128.0) * gain + 128.0;
        contrasted.clamp(0.0, 255.0).round() as u8
    }

    /// Produce an enhanced copy of `image`.
    #[instrument(skip_all, fields(brightness = self.brightness(), contrast = self.contrast()))]
    pub fn apply(&self, image: &RasterImage) -> RasterImage {
        if self.is_identity() {
            return image.clone();
        }

        // Only 256 possible inputs per channel.
        let mut lut = [0u8; 256];
        for (value, slot) in lut.iter_mut().enumerate() {
            *slot = self.apply_channel(value as u8);
        }

        let mut output = image.clone();
        for pixel in output.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            *pixel = Rgba([lut[r as usize], lut[g as usize], lut[b as usize], a]);
        }

        debug!(width = output.width(), height = output.height(), "enhancement applied");
        output
    }
}
