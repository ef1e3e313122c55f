// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sobel gradient magnitude field.

use tracing::{debug, instrument};

use crate::RasterImage;

/// Per-pixel edge strength, row-major, same dimensions as the source raster.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    width: u32,
    height: u32,
    magnitudes: Vec<f32>,
}

impl GradientField {
    /// Compute the Sobel gradient magnitude of `image`.
    ///
    /// Luma is the plain average of R, G and B. The 1-pixel border, where the
    /// 3x3 kernels cannot be centred, stays at zero.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn compute(image: &RasterImage) -> Self {
        let (width, height) = image.dimensions();
        let (w, h) = (width as usize, height as usize);
        let mut magnitudes = vec![0.0f32; w * h];

        if w < 3 || h < 3 {
            return Self { width, height, magnitudes };
        }

        let luma: Vec<f32> = image
            .pixels()
            .map(|p| (p.0[0] as f32 + p.0[1] as f32 + p.0[2] as f32) / 3.0)
            .collect();

        // Gx: [-1 0 1; -2 0 2; -1 0 1]
        // Gy: [-1 -2 -1; 0 0 0; 1 2 1]
        for y in 1..h - 1 {
            let above = &luma[(y - 1) * w..y * w];
            let row = &luma[y * w..(y + 1) * w];
            let below = &luma[(y + 1) * w..(y + 2) * w];
            for x in 1..w - 1 {
                let gx = (above[x + 1] + 2.0 * row[x + 1] + below[x + 1])
                    - (above[x - 1] + 2.0 * row[x - 1] + below[x - 1]);
                let gy = (below[x - 1] + 2.0 * below[x] + below[x + 1])
                    - (above[x - 1] + 2.0 * above[x] + above[x + 1]);
                magnitudes[y * w + x] = gx.hypot(gy);
            }
        }

        debug!("gradient field computed");
        Self { width, height, magnitudes }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Magnitude at `(x, y)`. Panics when out of range.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.magnitudes[y as usize * self.width as usize + x as usize]
    }

    /// One row of magnitudes.
    pub fn row(&self, y: u32) -> &[f32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.magnitudes[start..start + w]
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    #[test]
    fn uniform_image_has_no_edges() {
        let image = RasterImage::from_pixel(20, 10, Rgba([90, 90, 90, 255]));
        let field = GradientField::compute(&image);
        assert!(field.magnitudes().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn vertical_step_produces_horizontal_gradient() {
        // Left half black, right half white: the step sits between x=4 and x=5.
        let image = RasterImage::from_fn(10, 6, |x, _| {
            if x < 5 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        });
        let field = GradientField::compute(&image);

        // Columns either side of the step see 1 + 2 + 1 = 4 times the contrast.
        assert_eq!(field.get(4, 3), 4.0 * 255.0);
        assert_eq!(field.get(5, 3), 4.0 * 255.0);
        assert_eq!(field.get(2, 3), 0.0);
        assert_eq!(field.get(7, 3), 0.0);
    }

    #[test]
    fn tiny_images_yield_zero_field() {
        let image = RasterImage::from_pixel(2, 5, Rgba([255, 0, 0, 255]));
        let field = GradientField::compute(&image);
        assert_eq!((field.width(), field.height()), (2, 5));
        assert_eq!(field.magnitudes().len(), 10);
        assert!(field.magnitudes().iter().all(|&m| m == 0.0));
    }

    proptest! {
        #[test]
        fn field_matches_dimensions_with_zero_border(
            width in 1u32..24,
            height in 1u32..24,
            seed in any::<u64>(),
        ) {
            let image = RasterImage::from_fn(width, height, |x, y| {
                let v = seed
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add((x as u64) << 16 | y as u64)
                    .rotate_left(17);
                Rgba([v as u8, (v >> 8) as u8, (v >> 16) as u8, 255])
            });
            let field = GradientField::compute(&image);

            prop_assert_eq!((field.width(), field.height()), (width, height));
            prop_assert!(field.magnitudes().iter().all(|&m| m >= 0.0));
            for x in 0..width {
                prop_assert_eq!(field.get(x, 0), 0.0);
                prop_assert_eq!(field.get(x, height - 1), 0.0);
            }
            for y in 0..height {
                prop_assert_eq!(field.get(0, y), 0.0);
                prop_assert_eq!(field.get(width - 1, y), 0.0);
            }
        }
    }
}
