// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, cap size, rotate, crop, enhance, and encode card
// photos. Operates on in-memory RGBA rasters using the `image` and `imageproc`
// crates.

use cardscan_core::error::CardscanError;
use cardscan_core::types::{CropRegion, EncodedImage, ImageFormat, ImageSize};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba};
use imageproc::geometric_transformations::{self, Interpolation};
use tracing::{debug, info, instrument};

use crate::RasterImage;
use crate::image::enhance::Enhancement;

/// Image processing pipeline operating on a single in-memory raster.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed raster, enabling method chaining.
///
/// ```ignore
/// let png = ImageProcessor::from_bytes(&photo)?
///     .cap_longest_edge(2000)
///     .rotate(90.0)
///     .enhance(&Enhancement::new(120.0, 110.0))
///     .encode(ImageFormat::Png, 90)?;
/// ```
pub struct ImageProcessor {
    /// The current working raster.
    image: RasterImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, CardscanError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            CardscanError::Decode(format!("failed to open {}: {}", path.as_ref().display(), err))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img.to_rgba8() })
    }

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, CardscanError> {
        let img = image::load_from_memory(data)
            .map_err(|err| CardscanError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self { image: img.to_rgba8() })
    }

    /// Wrap an already-decoded raster.
    pub fn from_raster(image: RasterImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.image.width(), self.image.height())
    }

    pub fn as_raster(&self) -> &RasterImage {
        &self.image
    }

    pub fn into_raster(self) -> RasterImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Downscale so the longest edge is at most `max_edge`, preserving aspect
    /// ratio. Smaller images pass through untouched.
    #[instrument(skip(self), fields(max_edge))]
    pub fn cap_longest_edge(self, max_edge: u32) -> Self {
        match Self::downscaled(&self.image, max_edge) {
            Some(image) => Self { image },
            None => self,
        }
    }

    /// A copy of `image` scaled so its longest edge is `max_edge`, or `None`
    /// when it already fits (or `max_edge` is 0) and can be used as is.
    pub fn downscaled(image: &RasterImage, max_edge: u32) -> Option<RasterImage> {
        let (width, height) = image.dimensions();
        let longest = width.max(height);
        if longest <= max_edge || max_edge == 0 {
            return None;
        }
        let scale = max_edge as f32 / longest as f32;
        let new_w = ((width as f32 * scale).round() as u32).max(1);
        let new_h = ((height as f32 * scale).round() as u32).max(1);
        info!(from_w = width, from_h = height, new_w, new_h, "Capping image size");
        Some(image::imageops::resize(image, new_w, new_h, FilterType::Triangle))
    }

    /// Rotate the image by an angle in degrees (clockwise).
    ///
    /// Multiples of 90 are lossless and swap the dimensions for quarter turns.
    /// Other angles rotate about the centre with bilinear interpolation, keeping
    /// the canvas size; uncovered corners become transparent white.
    #[instrument(skip(self), fields(degrees))]
    pub fn rotate(self, degrees: f32) -> Self {
        let normalised = degrees.rem_euclid(360.0);
        if normalised.abs() < 0.01 || (normalised - 360.0).abs() < 0.01 {
            return self;
        }

        let dynamic = DynamicImage::ImageRgba8(self.image);
        if (normalised - 90.0).abs() < 0.01 {
            return Self { image: dynamic.rotate90().to_rgba8() };
        }
        if (normalised - 180.0).abs() < 0.01 {
            return Self { image: dynamic.rotate180().to_rgba8() };
        }
        if (normalised - 270.0).abs() < 0.01 {
            return Self { image: dynamic.rotate270().to_rgba8() };
        }

        let rgba = dynamic.to_rgba8();
        let rotated = geometric_transformations::rotate_about_center(
            &rgba,
            degrees.to_radians(),
            Interpolation::Bilinear,
            Rgba([255u8, 255, 255, 0]),
        );
        debug!("General rotation applied");
        Self { image: rotated }
    }

    /// Cut out `region`. The region is already guaranteed to lie inside the
    /// image it was built for; it is clamped again here in case it was built
    /// against a different raster.
    #[instrument(skip(self), fields(x = region.x(), y = region.y(), w = region.width(), h = region.height()))]
    pub fn crop(self, region: &CropRegion) -> Self {
        let (img_w, img_h) = (self.width(), self.height());
        let (x, y, w, h) = region.pixel_rect();

        let safe_x = x.min(img_w.saturating_sub(1));
        let safe_y = y.min(img_h.saturating_sub(1));
        let safe_w = w.min(img_w - safe_x);
        let safe_h = h.min(img_h - safe_y);

        info!(safe_x, safe_y, safe_w, safe_h, "Cropping image");
        let cropped = image::imageops::crop_imm(&self.image, safe_x, safe_y, safe_w, safe_h).to_image();
        Self { image: cropped }
    }

    /// Apply brightness/contrast.
    pub fn enhance(self, enhancement: &Enhancement) -> Self {
        Self { image: enhancement.apply(&self.image) }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode in `format`. `jpeg_quality` (1-100) applies to JPEG only.
    pub fn encode(&self, format: ImageFormat, jpeg_quality: u8) -> Result<EncodedImage, CardscanError> {
        let bytes = match format {
            ImageFormat::Png => self.to_png_bytes()?,
            ImageFormat::Jpeg => self.to_jpeg_bytes(jpeg_quality)?,
        };
        debug!(format = format.mime_type(), len = bytes.len(), "Image encoded");
        Ok(EncodedImage { bytes, format })
    }

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, CardscanError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|err| CardscanError::Encode(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    /// JPEG has no alpha channel, so it is dropped.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, CardscanError> {
        let mut buffer = Vec::new();
        let rgb = DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| CardscanError::Encode(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), CardscanError> {
        self.image.save(path.as_ref()).map_err(|err| {
            CardscanError::Encode(format!("failed to save image to {}: {}", path.as_ref().display(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_core::types::MIN_CROP_SIZE;

    fn gradient(width: u32, height: u32) -> RasterImage {
        RasterImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255]))
    }

    #[test]
    fn crop_yields_exact_region_size() {
        let size = ImageSize::new(200, 150);
        let region = CropRegion::clamped(10.0, 10.0, 100.0, 60.0, size, MIN_CROP_SIZE);
        let out = ImageProcessor::from_raster(gradient(200, 150)).crop(&region);

        assert_eq!((out.width(), out.height()), (100, 60));
        assert_eq!(out.as_raster().get_pixel(0, 0), &Rgba([10, 10, 0, 255]));
    }

    #[test]
    fn cap_longest_edge_preserves_aspect() {
        let out = ImageProcessor::from_raster(gradient(400, 200)).cap_longest_edge(100);
        assert_eq!((out.width(), out.height()), (100, 50));

        let small = ImageProcessor::from_raster(gradient(80, 40)).cap_longest_edge(100);
        assert_eq!((small.width(), small.height()), (80, 40));
    }

    #[test]
    fn downscaled_only_copies_oversized_rasters() {
        assert!(ImageProcessor::downscaled(&gradient(80, 40), 100).is_none());
        assert!(ImageProcessor::downscaled(&gradient(400, 200), 0).is_none());
        let capped = ImageProcessor::downscaled(&gradient(200, 400), 100).unwrap();
        assert_eq!(capped.dimensions(), (50, 100));
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let out = ImageProcessor::from_raster(gradient(30, 20)).rotate(90.0);
        assert_eq!((out.width(), out.height()), (20, 30));

        let back = ImageProcessor::from_raster(gradient(30, 20)).rotate(-90.0);
        assert_eq!((back.width(), back.height()), (20, 30));
    }

    #[test]
    fn arbitrary_rotation_keeps_canvas() {
        let out = ImageProcessor::from_raster(gradient(40, 30)).rotate(15.0);
        assert_eq!((out.width(), out.height()), (40, 30));
    }

    #[test]
    fn png_round_trip_decodes() {
        let original = ImageProcessor::from_raster(gradient(12, 9));
        let encoded = original.encode(ImageFormat::Png, 90).unwrap();
        assert_eq!(encoded.mime_type(), "image/png");

        let decoded = ImageProcessor::from_bytes(&encoded.bytes).unwrap();
        assert_eq!(decoded.as_raster(), original.as_raster());
    }

    #[test]
    fn jpeg_encoding_produces_bytes() {
        let encoded = ImageProcessor::from_raster(gradient(16, 16))
            .encode(ImageFormat::Jpeg, 80)
            .unwrap();
        assert_eq!(encoded.format, ImageFormat::Jpeg);
        assert!(encoded.bytes.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn garbage_bytes_are_a_decode_failure() {
        let result = ImageProcessor::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(CardscanError::Decode(_))));
    }
}
