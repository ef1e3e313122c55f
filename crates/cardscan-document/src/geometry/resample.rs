// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keystone rectification — inverse-map every destination pixel into the photo
// and sample it bilinearly.
//
// Two source-mapping strategies exist and they do not agree. The linear-system
// strategy uses the solver's DLT-lite transform; the edge-interpolation
// strategy blends along the quad's top and bottom edges. They coincide for
// parallelograms and drift apart as perspective grows. Neither is treated as
// the reference.

use cardscan_core::config::RectifyStrategy;
use cardscan_core::types::{CropRegion, ImageSize, MIN_CROP_SIZE, Point, Quadrilateral};
use image::Rgba;
use tracing::{debug, info, instrument, warn};

use super::solver::{PerspectiveSolver, PerspectiveTransform};
use crate::RasterImage;
use crate::image::processor::ImageProcessor;

/// Maps a destination pixel position to a source position.
pub trait SourceMapping {
    fn source_point(&self, dest: Point) -> Point;
}

impl SourceMapping for PerspectiveTransform {
    fn source_point(&self, dest: Point) -> Point {
        self.map(dest)
    }
}

/// Bilinear blend of the quad's corners: along the top and bottom edges by
/// `x / width`, then between those by `y / height`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeInterpolation {
    quad: Quadrilateral,
    width: f32,
    height: f32,
}

impl EdgeInterpolation {
    pub fn new(quad: Quadrilateral, width: u32, height: u32) -> Self {
        Self {
            quad,
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }
}

impl SourceMapping for EdgeInterpolation {
    fn source_point(&self, dest: Point) -> Point {
        let [tl, tr, br, bl] = *self.quad.points();
        let u = dest.x / self.width;
        let v = dest.y / self.height;
        let top = tl.lerp(tr, u);
        let bottom = bl.lerp(br, u);
        top.lerp(bottom, v)
    }
}

/// Produces new rasters by sampling a source through a [`SourceMapping`].
pub struct ImageResampler;

impl ImageResampler {
    /// Output size for rectifying `quad`: the longer horizontal edge by the
    /// longer vertical edge, rounded, at least 1x1.
    pub fn output_size(quad: &Quadrilateral) -> (u32, u32) {
        let width = quad.horizontal_extent().round().max(1.0) as u32;
        let height = quad.vertical_extent().round().max(1.0) as u32;
        (width, height)
    }

    /// Fill a `width` x `height` raster by sampling `source` at the mapped
    /// position of every destination pixel. The source is never modified.
    pub fn resample(source: &RasterImage, mapping: &impl SourceMapping, width: u32, height: u32) -> RasterImage {
        if source.width() == 0 || source.height() == 0 {
            return RasterImage::new(width, height);
        }
        RasterImage::from_fn(width, height, |x, y| {
            let src = mapping.source_point(Point::new(x as f32, y as f32));
            Self::sample_bilinear(source, src)
        })
    }

    /// Blend the four pixels around `p`, clamping at the image border.
    pub fn sample_bilinear(source: &RasterImage, p: Point) -> Rgba<u8> {
        let max_x = (source.width() - 1) as f32;
        let max_y = (source.height() - 1) as f32;
        let x = if p.x.is_nan() { 0.0 } else { p.x.clamp(0.0, max_x) };
        let y = if p.y.is_nan() { 0.0 } else { p.y.clamp(0.0, max_y) };

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as u32, y0 as u32);
        let x1 = (x0 + 1).min(source.width() - 1);
        let y1 = (y0 + 1).min(source.height() - 1);

        let p00 = source.get_pixel(x0, y0).0;
        let p10 = source.get_pixel(x1, y0).0;
        let p01 = source.get_pixel(x0, y1).0;
        let p11 = source.get_pixel(x1, y1).0;

        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
            let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        Rgba(out)
    }
}

/// How a rectification was actually carried out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RectifyOutcome {
    /// The quad was warped to a rectangle with the given strategy.
    Warped(RectifyStrategy),
    /// The quad was degenerate; its bounding box was cropped instead.
    BoundingBoxFallback(CropRegion),
}

/// A rectified raster and how it was produced.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub image: RasterImage,
    pub outcome: RectifyOutcome,
}

/// Warp the region of `source` outlined by `quad` into an upright rectangle.
///
/// Non-convex and self-intersecting quads are accepted and warped as given
/// (with a warning). A degenerate quad that the linear system cannot solve
/// falls back to an axis-aligned crop of its bounding box; this never fails.
#[instrument(skip(source), fields(width = source.width(), height = source.height()))]
pub fn rectify(source: &RasterImage, quad: &Quadrilateral, strategy: RectifyStrategy) -> Rectified {
    if !quad.is_convex() {
        warn!(?quad, "quadrilateral is not convex; output will be distorted");
    }

    let (out_w, out_h) = ImageResampler::output_size(quad);
    let image = match strategy {
        RectifyStrategy::LinearSystem => {
            let dest = Quadrilateral::from_rect(0.0, 0.0, out_w as f32, out_h as f32);
            match PerspectiveSolver::solve(dest.points(), quad.points()) {
                Ok(transform) => ImageResampler::resample(source, &transform, out_w, out_h),
                Err(err) => {
                    warn!(error = %err, "perspective solve failed; cropping bounding box instead");
                    return bounding_box_fallback(source, quad);
                }
            }
        }
        RectifyStrategy::EdgeInterpolation => {
            let mapping = EdgeInterpolation::new(*quad, out_w, out_h);
            ImageResampler::resample(source, &mapping, out_w, out_h)
        }
    };

    info!(out_w, out_h, ?strategy, "Perspective correction applied");
    Rectified { image, outcome: RectifyOutcome::Warped(strategy) }
}

fn bounding_box_fallback(source: &RasterImage, quad: &Quadrilateral) -> Rectified {
    let (min_x, min_y, max_x, max_y) = quad.bounds();
    let size = ImageSize::new(source.width(), source.height());
    let region = CropRegion::from_edges(min_x, min_y, max_x, max_y, size, MIN_CROP_SIZE);
    debug!(?region, "bounding box fallback region");

    let image = ImageProcessor::from_raster(source.clone()).crop(&region).into_raster();
    Rectified { image, outcome: RectifyOutcome::BoundingBoxFallback(region) }
}
