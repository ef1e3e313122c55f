// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Card detector — runs gradient, candidate, and scoring stages on a (possibly
// downscaled) copy of the photo and maps the winner back to full resolution.

use cardscan_core::config::DetectionConfig;
use cardscan_core::types::{DetectionCandidate, ImageSize, Point, Quadrilateral};
use tracing::{info, instrument};

use super::candidates::RectangleCandidateFinder;
use super::gradient::GradientField;
use super::scoring::{self, CandidateScorer};
use crate::RasterImage;
use crate::image::processor::ImageProcessor;

/// Locates the most card-like rectangle in a photo.
///
/// Detection never fails: when nothing usable is found the result is the
/// centred fallback candidate (see [`DetectionCandidate::is_fallback`]).
#[derive(Debug, Clone)]
pub struct DocumentDetector {
    config: DetectionConfig,
}

impl Default for DocumentDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl DocumentDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Find the best card candidate in `image`, in `image`'s pixel space.
    ///
    /// ## Pipeline
    ///
    /// 1. Downscale so the longest edge fits `max_detection_edge`
    /// 2. Sobel gradient magnitude
    /// 3. Long horizontal / vertical edge runs, paired into rectangles
    /// 4. Score every rectangle; fall back to a centred card when none is usable
    /// 5. Scale the winner back up to the original resolution
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &RasterImage) -> DetectionCandidate {
        let full = ImageSize::new(image.width(), image.height());

        let capped = ImageProcessor::downscaled(image, self.config.max_detection_edge);
        let working = capped.as_ref().unwrap_or(image);
        let scaled = ImageSize::new(working.width(), working.height());

        let field = GradientField::compute(working);
        let rects = RectangleCandidateFinder::new(self.config.edge_threshold).find(&field);
        let best = CandidateScorer::new(self.config.min_confidence).best(&rects, scaled);

        let candidate = if best.is_fallback() {
            scoring::fallback(full)
        } else if scaled == full {
            best
        } else {
            rescale(&best, scaled, full)
        };

        info!(
            candidates = rects.len(),
            confidence = candidate.confidence,
            fallback = candidate.is_fallback(),
            "Card detection complete"
        );
        candidate
    }
}

/// Map a candidate found at `from` resolution onto `to` resolution.
fn rescale(candidate: &DetectionCandidate, from: ImageSize, to: ImageSize) -> DetectionCandidate {
    let sx = to.width as f32 / from.width as f32;
    let sy = to.height as f32 / from.height as f32;
    let points = candidate.quad.points().map(|p| Point::new(p.x * sx, p.y * sy).clamped(to));
    let quad = Quadrilateral::new(points);

    DetectionCandidate {
        quad,
        confidence: candidate.confidence,
        region: scoring::bounding_region(&quad, to),
        source: candidate.source,
    }
}
