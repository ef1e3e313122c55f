// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate scoring — aspect ratio, size, and centredness.

use cardscan_core::types::{CandidateSource, CropRegion, DetectionCandidate, ImageSize, MIN_CROP_SIZE, Quadrilateral};
use tracing::{debug, warn};

use super::candidates::CandidateRect;

/// Width/height of an ISO/IEC 7810 ID-1 card (85.60 x 53.98 mm), rounded.
pub const CARD_ASPECT_RATIO: f32 = 1.6;

/// Confidence assigned to the synthesised fallback candidate.
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

/// The fallback covers this fraction of the limiting image dimension.
const FALLBACK_COVERAGE: f32 = 0.9;

const ASPECT_WEIGHT: f32 = 0.5;
const SIZE_WEIGHT: f32 = 0.3;
const POSITION_WEIGHT: f32 = 0.2;

/// Ranks rectangle hypotheses and picks the best one.
#[derive(Debug, Clone, Copy)]
pub struct CandidateScorer {
    /// A best candidate below this is treated as no detection at all.
    min_confidence: f32,
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl CandidateScorer {
    pub fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }

    /// Score one rectangle against the image it was found in.
    ///
    /// ```text
    /// aspect   = 1 - |w/h - 1.6| / 1.6        (floored at 0)
    /// size     = 1.0 if 10%..=80% of the image area, else 0.5
    /// position = 1 - centroid distance / half-diagonal
    /// score    = 0.5 aspect + 0.3 size + 0.2 position
    /// ```
    ///
    /// A perfect card can overshoot 1.0 by a hair; callers tolerate it.
    pub fn score(&self, rect: &CandidateRect, image: ImageSize) -> f32 {
        let (w, h) = (rect.width(), rect.height());
        if w <= 0.0 || h <= 0.0 {
            return 0.0;
        }

        let aspect = (1.0 - ((w / h) - CARD_ASPECT_RATIO).abs() / CARD_ASPECT_RATIO).max(0.0);

        let area = w * h;
        let image_area = image.area();
        let size = if (0.1 * image_area..=0.8 * image_area).contains(&area) { 1.0 } else { 0.5 };

        let centroid_x = rect.left + w / 2.0;
        let centroid_y = rect.top + h / 2.0;
        let center = image.center();
        let half_diagonal = image.half_diagonal().max(f32::EPSILON);
        let distance = (centroid_x - center.x).hypot(centroid_y - center.y) / half_diagonal;
        let position = 1.0 - distance.min(1.0);

        ASPECT_WEIGHT * aspect + SIZE_WEIGHT * size + POSITION_WEIGHT * position
    }

    /// Pick the highest-scoring rectangle, or the centred fallback when there
    /// is none or the best one scores below the usable threshold.
    pub fn best(&self, rects: &[CandidateRect], image: ImageSize) -> DetectionCandidate {
        let best = rects
            .iter()
            .map(|rect| (rect, self.score(rect, image)))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((rect, confidence)) if confidence >= self.min_confidence => {
                debug!(
                    confidence,
                    left = rect.left,
                    top = rect.top,
                    right = rect.right,
                    bottom = rect.bottom,
                    "best candidate selected"
                );
                let quad = rect.to_quad();
                DetectionCandidate {
                    quad,
                    confidence,
                    region: bounding_region(&quad, image),
                    source: CandidateSource::Detected,
                }
            }
            Some((_, confidence)) => {
                warn!(confidence, min = self.min_confidence, "best candidate below threshold; using fallback");
                fallback(image)
            }
            None => {
                warn!("no rectangle candidates; using fallback");
                fallback(image)
            }
        }
    }
}

/// A centred 1.6:1 rectangle spanning 90% of the limiting image dimension.
pub fn fallback(image: ImageSize) -> DetectionCandidate {
    let (img_w, img_h) = (image.width as f32, image.height as f32);
    let width = img_w.min(img_h * CARD_ASPECT_RATIO) * FALLBACK_COVERAGE;
    let height = width / CARD_ASPECT_RATIO;
    let quad = Quadrilateral::from_rect((img_w - width) / 2.0, (img_h - height) / 2.0, width, height);

    DetectionCandidate {
        quad,
        confidence: FALLBACK_CONFIDENCE,
        region: bounding_region(&quad, image),
        source: CandidateSource::Fallback,
    }
}

/// The crop region enclosing `quad`, clamped into the image.
pub fn bounding_region(quad: &Quadrilateral, image: ImageSize) -> CropRegion {
    let (min_x, min_y, max_x, max_y) = quad.bounds();
    CropRegion::from_edges(min_x, min_y, max_x, max_y, image, MIN_CROP_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: ImageSize = ImageSize { width: 800, height: 500 };

    fn rect(left: f32, top: f32, width: f32, height: f32) -> CandidateRect {
        CandidateRect { left, top, right: left + width, bottom: top + height }
    }

    #[test]
    fn centred_card_scores_high() {
        let score = CandidateScorer::default().score(&rect(100.0, 70.0, 600.0, 360.0), IMAGE);
        // aspect 1 - 0.0667/1.6 = 0.958; size 1.0; position 1.0.
        assert!((score - 0.979).abs() < 0.001, "score {score}");
    }

    #[test]
    fn off_centre_and_oversized_score_lower() {
        let scorer = CandidateScorer::default();
        let centred = scorer.score(&rect(100.0, 70.0, 600.0, 360.0), IMAGE);
        let corner = scorer.score(&rect(0.0, 0.0, 160.0, 100.0), IMAGE);
        let huge = scorer.score(&rect(0.0, 0.0, 800.0, 500.0), IMAGE);
        assert!(corner < centred);
        assert!(huge < centred);
    }

    #[test]
    fn extreme_aspect_never_goes_negative() {
        let score = CandidateScorer::default().score(&rect(0.0, 240.0, 800.0, 20.0), IMAGE);
        assert!(score >= 0.0);
    }

    #[test]
    fn best_picks_highest_confidence() {
        let rects = [rect(0.0, 0.0, 100.0, 100.0), rect(100.0, 70.0, 600.0, 360.0)];
        let best = CandidateScorer::default().best(&rects, IMAGE);
        assert_eq!(best.source, CandidateSource::Detected);
        assert_eq!(best.quad, Quadrilateral::from_rect(100.0, 70.0, 600.0, 360.0));
        assert_eq!(best.region.x(), 100.0);
        assert_eq!(best.region.width(), 600.0);
    }

    #[test]
    fn empty_list_yields_centred_fallback() {
        let candidate = CandidateScorer::default().best(&[], IMAGE);
        assert!(candidate.is_fallback());
        assert_eq!(candidate.confidence, FALLBACK_CONFIDENCE);

        // 800x500 is exactly 1.6:1, so 90% of either dimension.
        assert!((candidate.region.width() - 720.0).abs() < 1e-3);
        assert!((candidate.region.height() - 450.0).abs() < 1e-3);
        assert!((candidate.region.center().x - 400.0).abs() < 1e-3);
        assert!((candidate.region.center().y - 250.0).abs() < 1e-3);
    }

    #[test]
    fn tall_image_fallback_is_width_limited() {
        let candidate = fallback(ImageSize::new(300, 900));
        assert!((candidate.region.width() - 270.0).abs() < 1e-3);
        assert!((candidate.region.height() - 168.75).abs() < 1e-3);
    }

    #[test]
    fn weak_best_candidate_falls_back() {
        let rects = [rect(0.0, 0.0, 60.0, 400.0)];
        let candidate = CandidateScorer::new(0.9).best(&rects, IMAGE);
        assert!(candidate.is_fallback());
    }
}
