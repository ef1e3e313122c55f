// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Card detection pipeline — Sobel gradient field, edge-run rectangle
// candidates, candidate scoring, and the detector that ties them together.

pub mod candidates;
pub mod detect;
pub mod gradient;
pub mod scoring;

pub use candidates::{EdgeLine, RectangleCandidateFinder};
pub use detect::DocumentDetector;
pub use gradient::GradientField;
pub use scoring::CandidateScorer;
