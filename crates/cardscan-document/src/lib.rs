// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cardscan-document — Image processing for the Cardscan business card scanner.
//
// Provides card detection (Sobel gradients, edge-run rectangle candidates,
// scoring), perspective rectification (linear-system solve and edge
// interpolation, bilinear resampling), and per-pixel brightness/contrast
// enhancement.

pub mod geometry;
pub mod image;
pub mod scan;

/// An RGBA8 raster. Every transform in this crate returns a new one.
pub type RasterImage = ::image::RgbaImage;

// Re-export the primary structs so callers can use `cardscan_document::DocumentDetector` etc.
pub use geometry::resample::{ImageResampler, Rectified, RectifyOutcome, rectify};
pub use geometry::solver::{PerspectiveSolver, PerspectiveTransform};
pub use image::enhance::Enhancement;
pub use image::processor::ImageProcessor;
pub use scan::detect::DocumentDetector;
