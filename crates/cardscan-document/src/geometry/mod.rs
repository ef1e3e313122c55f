// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry — perspective solve and bilinear resampling for keystone correction.

pub mod resample;
pub mod solver;

pub use resample::{ImageResampler, Rectified, RectifyOutcome, rectify};
pub use solver::{PerspectiveSolver, PerspectiveTransform};
