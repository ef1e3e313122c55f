// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decode, encode, rotate, crop, and brightness/contrast enhancement.

pub mod enhance;
pub mod processor;

pub use enhance::Enhancement;
pub use processor::ImageProcessor;
