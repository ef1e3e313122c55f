// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Four-point perspective solve via Gaussian elimination with partial pivoting.

use cardscan_core::error::{CardscanError, Result};
use cardscan_core::types::Point;
use tracing::{debug, instrument};

/// Pivots smaller than this, relative to the largest matrix entry, are zero.
const PIVOT_EPSILON: f64 = 1e-10;

/// Eight solved coefficients `h0..h7` (with an implicit `h8 = 1`).
///
/// The system is the usual four-point correspondence:
///
/// ```text
/// u = (h0 x + h1 y + h2) / (h6 x + h7 y + 1)
/// v = (h3 x + h4 y + h5) / (h6 x + h7 y + 1)
/// ```
///
/// [`PerspectiveTransform::map`] evaluates it with the denominator fixed at 1
/// (the "DLT-lite" model). That is exact for parallelograms but only
/// approximates strong perspective, where `h6`/`h7` matter. This is a known
/// limitation of the rectifier; [`PerspectiveTransform::map_projective`]
/// gives the full result for comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    h: [f64; 8],
}

impl PerspectiveTransform {
    pub fn identity() -> Self {
        Self { h: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0] }
    }

    /// All nine coefficients, row-major, `h8 = 1`.
    pub fn coefficients(&self) -> [f64; 9] {
        let h = self.h;
        [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0]
    }

    /// DLT-lite mapping: numerators only, denominator fixed at 1.
    pub fn map(&self, p: Point) -> Point {
        let (x, y) = (p.x as f64, p.y as f64);
        let h = &self.h;
        Point::new(
            (h[0] * x + h[1] * y + h[2]) as f32,
            (h[3] * x + h[4] * y + h[5]) as f32,
        )
    }

    /// Full projective mapping. `None` where the denominator vanishes.
    pub fn map_projective(&self, p: Point) -> Option<Point> {
        let (x, y) = (p.x as f64, p.y as f64);
        let h = &self.h;
        let w = h[6] * x + h[7] * y + 1.0;
        if w.abs() < f64::EPSILON {
            return None;
        }
        Some(Point::new(
            ((h[0] * x + h[1] * y + h[2]) / w) as f32,
            ((h[3] * x + h[4] * y + h[5]) / w) as f32,
        ))
    }
}

/// Solves for the transform carrying four points onto four others.
pub struct PerspectiveSolver;

impl PerspectiveSolver {
    /// Solve for the transform taking each `from[i]` to `to[i]`.
    ///
    /// Fails with [`CardscanError::SolverSingularity`] when either point set
    /// is degenerate (coincident or collinear points).
    #[instrument(skip_all)]
    pub fn solve(from: &[Point; 4], to: &[Point; 4]) -> Result<PerspectiveTransform> {
        // Augmented 8x9 matrix, one row pair per correspondence.
        let mut m = [[0.0f64; 9]; 8];
        for (i, (src, dst)) in from.iter().zip(to).enumerate() {
            let (x, y) = (src.x as f64, src.y as f64);
            let (u, v) = (dst.x as f64, dst.y as f64);
            m[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u, u];
            m[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v, v];
        }

        let h = solve_linear(m)?;
        debug!(?h, "perspective coefficients solved");
        Ok(PerspectiveTransform { h })
    }
}

/// Gaussian elimination with partial pivoting, then back-substitution, on an
/// augmented 8x9 system.
fn solve_linear(mut m: [[f64; 9]; 8]) -> Result<[f64; 8]> {
    const N: usize = 8;

    let scale = m
        .iter()
        .flat_map(|row| row[..N].iter())
        .fold(1.0f64, |acc, v| acc.max(v.abs()));
    let epsilon = PIVOT_EPSILON * scale;

    for col in 0..N {
        // Largest remaining entry in this column becomes the pivot.
        let pivot_row = (col..N)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        let pivot = m[pivot_row][col];
        if pivot.abs() < epsilon {
            return Err(CardscanError::SolverSingularity { column: col, pivot });
        }
        m.swap(col, pivot_row);

        for row in col + 1..N {
            let factor = m[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..=N {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut h = [0.0f64; N];
    for row in (0..N).rev() {
        let tail: f64 = (row + 1..N).map(|k| m[row][k] * h[k]).sum();
        h[row] = (m[row][N] - tail) / m[row][row];
    }
    Ok(h)
}
