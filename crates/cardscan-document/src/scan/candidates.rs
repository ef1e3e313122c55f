// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectangle hypotheses from long horizontal and vertical edge runs.

use cardscan_core::types::Quadrilateral;
use tracing::{debug, instrument};

use super::gradient::GradientField;

/// Default gradient magnitude a pixel must exceed to count as an edge.
pub const DEFAULT_EDGE_THRESHOLD: f32 = 50.0;

/// A run must be longer than this fraction of the image extent along it.
const MIN_RUN_FRACTION: f32 = 0.1;

/// Only the strongest few lines per direction are paired up.
const MAX_LINES_PER_AXIS: usize = 4;

const MIN_RECT_WIDTH: f32 = 50.0;
const MIN_RECT_HEIGHT: f32 = 30.0;

/// Direction of an edge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A maximal run of strong-gradient pixels along one row or column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLine {
    pub axis: Axis,
    /// Row for horizontal lines, column for vertical lines.
    pub position: u32,
    /// First pixel of the run along the line.
    pub start: u32,
    /// Last pixel of the run along the line (inclusive).
    pub end: u32,
    /// Mean gradient magnitude over the run.
    pub strength: f32,
}

impl EdgeLine {
    /// Number of pixels in the run.
    pub fn length(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// An axis-aligned rectangle hypothesis, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl CandidateRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn to_quad(&self) -> Quadrilateral {
        Quadrilateral::from_rect(self.left, self.top, self.width(), self.height())
    }
}

/// Finds long edge runs and pairs them into rectangles.
#[derive(Debug, Clone, Copy)]
pub struct RectangleCandidateFinder {
    threshold: f32,
}

impl Default for RectangleCandidateFinder {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_THRESHOLD)
    }
}

impl RectangleCandidateFinder {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Horizontal runs longer than 10% of the width, strongest first.
    pub fn horizontal_lines(&self, field: &GradientField) -> Vec<EdgeLine> {
        let min_len = field.width() as f32 * MIN_RUN_FRACTION;
        let mut lines = Vec::new();
        for y in 0..field.height() {
            collect_runs(
                field.row(y).iter().copied(),
                self.threshold,
                min_len,
                |start, end, strength| {
                    lines.push(EdgeLine { axis: Axis::Horizontal, position: y, start, end, strength })
                },
            );
        }
        sort_by_strength(&mut lines);
        lines
    }

    /// Vertical runs longer than 10% of the height, strongest first.
    pub fn vertical_lines(&self, field: &GradientField) -> Vec<EdgeLine> {
        let min_len = field.height() as f32 * MIN_RUN_FRACTION;
        let mut lines = Vec::new();
        for x in 0..field.width() {
            collect_runs(
                (0..field.height()).map(|y| field.get(x, y)),
                self.threshold,
                min_len,
                |start, end, strength| {
                    lines.push(EdgeLine { axis: Axis::Vertical, position: x, start, end, strength })
                },
            );
        }
        sort_by_strength(&mut lines);
        lines
    }

    /// Pair the strongest horizontal lines with the strongest vertical lines.
    ///
    /// At most 4 lines per direction are used, giving at most 6 x 6 = 36
    /// rectangles. Each takes its top/bottom from the outer rows of a
    /// horizontal pair and its left/right from the outer columns of a vertical
    /// pair. Rectangles smaller than 50x30 are dropped.
    #[instrument(skip_all, fields(width = field.width(), height = field.height(), threshold = self.threshold))]
    pub fn find(&self, field: &GradientField) -> Vec<CandidateRect> {
        let horizontal = self.horizontal_lines(field);
        let vertical = self.vertical_lines(field);
        debug!(horizontal = horizontal.len(), vertical = vertical.len(), "edge lines found");

        let horizontal = &horizontal[..horizontal.len().min(MAX_LINES_PER_AXIS)];
        let vertical = &vertical[..vertical.len().min(MAX_LINES_PER_AXIS)];

        let mut rects = Vec::new();
        for (top, bottom) in pairs(horizontal) {
            for (left, right) in pairs(vertical) {
                let rect = CandidateRect {
                    left: left as f32,
                    top: top as f32,
                    right: right as f32,
                    bottom: bottom as f32,
                };
                if rect.width() >= MIN_RECT_WIDTH && rect.height() >= MIN_RECT_HEIGHT {
                    rects.push(rect);
                }
            }
        }

        debug!(candidates = rects.len(), "rectangle candidates formed");
        rects
    }
}

/// Every unordered pair of line positions, as `(smaller, larger)`.
fn pairs(lines: &[EdgeLine]) -> impl Iterator<Item = (u32, u32)> + '_ {
    lines.iter().enumerate().flat_map(move |(i, a)| {
        lines[i + 1..].iter().map(move |b| {
            (a.position.min(b.position), a.position.max(b.position))
        })
    })
}

/// Report every maximal run of values above `threshold` longer than `min_len`.
fn collect_runs(
    values: impl Iterator<Item = f32>,
    threshold: f32,
    min_len: f32,
    mut emit: impl FnMut(u32, u32, f32),
) {
    let mut run: Option<(u32, f32)> = None;
    let mut last = 0u32;

    let mut flush = |start: u32, end: u32, sum: f32| {
        let len = end - start + 1;
        if len as f32 > min_len {
            emit(start, end, sum / len as f32);
        }
    };

    for (i, value) in values.enumerate() {
        let i = i as u32;
        last = i;
        if value > threshold {
            run = Some(match run {
                Some((start, sum)) => (start, sum + value),
                None => (i, value),
            });
        } else if let Some((start, sum)) = run.take() {
            flush(start, i - 1, sum);
        }
    }
    if let Some((start, sum)) = run {
        flush(start, last, sum);
    }
}

fn sort_by_strength(lines: &mut [EdgeLine]) {
    lines.sort_by(|a, b| b.strength.total_cmp(&a.strength));
}
