// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keystone mode: four independently draggable corners outlining the card.

use cardscan_core::types::{Corner, ImageSize, Point, Quadrilateral};
use tracing::debug;

use crate::pointer::PointerOutcome;

/// Keystone-mode payload: the live quadrilateral and the corner being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeystoneSession {
    pub quad: Quadrilateral,
    pub drag: Option<Corner>,
}

impl KeystoneSession {
    pub fn new(quad: Quadrilateral) -> Self {
        Self { quad, drag: None }
    }

    /// The corner nearest to `p`, if it lies within `radius`.
    pub fn nearest_corner(&self, p: Point, radius: f32) -> Option<Corner> {
        Corner::ALL
            .into_iter()
            .map(|corner| (corner, self.quad.point(corner).distance_to(p)))
            .filter(|&(_, distance)| distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(corner, _)| corner)
    }

    pub fn pointer_down(&mut self, p: Point, radius: f32) -> PointerOutcome {
        self.drag = self.nearest_corner(p, radius);
        match self.drag {
            Some(corner) => {
                debug!(?corner, x = p.x, y = p.y, "keystone corner grabbed");
                PointerOutcome::Grabbed
            }
            None => PointerOutcome::Ignored,
        }
    }

    /// Move the grabbed corner to `p`, clamped into `[0, W] x [0, H]`.
    pub fn pointer_move(&mut self, p: Point, image: ImageSize) -> PointerOutcome {
        match self.drag {
            Some(corner) => {
                self.quad.set_point(corner, p.clamped(image));
                PointerOutcome::Moved
            }
            None => PointerOutcome::Ignored,
        }
    }

    pub fn pointer_up(&mut self) -> PointerOutcome {
        match self.drag.take() {
            Some(corner) => {
                debug!(?corner, point = ?self.quad.point(corner), "keystone corner released");
                PointerOutcome::Released
            }
            None => PointerOutcome::Ignored,
        }
    }
}
