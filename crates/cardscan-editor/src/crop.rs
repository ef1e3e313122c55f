// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop mode: an axis-aligned region with four resize handles and a centre
// move handle.

use cardscan_core::types::{Corner, CropRegion, ImageSize, Point};
use tracing::debug;

use crate::pointer::PointerOutcome;

/// A grabbable part of the crop overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHandle {
    Corner(Corner),
    Center,
}

/// An in-progress crop drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropDrag {
    pub handle: CropHandle,
    /// Pointer position at pointer-down, image pixels.
    pub start: Point,
    /// Region as it was at pointer-down.
    pub origin: CropRegion,
}

/// Crop-mode payload: the live region and the active drag, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSession {
    pub region: CropRegion,
    pub drag: Option<CropDrag>,
}

impl CropSession {
    pub fn new(region: CropRegion) -> Self {
        Self { region, drag: None }
    }

    /// The handle under `p`: corners first (TL, TR, BR, BL), then the centre.
    pub fn hit_test(&self, p: Point, radius: f32) -> Option<CropHandle> {
        Corner::ALL
            .into_iter()
            .find(|&corner| self.region.corner(corner).distance_to(p) <= radius)
            .map(CropHandle::Corner)
            .or_else(|| (self.region.center().distance_to(p) <= radius).then_some(CropHandle::Center))
    }

    pub fn pointer_down(&mut self, p: Point, radius: f32) -> PointerOutcome {
        match self.hit_test(p, radius) {
            Some(handle) => {
                debug!(?handle, x = p.x, y = p.y, "crop handle grabbed");
                self.drag = Some(CropDrag { handle, start: p, origin: self.region });
                PointerOutcome::Grabbed
            }
            None => {
                self.drag = None;
                PointerOutcome::Ignored
            }
        }
    }

    pub fn pointer_move(&mut self, p: Point, image: ImageSize, min_size: f32) -> PointerOutcome {
        let Some(drag) = self.drag else {
            return PointerOutcome::Ignored;
        };

        self.region = match drag.handle {
            CropHandle::Corner(corner) => {
                // The corner keeps its offset from the pointer at grab time.
                let anchor = drag.origin.corner(corner);
                let target = Point::new(anchor.x + p.x - drag.start.x, anchor.y + p.y - drag.start.y);
                resize(&drag.origin, corner, target, image, min_size)
            }
            CropHandle::Center => translate(&drag.origin, p.x - drag.start.x, p.y - drag.start.y, image, min_size),
        };
        PointerOutcome::Moved
    }

    pub fn pointer_up(&mut self) -> PointerOutcome {
        match self.drag.take() {
            Some(_) => {
                debug!(region = ?self.region, "crop drag released");
                PointerOutcome::Released
            }
            None => PointerOutcome::Ignored,
        }
    }
}

/// Drag one corner to `p`, keeping the opposite edges fixed.
///
/// The pointer is clamped into the image and each moving edge stops
/// `min_size` short of its opposite edge.
pub fn resize(region: &CropRegion, corner: Corner, p: Point, image: ImageSize, min_size: f32) -> CropRegion {
    let p = p.clamped(image);
    let min_w = min_size.min(image.width as f32);
    let min_h = min_size.min(image.height as f32);

    let (mut left, mut top, mut right, mut bottom) = (region.x(), region.y(), region.right(), region.bottom());

    match corner {
        Corner::TopLeft | Corner::BottomLeft => left = p.x.min(right - min_w),
        Corner::TopRight | Corner::BottomRight => right = p.x.max(left + min_w),
    }
    match corner {
        Corner::TopLeft | Corner::TopRight => top = p.y.min(bottom - min_h),
        Corner::BottomLeft | Corner::BottomRight => bottom = p.y.max(top + min_h),
    }

    CropRegion::from_edges(left, top, right, bottom, image, min_size)
}

/// Shift `origin` by `(dx, dy)`, keeping its size and holding it inside the image.
pub fn translate(origin: &CropRegion, dx: f32, dy: f32, image: ImageSize, min_size: f32) -> CropRegion {
    CropRegion::clamped(
        origin.x() + dx,
        origin.y() + dy,
        origin.width(),
        origin.height(),
        image,
        min_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const IMAGE: ImageSize = ImageSize { width: 400, height: 300 };

    fn session() -> CropSession {
        CropSession::new(CropRegion::clamped(100.0, 100.0, 200.0, 100.0, IMAGE, 50.0))
    }

    fn assert_inside(region: &CropRegion, image: ImageSize, min_size: f32) {
        assert!(region.x() >= 0.0 && region.y() >= 0.0, "{region:?}");
        assert!(region.right() <= image.width as f32 + 1e-3, "{region:?}");
        assert!(region.bottom() <= image.height as f32 + 1e-3, "{region:?}");
        assert!(region.width() >= min_size.min(image.width as f32) - 1e-3, "{region:?}");
        assert!(region.height() >= min_size.min(image.height as f32) - 1e-3, "{region:?}");
    }

    #[test]
    fn corners_win_over_center() {
        // A tiny region whose centre is also inside the corner radius.
        let s = CropSession::new(CropRegion::clamped(0.0, 0.0, 50.0, 50.0, IMAGE, 50.0));
        assert_eq!(s.hit_test(Point::new(10.0, 10.0), 40.0), Some(CropHandle::Corner(Corner::TopLeft)));
    }

    #[test]
    fn hit_test_finds_each_handle() {
        let s = session();
        assert_eq!(s.hit_test(Point::new(298.0, 103.0), 20.0), Some(CropHandle::Corner(Corner::TopRight)));
        assert_eq!(s.hit_test(Point::new(101.0, 198.0), 20.0), Some(CropHandle::Corner(Corner::BottomLeft)));
        assert_eq!(s.hit_test(Point::new(205.0, 150.0), 20.0), Some(CropHandle::Center));
        assert_eq!(s.hit_test(Point::new(150.0, 120.0), 20.0), None);
    }

    #[test]
    fn top_left_drag_keeps_opposite_edges() {
        let r = resize(&session().region, Corner::TopLeft, Point::new(40.0, 20.0), IMAGE, 50.0);
        assert_eq!((r.x(), r.y(), r.right(), r.bottom()), (40.0, 20.0, 300.0, 200.0));
    }

    #[test]
    fn corner_stops_at_minimum_size() {
        let r = resize(&session().region, Corner::BottomRight, Point::new(0.0, 0.0), IMAGE, 50.0);
        assert_eq!((r.x(), r.y(), r.width(), r.height()), (100.0, 100.0, 50.0, 50.0));
    }

    #[test]
    fn corner_is_clamped_to_image() {
        let r = resize(&session().region, Corner::TopRight, Point::new(900.0, -80.0), IMAGE, 50.0);
        assert_eq!((r.x(), r.y(), r.right(), r.bottom()), (100.0, 0.0, 400.0, 200.0));
    }

    #[test]
    fn off_centre_grab_moves_corner_by_pointer_delta() {
        let image = ImageSize::new(4000, 3000);
        let mut s = CropSession::new(CropRegion::clamped(1000.0, 1000.0, 1000.0, 1000.0, image, 50.0));
        assert_eq!(s.pointer_down(Point::new(1070.0, 1070.0), 120.0), PointerOutcome::Grabbed);

        s.pointer_move(Point::new(1071.0, 1071.0), image, 50.0);
        assert_eq!((s.region.x(), s.region.y()), (1001.0, 1001.0));
        assert_eq!((s.region.right(), s.region.bottom()), (2000.0, 2000.0));

        s.pointer_move(Point::new(1070.0, 1070.0), image, 50.0);
        assert_eq!((s.region.x(), s.region.y()), (1000.0, 1000.0));
    }

    #[test]
    fn center_drag_moves_without_resizing() {
        let mut s = session();
        assert_eq!(s.pointer_down(Point::new(200.0, 150.0), 20.0), PointerOutcome::Grabbed);
        assert_eq!(s.pointer_move(Point::new(230.0, 110.0), IMAGE, 50.0), PointerOutcome::Moved);
        assert_eq!((s.region.x(), s.region.y()), (130.0, 60.0));
        assert_eq!((s.region.width(), s.region.height()), (200.0, 100.0));

        // Past the edge: pinned, size unchanged.
        s.pointer_move(Point::new(900.0, 900.0), IMAGE, 50.0);
        assert_eq!((s.region.x(), s.region.y()), (200.0, 200.0));
        assert_eq!((s.region.width(), s.region.height()), (200.0, 100.0));
    }

    #[test]
    fn release_ends_the_drag() {
        let mut s = session();
        s.pointer_down(Point::new(100.0, 100.0), 20.0);
        assert_eq!(s.pointer_up(), PointerOutcome::Released);
        assert_eq!(s.pointer_move(Point::new(0.0, 0.0), IMAGE, 50.0), PointerOutcome::Ignored);
        assert_eq!(s.pointer_up(), PointerOutcome::Ignored);
    }

    #[test]
    fn miss_does_not_start_a_drag() {
        let mut s = session();
        assert_eq!(s.pointer_down(Point::new(5.0, 290.0), 20.0), PointerOutcome::Ignored);
        assert!(s.drag.is_none());
    }

    proptest! {
        #[test]
        fn region_stays_inside_under_any_drag(
            corner in 0usize..5,
            moves in prop::collection::vec((-500.0f32..900.0, -500.0f32..900.0), 1..12),
        ) {
            let mut s = session();
            let grab = match corner {
                4 => s.region.center(),
                i => s.region.corner(Corner::ALL[i]),
            };
            prop_assert_eq!(s.pointer_down(grab, 20.0), PointerOutcome::Grabbed);
            for (x, y) in moves {
                s.pointer_move(Point::new(x, y), IMAGE, 50.0);
                assert_inside(&s.region, IMAGE, 50.0);
            }
        }

        #[test]
        fn small_images_still_yield_valid_regions(w in 1u32..60, h in 1u32..60, x in -50.0f32..100.0, y in -50.0f32..100.0) {
            let image = ImageSize::new(w, h);
            let full = CropRegion::full(image);
            let r = resize(&full, Corner::BottomRight, Point::new(x, y), image, 50.0);
            assert_inside(&r, image, 50.0);
        }
    }
}
