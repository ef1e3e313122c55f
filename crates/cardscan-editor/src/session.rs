// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EditorState — one editing session over a captured card photo.
//
// Geometry lives in working-raster pixels. The working raster is the source
// with any rotation already committed by leaving Adjust mode. Each mode owns
// the geometry it edits while active; switching modes parks that geometry on
// the session so it comes back unchanged when the mode is re-entered.

use cardscan_core::config::EditorConfig;
use cardscan_core::types::{Corner, CropRegion, DetectionCandidate, ImageSize, Point, Quadrilateral};
use cardscan_document::{DocumentDetector, Enhancement, ImageProcessor, RasterImage, RectifyOutcome, rectify};
use tracing::{debug, info, instrument};

use crate::crop::CropSession;
use crate::keystone::KeystoneSession;
use crate::mode::{Adjustments, EditorMode, ModeKind};
use crate::pointer::{PointerEvent, PointerOutcome, PointerPhase, Viewport};

/// The geometric operation a commit applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommittedGeometry {
    /// Adjust mode: rotation about the centre, in degrees.
    Rotated(f32),
    /// Crop mode: the axis-aligned region that was clipped.
    Cropped(CropRegion),
    /// Keystone mode: the outlined quad and how rectification went.
    Rectified { quad: Quadrilateral, outcome: RectifyOutcome },
}

/// Output of [`EditorState::commit`].
#[derive(Debug, Clone)]
pub struct CommitResult {
    pub image: RasterImage,
    pub geometry: CommittedGeometry,
    pub enhancement: Enhancement,
    /// Total clockwise rotation applied to the source, degrees.
    pub rotation: f32,
}

/// An interactive editing session.
#[derive(Debug, Clone)]
pub struct EditorState {
    source: RasterImage,
    working: RasterImage,
    turned: f32,
    size: ImageSize,
    detection: DetectionCandidate,
    config: EditorConfig,
    adjustments: Adjustments,
    mode: EditorMode,
    crop: CropRegion,
    quad: Quadrilateral,
}

impl EditorState {
    // -- Construction --------------------------------------------------------

    /// Start a session in Adjust mode, seeding the crop region and keystone
    /// quad from `detection`.
    pub fn open(source: RasterImage, detection: DetectionCandidate, config: EditorConfig) -> Self {
        let size = ImageSize::new(source.width(), source.height());

        let region = detection.region;
        let crop = CropRegion::clamped(region.x(), region.y(), region.width(), region.height(), size, config.min_crop_size);
        let quad = Quadrilateral::new(detection.quad.points().map(|p| p.clamped(size)));

        info!(
            width = size.width,
            height = size.height,
            confidence = detection.confidence,
            fallback = detection.is_fallback(),
            "Editor session opened"
        );

        Self {
            working: source.clone(),
            source,
            turned: 0.0,
            size,
            detection,
            config,
            adjustments: Adjustments::default(),
            mode: EditorMode::Adjust,
            crop,
            quad,
        }
    }

    /// Run `detector` over `source` and open a session seeded with its result.
    pub fn open_detected(source: RasterImage, detector: &DocumentDetector, config: EditorConfig) -> Self {
        let detection = detector.detect(&source);
        Self::open(source, detection, config)
    }

    // -- Accessors -----------------------------------------------------------

    pub fn source(&self) -> &RasterImage {
        &self.source
    }

    /// The raster geometry is positioned on.
    pub fn working(&self) -> &RasterImage {
        &self.working
    }

    pub fn image_size(&self) -> ImageSize {
        self.size
    }

    pub fn detection(&self) -> &DetectionCandidate {
        &self.detection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    /// Current crop region, live if Crop mode is active.
    pub fn crop_region(&self) -> CropRegion {
        match &self.mode {
            EditorMode::Crop(session) => session.region,
            _ => self.crop,
        }
    }

    /// Current keystone quad, live if Keystone mode is active.
    pub fn quadrilateral(&self) -> Quadrilateral {
        match &self.mode {
            EditorMode::Keystone(session) => session.quad,
            _ => self.quad,
        }
    }

    // -- Mode switching ------------------------------------------------------

    /// Switch tools. Any drag in progress is dropped; geometry is kept.
    ///
    /// Leaving Adjust commits its rotation to the working raster, turning the
    /// crop region, keystone quad and detection with it.
    pub fn set_mode(&mut self, kind: ModeKind) {
        if kind == self.mode.kind() {
            return;
        }
        self.bake_rotation();
        self.park();
        self.enter(kind);
        info!(mode = kind.label(), "Editor mode changed");
    }

    fn enter(&mut self, kind: ModeKind) {
        self.mode = match kind {
            ModeKind::Adjust => EditorMode::Adjust,
            ModeKind::Crop => EditorMode::Crop(CropSession::new(self.crop)),
            ModeKind::Keystone => EditorMode::Keystone(KeystoneSession::new(self.quad)),
        };
    }

    fn park(&mut self) {
        match &self.mode {
            EditorMode::Adjust => {}
            EditorMode::Crop(session) => self.crop = session.region,
            EditorMode::Keystone(session) => self.quad = session.quad,
        }
    }

    /// Apply the pending rotation to the working raster and carry all
    /// geometry into the turned pixel space.
    fn bake_rotation(&mut self) {
        let degrees = self.adjustments.rotation();
        if degrees.abs() < 0.01 {
            return;
        }
        self.park();

        let before = self.size;
        let raster = std::mem::replace(&mut self.working, RasterImage::new(0, 0));
        self.working = ImageProcessor::from_raster(raster).rotate(degrees).into_raster();
        let after = ImageSize::new(self.working.width(), self.working.height());
        let min_size = self.config.min_crop_size;

        self.crop = turn_region(&self.crop, degrees, before, after, min_size);
        self.quad = turn_quad(&self.quad, degrees, before, after);
        self.detection.quad = turn_quad(&self.detection.quad, degrees, before, after);
        self.detection.region = turn_region(&self.detection.region, degrees, before, after, min_size);
        self.size = after;
        self.turned += degrees;
        self.adjustments.reset_rotation();
        self.enter(self.mode.kind());

        info!(degrees, width = after.width, height = after.height, "Rotation applied to working image");
    }

    // -- Pointer input -------------------------------------------------------

    /// Feed one pointer/touch event, positioned in `viewport` display space.
    pub fn handle_pointer(&mut self, event: &PointerEvent, viewport: &Viewport) -> PointerOutcome {
        let p = viewport.to_image(event.position);
        let radius = viewport.hit_radius(&self.config, event.device);
        let (size, min_size) = (self.size, self.config.min_crop_size);

        let outcome = match (&mut self.mode, event.phase) {
            (EditorMode::Adjust, _) => PointerOutcome::Ignored,
            (EditorMode::Crop(session), PointerPhase::Down) => session.pointer_down(p, radius),
            (EditorMode::Crop(session), PointerPhase::Move) => session.pointer_move(p, size, min_size),
            (EditorMode::Crop(session), PointerPhase::Up) => session.pointer_up(),
            (EditorMode::Keystone(session), PointerPhase::Down) => session.pointer_down(p, radius),
            (EditorMode::Keystone(session), PointerPhase::Move) => session.pointer_move(p, size),
            (EditorMode::Keystone(session), PointerPhase::Up) => session.pointer_up(),
        };
        if outcome != PointerOutcome::Ignored {
            debug!(?outcome, x = p.x, y = p.y, radius, "pointer");
        }
        outcome
    }

    // -- Direct edits --------------------------------------------------------

    /// Replace the crop region (clamped into the image).
    pub fn set_crop_region(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let region = CropRegion::clamped(x, y, width, height, self.size, self.config.min_crop_size);
        self.crop = region;
        if let EditorMode::Crop(session) = &mut self.mode {
            *session = CropSession::new(region);
        }
    }

    /// Replace the keystone quad (corners clamped into the image).
    pub fn set_quadrilateral(&mut self, quad: Quadrilateral) {
        let size = self.size;
        let quad = Quadrilateral::new(quad.points().map(|p| p.clamped(size)));
        self.quad = quad;
        if let EditorMode::Keystone(session) = &mut self.mode {
            *session = KeystoneSession::new(quad);
        }
    }

    /// Move one keystone corner (clamped into the image).
    pub fn set_corner(&mut self, corner: Corner, point: Point) {
        let mut quad = self.quadrilateral();
        quad.set_point(corner, point);
        self.set_quadrilateral(quad);
    }

    /// Put crop and keystone geometry back to what detection found.
    pub fn reset_geometry(&mut self) {
        let region = self.detection.region;
        self.set_crop_region(region.x(), region.y(), region.width(), region.height());
        self.set_quadrilateral(self.detection.quad);
    }

    /// Set the rotation. Outside Adjust mode it is applied straight away.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.adjustments.set_rotation(degrees);
        self.settle_rotation();
    }

    pub fn rotate_quarter(&mut self, clockwise: bool) {
        self.adjustments.rotate_quarter(clockwise);
        self.settle_rotation();
    }

    fn settle_rotation(&mut self) {
        if self.mode.kind() != ModeKind::Adjust {
            self.bake_rotation();
        }
    }

    pub fn reset_rotation(&mut self) {
        self.adjustments.reset_rotation();
    }

    pub fn set_brightness(&mut self, percent: f32) {
        self.adjustments.set_brightness(percent);
    }

    pub fn set_contrast(&mut self, percent: f32) {
        self.adjustments.set_contrast(percent);
    }

    pub fn reset_adjustments(&mut self) {
        self.adjustments.reset();
    }

    // -- Output --------------------------------------------------------------

    /// The raster a front-end should draw under its overlay.
    ///
    /// Adjust mode shows the pending rotation and tone; Crop and Keystone
    /// show the working raster their handles are positioned on, with tone.
    pub fn preview(&self) -> RasterImage {
        let processor = ImageProcessor::from_raster(self.working.clone());
        let processor = match self.mode {
            EditorMode::Adjust => processor.rotate(self.adjustments.rotation()),
            _ => processor,
        };
        processor.enhance(&self.adjustments.enhancement()).into_raster()
    }

    /// Apply the active mode's operation and end the session.
    ///
    /// All modes start from the working raster, so a rotation set in Adjust
    /// before switching tools is kept.
    ///
    /// * Adjust: rotate, then brightness/contrast.
    /// * Crop: brightness/contrast, then clip to the region.
    /// * Keystone: brightness/contrast, then rectify the quad with the
    ///   configured strategy. A degenerate quad falls back to its bounding box.
    #[instrument(skip_all, fields(mode = self.mode.kind().label()))]
    pub fn commit(self) -> CommitResult {
        let enhancement = self.adjustments.enhancement();
        let mut rotation = self.turned;
        let (image, geometry) = match self.mode {
            EditorMode::Adjust => {
                let degrees = self.adjustments.rotation();
                rotation += degrees;
                let image = ImageProcessor::from_raster(self.working)
                    .rotate(degrees)
                    .enhance(&enhancement)
                    .into_raster();
                (image, CommittedGeometry::Rotated(degrees))
            }
            EditorMode::Crop(session) => {
                let image = ImageProcessor::from_raster(self.working)
                    .enhance(&enhancement)
                    .crop(&session.region)
                    .into_raster();
                (image, CommittedGeometry::Cropped(session.region))
            }
            EditorMode::Keystone(session) => {
                let filtered = enhancement.apply(&self.working);
                let rectified = rectify(&filtered, &session.quad, self.config.strategy);
                let geometry = CommittedGeometry::Rectified { quad: session.quad, outcome: rectified.outcome };
                (rectified.image, geometry)
            }
        };

        info!(width = image.width(), height = image.height(), rotation, ?geometry, "Edit committed");
        CommitResult { image, geometry, enhancement, rotation }
    }

    /// Abandon the session, handing back the untouched source raster.
    pub fn cancel(self) -> RasterImage {
        info!("Edit cancelled");
        self.source
    }
}

/// Where `p` lands when a `before`-sized raster is turned clockwise by
/// `degrees` into an `after`-sized one.
fn turn_point(p: Point, degrees: f32, before: ImageSize, after: ImageSize) -> Point {
    let (w, h) = (before.width as f32, before.height as f32);
    let normalised = degrees.rem_euclid(360.0);
    let near = |quarter: f32| (normalised - quarter).abs() < 0.01;

    if near(90.0) {
        Point::new(h - p.y, p.x)
    } else if near(180.0) {
        Point::new(w - p.x, h - p.y)
    } else if near(270.0) {
        Point::new(p.y, w - p.x)
    } else {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (from, to) = (before.center(), after.center());
        let (dx, dy) = (p.x - from.x, p.y - from.y);
        Point::new(to.x + dx * cos - dy * sin, to.y + dx * sin + dy * cos)
    }
}

/// Turn every corner, then relabel so `TopLeft` stays the visually top-left
/// one.
fn turn_quad(quad: &Quadrilateral, degrees: f32, before: ImageSize, after: ImageSize) -> Quadrilateral {
    let turned = quad.points().map(|p| turn_point(p, degrees, before, after).clamped(after));
    let shift = ((degrees / 90.0).round() as i32).rem_euclid(4) as usize;
    Quadrilateral::new(std::array::from_fn(|i| turned[(i + 4 - shift) % 4]))
}

/// The region enclosing `region` once turned.
fn turn_region(region: &CropRegion, degrees: f32, before: ImageSize, after: ImageSize, min_size: f32) -> CropRegion {
    let corners = Corner::ALL.map(|corner| turn_point(region.corner(corner), degrees, before, after));
    let (left, top, right, bottom) = Quadrilateral::new(corners).bounds();
    CropRegion::from_edges(left, top, right, bottom, after, min_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_core::config::RectifyStrategy;
    use cardscan_core::types::CandidateSource;
    use image::Rgba;

    fn grey(width: u32, height: u32, level: u8) -> RasterImage {
        RasterImage::from_pixel(width, height, Rgba([level, level, level, 255]))
    }

    fn candidate(x: f32, y: f32, w: f32, h: f32, size: ImageSize) -> DetectionCandidate {
        DetectionCandidate {
            quad: Quadrilateral::from_rect(x, y, w, h),
            confidence: 0.9,
            region: CropRegion::clamped(x, y, w, h, size, 50.0),
            source: CandidateSource::Detected,
        }
    }

    fn session(width: u32, height: u32) -> EditorState {
        let size = ImageSize::new(width, height);
        EditorState::open(grey(width, height, 100), candidate(20.0, 20.0, 120.0, 80.0, size), EditorConfig::default())
    }

    #[test]
    fn opens_in_adjust_seeded_from_detection() {
        let s = session(200, 150);
        assert_eq!(s.mode_kind(), ModeKind::Adjust);
        assert_eq!(s.crop_region(), CropRegion::clamped(20.0, 20.0, 120.0, 80.0, s.image_size(), 50.0));
        assert_eq!(s.quadrilateral(), Quadrilateral::from_rect(20.0, 20.0, 120.0, 80.0));
    }

    #[test]
    fn adjust_mode_ignores_pointer() {
        let mut s = session(200, 150);
        let viewport = Viewport::unscaled(s.image_size());
        assert_eq!(s.handle_pointer(&PointerEvent::down(20.0, 20.0), &viewport), PointerOutcome::Ignored);
        assert_eq!(s.handle_pointer(&PointerEvent::moved(60.0, 60.0), &viewport), PointerOutcome::Ignored);
        assert_eq!(s.quadrilateral().point(Corner::TopLeft), Point::new(20.0, 20.0));
    }

    #[test]
    fn crop_commit_produces_region_sized_output() {
        let mut s = session(200, 150);
        s.set_mode(ModeKind::Crop);
        s.set_crop_region(10.0, 10.0, 100.0, 60.0);

        let result = s.commit();
        assert_eq!(result.image.dimensions(), (100, 60));
        assert_eq!(result.geometry, CommittedGeometry::Cropped(CropRegion::clamped(10.0, 10.0, 100.0, 60.0, ImageSize::new(200, 150), 50.0)));
    }

    #[test]
    fn scaled_display_drags_in_image_pixels() {
        let mut s = session(200, 150);
        s.set_mode(ModeKind::Keystone);
        // Shown at half size: display (10, 10) is image (20, 20).
        let viewport = Viewport::new(100.0, 75.0, s.image_size());

        assert_eq!(s.handle_pointer(&PointerEvent::down(10.0, 10.0), &viewport), PointerOutcome::Grabbed);
        assert_eq!(s.handle_pointer(&PointerEvent::moved(5.0, 15.0), &viewport), PointerOutcome::Moved);
        assert_eq!(s.handle_pointer(&PointerEvent::up(5.0, 15.0), &viewport), PointerOutcome::Released);
        assert_eq!(s.quadrilateral().point(Corner::TopLeft), Point::new(10.0, 30.0));
    }

    #[test]
    fn touch_reaches_further_than_mouse() {
        let mut s = session(200, 150);
        s.set_mode(ModeKind::Keystone);
        let viewport = Viewport::unscaled(s.image_size());
        // 25 px from the top-left corner: outside 20, inside 30.
        let mouse = PointerEvent::down(45.0, 20.0);
        let touch = mouse.with_device(crate::pointer::DeviceKind::Touch);

        assert_eq!(s.handle_pointer(&mouse, &viewport), PointerOutcome::Ignored);
        assert_eq!(s.handle_pointer(&touch, &viewport), PointerOutcome::Grabbed);
    }

    #[test]
    fn switching_modes_keeps_geometry_and_drops_drag() {
        let mut s = session(200, 150);
        let viewport = Viewport::unscaled(s.image_size());
        s.set_mode(ModeKind::Crop);
        s.handle_pointer(&PointerEvent::down(140.0, 100.0), &viewport);
        s.handle_pointer(&PointerEvent::moved(180.0, 130.0), &viewport);
        let edited = s.crop_region();
        assert!(s.mode().is_dragging());

        s.set_mode(ModeKind::Keystone);
        s.set_mode(ModeKind::Crop);
        assert_eq!(s.crop_region(), edited);
        assert!(!s.mode().is_dragging());
        assert_eq!((edited.right(), edited.bottom()), (180.0, 130.0));
    }

    #[test]
    fn keystone_commit_of_degenerate_quad_falls_back() {
        let mut s = session(200, 150);
        s.set_mode(ModeKind::Keystone);
        s.set_quadrilateral(Quadrilateral::new([
            Point::new(50.0, 50.0),
            Point::new(50.0, 50.0),
            Point::new(50.0, 50.0),
            Point::new(150.0, 120.0),
        ]));

        let result = s.commit();
        assert_eq!(result.image.dimensions(), (100, 70));
        assert!(matches!(
            result.geometry,
            CommittedGeometry::Rectified { outcome: RectifyOutcome::BoundingBoxFallback(_), .. }
        ));
    }

    #[test]
    fn keystone_commit_warps_with_configured_strategy() {
        let size = ImageSize::new(200, 150);
        let config = EditorConfig { strategy: RectifyStrategy::EdgeInterpolation, ..EditorConfig::default() };
        let mut s = EditorState::open(grey(200, 150, 100), candidate(20.0, 20.0, 120.0, 80.0, size), config);
        s.set_mode(ModeKind::Keystone);

        let result = s.commit();
        assert_eq!(result.image.dimensions(), (120, 80));
        assert!(matches!(
            result.geometry,
            CommittedGeometry::Rectified { outcome: RectifyOutcome::Warped(RectifyStrategy::EdgeInterpolation), .. }
        ));
    }

    #[test]
    fn tone_applies_before_crop() {
        let mut s = session(200, 150);
        s.set_brightness(120.0);
        s.set_mode(ModeKind::Crop);
        let result = s.commit();
        assert_eq!(result.image.get_pixel(0, 0), &Rgba([151, 151, 151, 255]));
        assert_eq!(result.enhancement.brightness(), 120.0);
    }

    #[test]
    fn adjust_commit_rotates_quarter_turns() {
        let mut s = session(200, 150);
        s.rotate_quarter(true);
        let result = s.commit();
        assert_eq!(result.image.dimensions(), (150, 200));
        assert_eq!(result.geometry, CommittedGeometry::Rotated(90.0));
    }

    #[test]
    fn quarter_turn_carries_into_crop_commit() {
        // Left 20 columns dark: after a clockwise turn they are the top rows.
        let image = RasterImage::from_fn(200, 150, |x, _| {
            let level = if x < 20 { 10 } else { 200 };
            Rgba([level, level, level, 255])
        });
        let size = ImageSize::new(200, 150);
        let mut s = EditorState::open(image, candidate(20.0, 20.0, 120.0, 80.0, size), EditorConfig::default());
        s.rotate_quarter(true);
        s.set_mode(ModeKind::Crop);

        assert_eq!(s.image_size(), ImageSize::new(150, 200));
        assert_eq!(s.adjustments().rotation(), 0.0);
        let region = s.crop_region();
        assert_eq!((region.x(), region.y(), region.width(), region.height()), (50.0, 20.0, 80.0, 120.0));

        s.set_crop_region(0.0, 0.0, 150.0, 200.0);
        let result = s.commit();
        assert_eq!(result.image.dimensions(), (150, 200));
        assert_eq!(result.rotation, 90.0);
        assert_eq!(result.image.get_pixel(75, 5), &Rgba([10, 10, 10, 255]));
        assert_eq!(result.image.get_pixel(75, 50), &Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn half_turn_keeps_keystone_corners_upright() {
        let mut s = session(200, 150);
        s.set_rotation(180.0);
        s.set_mode(ModeKind::Keystone);
        assert_eq!(s.quadrilateral(), Quadrilateral::from_rect(60.0, 50.0, 120.0, 80.0));

        let result = s.commit();
        assert_eq!(result.image.dimensions(), (120, 80));
        assert_eq!(result.rotation, 180.0);
    }

    #[test]
    fn rotating_outside_adjust_turns_live_geometry() {
        let mut s = session(200, 150);
        s.set_mode(ModeKind::Crop);
        s.rotate_quarter(false);

        assert_eq!(s.mode_kind(), ModeKind::Crop);
        assert_eq!(s.image_size(), ImageSize::new(150, 200));
        assert_eq!(s.adjustments().rotation(), 0.0);
        // Counter-clockwise: (x, y) lands on (y, 200 - x).
        let region = s.crop_region();
        assert_eq!((region.x(), region.y(), region.right(), region.bottom()), (20.0, 60.0, 100.0, 180.0));
        assert_eq!(s.commit().image.dimensions(), (80, 120));
    }

    #[test]
    fn set_corner_clamps_and_reset_restores_detection() {
        let mut s = session(200, 150);
        s.set_corner(Corner::BottomRight, Point::new(500.0, -5.0));
        assert_eq!(s.quadrilateral().point(Corner::BottomRight), Point::new(200.0, 0.0));

        s.reset_geometry();
        assert_eq!(s.quadrilateral(), Quadrilateral::from_rect(20.0, 20.0, 120.0, 80.0));
    }

    #[test]
    fn cancel_returns_the_untouched_source() {
        let mut s = session(60, 40);
        s.set_brightness(200.0);
        s.rotate_quarter(true);
        s.set_mode(ModeKind::Crop);
        let source = s.cancel();
        assert_eq!(source, grey(60, 40, 100));
    }
}
