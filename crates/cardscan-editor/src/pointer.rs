// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pointer and touch input, and the display-to-image coordinate mapping.

use cardscan_core::config::EditorConfig;
use cardscan_core::types::{ImageSize, Point};
use serde::{Deserialize, Serialize};

/// Reference buffer size at which the configured hit radius applies as-is.
const HIT_RADIUS_REFERENCE: f32 = 500.0;

/// Stage of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// What produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    Mouse,
    Touch,
    Pen,
}

/// One pointer or touch event, positioned in display space relative to the
/// top-left of the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point,
    pub phase: PointerPhase,
    pub device: DeviceKind,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f32, y: f32, device: DeviceKind) -> Self {
        Self { position: Point::new(x, y), phase, device }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y, DeviceKind::Mouse)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y, DeviceKind::Mouse)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y, DeviceKind::Mouse)
    }

    pub fn with_device(self, device: DeviceKind) -> Self {
        Self { device, ..self }
    }
}

/// What an event did to the session, so a front-end knows whether to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Nothing to do in this mode, or no handle under the pointer.
    Ignored,
    /// A handle was picked up.
    Grabbed,
    /// The active handle moved.
    Moved,
    /// The active drag ended.
    Released,
}

/// The editing surface as displayed versus its backing pixel buffer.
///
/// Responsive layout and device pixel ratio mean the surface is usually shown
/// at a different size than the buffer it draws; every pointer position has to
/// be rescaled before it is compared against image-space geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub display_width: f32,
    pub display_height: f32,
    pub buffer: ImageSize,
}

impl Viewport {
    pub fn new(display_width: f32, display_height: f32, buffer: ImageSize) -> Self {
        Self { display_width, display_height, buffer }
    }

    /// A surface displayed at exactly its buffer size.
    pub fn unscaled(buffer: ImageSize) -> Self {
        Self::new(buffer.width as f32, buffer.height as f32, buffer)
    }

    /// `(buffer / display)` per axis. A collapsed display axis maps 1:1.
    pub fn scale(&self) -> (f32, f32) {
        let axis = |buffer: u32, display: f32| {
            if display > 0.0 && display.is_finite() { buffer as f32 / display } else { 1.0 }
        };
        (
            axis(self.buffer.width, self.display_width),
            axis(self.buffer.height, self.display_height),
        )
    }

    /// Convert a display-space position into image pixels.
    pub fn to_image(&self, display: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(display.x * sx, display.y * sy)
    }

    /// Handle hit radius in image pixels.
    ///
    /// Grows with `min(buffer width, buffer height) / 500` so handles stay
    /// grabbable on large photos, never drops below the configured radius, and
    /// widens further for touch.
    pub fn hit_radius(&self, config: &EditorConfig, device: DeviceKind) -> f32 {
        let shorter = self.buffer.width.min(self.buffer.height) as f32;
        let scale = (shorter / HIT_RADIUS_REFERENCE).max(1.0);
        let device_factor = match device {
            DeviceKind::Touch => config.touch_radius_factor,
            DeviceKind::Mouse | DeviceKind::Pen => 1.0,
        };
        config.handle_radius * scale * device_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_size_display_doubles_coordinates() {
        let viewport = Viewport::new(400.0, 300.0, ImageSize::new(800, 600));
        assert_eq!(viewport.to_image(Point::new(100.0, 150.0)), Point::new(200.0, 300.0));
    }

    #[test]
    fn axes_scale_independently() {
        let viewport = Viewport::new(100.0, 400.0, ImageSize::new(200, 200));
        assert_eq!(viewport.scale(), (2.0, 0.5));
    }

    #[test]
    fn collapsed_display_maps_one_to_one() {
        let viewport = Viewport::new(0.0, f32::NAN, ImageSize::new(200, 200));
        assert_eq!(viewport.scale(), (1.0, 1.0));
    }

    #[test]
    fn hit_radius_scales_with_buffer() {
        let config = EditorConfig::default();
        let small = Viewport::unscaled(ImageSize::new(300, 200));
        let large = Viewport::unscaled(ImageSize::new(4000, 3000));

        assert_eq!(small.hit_radius(&config, DeviceKind::Mouse), 20.0);
        assert_eq!(large.hit_radius(&config, DeviceKind::Mouse), 120.0);
        assert_eq!(large.hit_radius(&config, DeviceKind::Touch), 180.0);
    }

    #[test]
    fn hit_radius_never_shrinks_below_configured() {
        let config = EditorConfig::default();
        for (w, h, expected) in [(40, 30, 20.0), (500, 499, 20.0), (500, 500, 20.0), (1000, 1000, 40.0)] {
            let viewport = Viewport::unscaled(ImageSize::new(w, h));
            assert_eq!(viewport.hit_radius(&config, DeviceKind::Mouse), expected, "{w}x{h}");
        }
    }
}
