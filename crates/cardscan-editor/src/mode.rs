// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor modes and the session-wide tonal/rotation adjustments.

use cardscan_document::Enhancement;
use serde::{Deserialize, Serialize};

use crate::crop::CropSession;
use crate::keystone::KeystoneSession;

/// Rotation slider range in degrees.
pub const ROTATION_LIMIT: f32 = 180.0;

/// Which tool the editor is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Adjust,
    Crop,
    Keystone,
}

impl ModeKind {
    pub const ALL: [ModeKind; 3] = [ModeKind::Adjust, ModeKind::Crop, ModeKind::Keystone];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Adjust => "Adjust",
            Self::Crop => "Crop",
            Self::Keystone => "Keystone",
        }
    }
}

/// The active mode together with the geometry it edits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorMode {
    /// Rotation and tone sliders; pointer input is ignored.
    Adjust,
    Crop(CropSession),
    Keystone(KeystoneSession),
}

impl EditorMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Adjust => ModeKind::Adjust,
            Self::Crop(_) => ModeKind::Crop,
            Self::Keystone(_) => ModeKind::Keystone,
        }
    }

    /// Whether a handle is currently held.
    pub fn is_dragging(&self) -> bool {
        match self {
            Self::Adjust => false,
            Self::Crop(session) => session.drag.is_some(),
            Self::Keystone(session) => session.drag.is_some(),
        }
    }
}

/// Rotation, brightness and contrast for the session.
///
/// Tone applies in every mode; rotation is only committed from Adjust.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustments {
    rotation: f32,
    enhancement: Enhancement,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self { rotation: 0.0, enhancement: Enhancement::default() }
    }
}

impl Adjustments {
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn enhancement(&self) -> Enhancement {
        self.enhancement
    }

    pub fn brightness(&self) -> f32 {
        self.enhancement.brightness()
    }

    pub fn contrast(&self) -> f32 {
        self.enhancement.contrast()
    }

    /// Slider input, clamped to `[-180, 180]`. NaN resets to 0.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = if degrees.is_nan() { 0.0 } else { degrees.clamp(-ROTATION_LIMIT, ROTATION_LIMIT) };
    }

    /// Quarter-turn buttons. Wraps around so repeated presses keep turning.
    pub fn rotate_quarter(&mut self, clockwise: bool) {
        let step = if clockwise { 90.0 } else { -90.0 };
        let turned = (self.rotation + step + ROTATION_LIMIT).rem_euclid(360.0) - ROTATION_LIMIT;
        self.rotation = turned;
    }

    pub fn reset_rotation(&mut self) {
        self.rotation = 0.0;
    }

    pub fn set_brightness(&mut self, percent: f32) {
        self.enhancement = Enhancement::new(percent, self.enhancement.contrast());
    }

    pub fn set_contrast(&mut self, percent: f32) {
        self.enhancement = Enhancement::new(self.enhancement.brightness(), percent);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
