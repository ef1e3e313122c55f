// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration — detection thresholds, editor hit testing, output format.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CardscanError, Result};
use crate::types::{ImageFormat, MIN_CROP_SIZE};

/// Persistent scan settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    pub detection: DetectionConfig,
    pub editor: EditorConfig,
    pub output: OutputConfig,
}

/// Settings for automatic card detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum gradient magnitude for a pixel to count as an edge.
    pub edge_threshold: f32,
    /// Images whose longest edge exceeds this are downscaled before detection.
    pub max_detection_edge: u32,
    /// A best candidate scoring below this is replaced by the centred fallback.
    pub min_confidence: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 50.0,
            max_detection_edge: 1600,
            min_confidence: 0.4,
        }
    }
}

/// Which source-mapping model keystone rectification uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RectifyStrategy {
    /// Solve the 8x8 correspondence system (falls back to a bounding-box crop
    /// when the quad is degenerate).
    #[default]
    LinearSystem,
    /// Interpolate along the top and bottom edges, then between them.
    EdgeInterpolation,
}

/// Settings for the interactive editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Handle hit radius in buffer pixels at the 500 px reference size.
    pub handle_radius: f32,
    /// Multiplier applied to the hit radius for touch input.
    pub touch_radius_factor: f32,
    /// Smallest crop width/height in image pixels.
    pub min_crop_size: f32,
    pub strategy: RectifyStrategy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_radius: 20.0,
            touch_radius_factor: 1.5,
            min_crop_size: MIN_CROP_SIZE,
            strategy: RectifyStrategy::default(),
        }
    }
}

/// Encoding of committed images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: ImageFormat,
    /// JPEG quality (1-100); ignored for PNG.
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            jpeg_quality: 90,
        }
    }
}

impl ScanConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Write settings to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if !(d.edge_threshold.is_finite() && d.edge_threshold >= 0.0) {
            return Err(CardscanError::Config(format!(
                "edge_threshold must be a non-negative number, got {}",
                d.edge_threshold
            )));
        }
        if d.max_detection_edge < 16 {
            return Err(CardscanError::Config(format!(
                "max_detection_edge must be at least 16, got {}",
                d.max_detection_edge
            )));
        }
        if !(0.0..=1.0).contains(&d.min_confidence) {
            return Err(CardscanError::Config(format!(
                "min_confidence must lie in [0, 1], got {}",
                d.min_confidence
            )));
        }

        let e = &self.editor;
        if !(e.handle_radius > 0.0 && e.touch_radius_factor > 0.0) {
            return Err(CardscanError::Config(
                "handle_radius and touch_radius_factor must be positive".into(),
            ));
        }
        if !(e.min_crop_size >= 1.0) {
            return Err(CardscanError::Config(format!(
                "min_crop_size must be at least 1, got {}",
                e.min_crop_size
            )));
        }

        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(CardscanError::Config(format!(
                "jpeg_quality must lie in 1..=100, got {}",
                self.output.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.edge_threshold, 50.0);
        assert_eq!(config.editor.min_crop_size, 50.0);
        assert_eq!(config.editor.strategy, RectifyStrategy::LinearSystem);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cardscan.json");

        let mut config = ScanConfig::default();
        config.detection.edge_threshold = 72.5;
        config.editor.strategy = RectifyStrategy::EdgeInterpolation;
        config.output.format = ImageFormat::Jpeg;
        config.save(&path).unwrap();

        let loaded = ScanConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "detection": { "edge_threshold": 80.0 } }"#).unwrap();

        let loaded = ScanConfig::load(&path).unwrap();
        assert_eq!(loaded.detection.edge_threshold, 80.0);
        assert_eq!(loaded.detection.max_detection_edge, 1600);
        assert_eq!(loaded.output, OutputConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = ScanConfig::default();
        config.detection.min_confidence = 1.5;
        assert!(matches!(config.validate(), Err(CardscanError::Config(_))));

        let mut config = ScanConfig::default();
        config.output.jpeg_quality = 0;
        assert!(config.validate().is_err());
    }
}
