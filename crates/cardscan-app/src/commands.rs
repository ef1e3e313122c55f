// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations. Each one drives an editor session the same way
// an interactive front-end would, then commits and writes the result.

use std::path::Path;

use cardscan_core::config::RectifyStrategy;
use cardscan_core::error::Result;
use cardscan_core::types::{CardRecord, DetectionCandidate, ImageSize};
use cardscan_core::ScanConfig;
use cardscan_document::scan::scoring;
use cardscan_document::DocumentDetector;
use cardscan_editor::{CommittedGeometry, EditorState, ModeKind};
use tracing::instrument;

use crate::services;

/// Brightness and contrast in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub brightness: f32,
    pub contrast: f32,
}

impl Default for Tone {
    fn default() -> Self {
        Self { brightness: 100.0, contrast: 100.0 }
    }
}

/// What a committing subcommand wrote.
#[derive(Debug, Clone)]
pub struct Written {
    pub geometry: CommittedGeometry,
    pub dimensions: (u32, u32),
    pub card: Option<CardRecord>,
}

/// Find the card in `input`.
#[instrument(skip(config))]
pub fn detect(input: &Path, config: &ScanConfig) -> Result<DetectionCandidate> {
    let image = services::load_image(input)?;
    Ok(DocumentDetector::new(config.detection.clone()).detect(&image))
}

/// Detect the card, then keystone-correct it.
#[instrument(skip(config))]
pub fn rectify(
    input: &Path,
    output: &Path,
    strategy: Option<RectifyStrategy>,
    tone: Tone,
    extract: bool,
    config: &ScanConfig,
) -> Result<Written> {
    let image = services::load_image(input)?;
    let mut editor_config = config.editor.clone();
    if let Some(strategy) = strategy {
        editor_config.strategy = strategy;
    }

    let detector = DocumentDetector::new(config.detection.clone());
    let mut editor = EditorState::open_detected(image, &detector, editor_config);
    apply_tone(&mut editor, tone);
    editor.set_mode(ModeKind::Keystone);

    finish(editor, output, extract, config)
}

/// Clip an axis-aligned region.
#[instrument(skip(config))]
pub fn crop(input: &Path, output: &Path, region: (f32, f32, f32, f32), tone: Tone, config: &ScanConfig) -> Result<Written> {
    let image = services::load_image(input)?;
    let size = ImageSize::new(image.width(), image.height());
    let mut editor = EditorState::open(image, scoring::fallback(size), config.editor.clone());
    apply_tone(&mut editor, tone);
    editor.set_mode(ModeKind::Crop);
    let (x, y, width, height) = region;
    editor.set_crop_region(x, y, width, height);

    finish(editor, output, false, config)
}

/// Rotate and adjust tone over the whole image.
#[instrument(skip(config))]
pub fn enhance(input: &Path, output: &Path, rotation: f32, tone: Tone, config: &ScanConfig) -> Result<Written> {
    let image = services::load_image(input)?;
    let size = ImageSize::new(image.width(), image.height());
    let mut editor = EditorState::open(image, scoring::fallback(size), config.editor.clone());
    apply_tone(&mut editor, tone);
    editor.set_rotation(rotation);

    finish(editor, output, false, config)
}

fn apply_tone(editor: &mut EditorState, tone: Tone) {
    editor.set_brightness(tone.brightness);
    editor.set_contrast(tone.contrast);
}

fn finish(editor: EditorState, output: &Path, extract: bool, config: &ScanConfig) -> Result<Written> {
    let result = editor.commit();
    let dimensions = result.image.dimensions();
    let encoded = services::write_image(result.image, output, config)?;

    let card = if extract {
        let extractor = cardscan_bridge::text_extractor();
        let mut store = services::card_store();
        Some(services::hand_off(&encoded, extractor.as_ref(), &mut store)?)
    } else {
        None
    };

    Ok(Written { geometry: result.geometry, dimensions, card })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_document::RasterImage;
    use image::Rgba;

    /// Dark 800x500 photo with a light 600x360 card at (100, 70).
    fn write_card_photo(path: &Path) {
        RasterImage::from_fn(800, 500, |x, y| {
            if (100..700).contains(&x) && (70..430).contains(&y) {
                Rgba([240, 240, 235, 255])
            } else {
                Rgba([30, 30, 40, 255])
            }
        })
        .save(path)
        .unwrap();
    }

    #[test]
    fn detect_finds_the_card() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        write_card_photo(&input);

        let candidate = detect(&input, &ScanConfig::default()).unwrap();
        assert!(!candidate.is_fallback());
        assert!(candidate.confidence > 0.8);
    }

    #[test]
    fn rectify_writes_card_sized_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        let output = dir.path().join("card.png");
        write_card_photo(&input);

        let written = rectify(&input, &output, None, Tone::default(), true, &ScanConfig::default()).unwrap();
        let (w, h) = written.dimensions;
        assert!((590..=610).contains(&w), "width {w}");
        assert!((350..=370).contains(&h), "height {h}");
        assert!(matches!(written.geometry, CommittedGeometry::Rectified { .. }));
        assert!(written.card.is_some());
        assert_eq!(services::load_image(&output).unwrap().dimensions(), (w, h));
    }

    #[test]
    fn crop_clips_requested_region() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        let output = dir.path().join("crop.jpg");
        RasterImage::from_pixel(200, 150, Rgba([90, 90, 90, 255])).save(&input).unwrap();

        let written = crop(&input, &output, (10.0, 10.0, 100.0, 60.0), Tone::default(), &ScanConfig::default()).unwrap();
        assert_eq!(written.dimensions, (100, 60));
        assert!(written.card.is_none());
        assert_eq!(services::load_image(&output).unwrap().dimensions(), (100, 60));
    }

    #[test]
    fn enhance_rotates_and_brightens() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        let output = dir.path().join("bright.png");
        RasterImage::from_pixel(40, 20, Rgba([200, 200, 200, 255])).save(&input).unwrap();

        let tone = Tone { brightness: 200.0, contrast: 100.0 };
        let written = enhance(&input, &output, 90.0, tone, &ScanConfig::default()).unwrap();
        assert_eq!(written.dimensions, (20, 40));

        let saved = services::load_image(&output).unwrap();
        assert_eq!(saved.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn unreadable_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"not an image").unwrap();
        assert!(detect(&input, &ScanConfig::default()).is_err());
    }
}
