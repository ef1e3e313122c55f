// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer shared by the subcommands: configuration lookup, image
// loading, output encoding and the card hand-off.

use std::path::{Path, PathBuf};

use cardscan_bridge::{CardStore, MemoryCardStore, TextExtractor};
use cardscan_core::error::{CardscanError, Result};
use cardscan_core::types::{CardRecord, EncodedImage, ImageFormat};
use cardscan_core::ScanConfig;
use cardscan_document::{ImageProcessor, RasterImage};
use tracing::{info, warn};

/// Where the config file lives when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    config_base().join("cardscan").join("config.json")
}

fn config_base() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    PathBuf::from(".")
}

/// Load settings from `explicit`, or from the default location.
pub fn load_config(explicit: Option<&Path>) -> Result<ScanConfig> {
    match explicit {
        Some(path) => ScanConfig::load(path),
        None => ScanConfig::load(default_config_path()),
    }
}

pub fn load_image(path: &Path) -> Result<RasterImage> {
    let processor = ImageProcessor::open(path)?;
    info!(path = %path.display(), width = processor.width(), height = processor.height(), "image loaded");
    Ok(processor.into_raster())
}

/// Output format: the file extension wins, then the configured default.
pub fn output_format(path: &Path, config: &ScanConfig) -> ImageFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .unwrap_or(config.output.format)
}

/// Encode `image` for `path` and write it out.
pub fn write_image(image: RasterImage, path: &Path, config: &ScanConfig) -> Result<EncodedImage> {
    let format = output_format(path, config);
    let encoded = ImageProcessor::from_raster(image).encode(format, config.output.jpeg_quality)?;
    std::fs::write(path, &encoded.bytes)?;
    info!(path = %path.display(), format = format.mime_type(), bytes = encoded.bytes.len(), "image written");
    Ok(encoded)
}

/// Run text extraction over a finished card and store the record.
///
/// An extractor that is unavailable in this build is not an error: the card
/// is still stored, with no fields.
pub fn hand_off(encoded: &EncodedImage, extractor: &dyn TextExtractor, store: &mut dyn CardStore) -> Result<CardRecord> {
    let fields = match extractor.extract(encoded) {
        Ok(fields) => fields,
        Err(CardscanError::Unavailable(what)) => {
            warn!(extractor = extractor.name(), "{what} unavailable; storing card without fields");
            Default::default()
        }
        Err(err) => return Err(err),
    };

    let record = CardRecord::new(fields, encoded.format);
    let id = store.put(record.clone())?;
    info!(%id, missing = record.fields.missing().len(), "card stored");
    Ok(record)
}

/// Store used for the lifetime of one CLI invocation.
pub fn card_store() -> MemoryCardStore {
    MemoryCardStore::new()
}
