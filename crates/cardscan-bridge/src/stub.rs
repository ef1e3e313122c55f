// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub extractor for builds without a text-recognition backend.

use cardscan_core::error::{CardscanError, Result};
use cardscan_core::types::{CardFields, EncodedImage};

use crate::traits::TextExtractor;

/// Always reports that extraction is unavailable.
pub struct StubExtractor;

impl TextExtractor for StubExtractor {
    fn name(&self) -> &str {
        "stub"
    }

    fn extract(&self, image: &EncodedImage) -> Result<CardFields> {
        tracing::warn!(bytes = image.bytes.len(), "TextExtractor::extract called on stub extractor");
        Err(CardscanError::Unavailable("text extraction"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_core::types::ImageFormat;

    #[test]
    fn stub_reports_unavailable() {
        let image = EncodedImage { bytes: vec![0; 8], format: ImageFormat::Png };
        let err = StubExtractor.extract(&image).unwrap_err();
        assert!(matches!(err, CardscanError::Unavailable(_)));
    }

    #[test]
    fn default_extractor_is_the_stub() {
        assert_eq!(crate::text_extractor().name(), "stub");
    }
}
