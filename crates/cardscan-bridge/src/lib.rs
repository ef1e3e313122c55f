// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cardscan — collaborator boundary.
//
// The scanner hands a finished image to a text extractor and persists the
// resulting record through a card store. Neither is implemented here beyond a
// stub extractor and an in-memory store; real backends plug in behind the
// traits.

pub mod memory;
pub mod stub;
pub mod traits;

pub use memory::MemoryCardStore;
pub use stub::StubExtractor;
pub use traits::{CardStore, TextExtractor};

/// The text extractor available in this build.
pub fn text_extractor() -> Box<dyn traits::TextExtractor> {
    Box::new(stub::StubExtractor)
}
