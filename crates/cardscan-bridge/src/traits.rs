// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait definitions for the services a scan is handed off to.

use cardscan_core::error::Result;
use cardscan_core::types::{CardFields, CardId, CardRecord, EncodedImage};

/// Reads contact fields off a rectified card image.
pub trait TextExtractor: Send + Sync {
    /// Human-readable backend name, for logs.
    fn name(&self) -> &str;

    /// Extract whatever fields can be read. Unreadable fields stay `None`.
    fn extract(&self, image: &EncodedImage) -> Result<CardFields>;
}

/// Persistence for scanned cards.
pub trait CardStore: Send {
    /// Store `record`, replacing any record with the same id.
    fn put(&mut self, record: CardRecord) -> Result<CardId>;

    /// Fetch a record by id. Returns None if not found.
    fn get(&self, id: &CardId) -> Result<Option<CardRecord>>;

    /// Every stored record, oldest capture first.
    fn list(&self) -> Result<Vec<CardRecord>>;
}
