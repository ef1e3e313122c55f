// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory card store.

use std::collections::HashMap;

use cardscan_core::error::Result;
use cardscan_core::types::{CardId, CardRecord};
use tracing::debug;

use crate::traits::CardStore;

/// A [`CardStore`] that lives for the length of the process.
#[derive(Debug, Default)]
pub struct MemoryCardStore {
    records: HashMap<CardId, CardRecord>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CardStore for MemoryCardStore {
    fn put(&mut self, record: CardRecord) -> Result<CardId> {
        let id = record.id;
        let replaced = self.records.insert(id, record).is_some();
        debug!(%id, replaced, "card stored");
        Ok(id)
    }

    fn get(&self, id: &CardId) -> Result<Option<CardRecord>> {
        Ok(self.records.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<CardRecord>> {
        let mut all: Vec<CardRecord> = self.records.values().cloned().collect();
        all.sort_by_key(|record| record.captured_at);
        Ok(all)
    }
}
