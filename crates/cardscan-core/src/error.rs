// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Cardscan.

use thiserror::Error;

/// Top-level error type for all Cardscan operations.
///
/// Only [`CardscanError::Decode`] is fatal to an editing session. Detection
/// failures, solver singularities, and out-of-bounds drags are recovered inside
/// the engine and never reach the caller as errors.
#[derive(Debug, Error)]
pub enum CardscanError {
    // -- Image errors --
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Geometry errors --
    #[error("perspective system is singular (pivot {pivot:e} in column {column})")]
    SolverSingularity { column: usize, pivot: f64 },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Collaborators --
    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("card storage error: {0}")]
    Storage(String),

    #[error("collaborator not available: {0}")]
    Unavailable(&'static str),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CardscanError>;
