// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people scanning cards.
//
// Every technical error maps to a plain English message with a clear suggestion.
// The severity drives how a front-end presents it.

use crate::error::CardscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth trying again as-is.
    Transient,
    /// The user needs to do something different (another photo, another file).
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the caller may retry automatically.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `CardscanError` into something a person holding a phone understands.
pub fn humanize_error(err: &CardscanError) -> HumanError {
    match err {
        CardscanError::Decode(_) => HumanError {
            message: "We couldn't open that picture.".into(),
            suggestion: "Take the photo again, or choose a JPEG or PNG file.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CardscanError::Encode(detail) => HumanError {
            message: "We couldn't save the finished card image.".into(),
            suggestion: format!("Try again. If it keeps happening, switch the output format. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        CardscanError::SolverSingularity { .. } => HumanError {
            message: "The card corners are too close together.".into(),
            suggestion: "Drag the four corner handles out to the edges of the card.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CardscanError::Config(detail) => HumanError {
            message: "A setting has an invalid value.".into(),
            suggestion: format!("Reset the settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        CardscanError::Extraction(_) => HumanError {
            message: "We couldn't read the text on this card.".into(),
            suggestion: "Check your connection and try again, or retake the photo in better light.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CardscanError::Storage(_) => HumanError {
            message: "We couldn't save this card.".into(),
            suggestion: "Try again in a moment.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CardscanError::Unavailable(what) => HumanError {
            message: format!("The {what} isn't available here."),
            suggestion: "This feature needs to be set up before it can be used.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        CardscanError::Io(io) => HumanError {
            message: "We couldn't read or write a file.".into(),
            suggestion: format!("Check that the file exists and that you can access it. ({io})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CardscanError::Serialization(_) => HumanError {
            message: "A saved file is damaged.".into(),
            suggestion: "Delete the settings file to start again with defaults.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
