//! Gateway error classification.
//!
//! The dubbing service reports failures as free-form error text with
//! embedded machine codes (`INSUFFICIENT_CREDITS`, ...). This module
//! maps that text onto a closed set of categories with user-facing
//! messages. Pure function, testable with canned strings.

use serde::Serialize;

/// Known failure categories reported by the dubbing gateway.
///
/// Unrecognized error text maps to [`GatewayErrorKind::Unknown`], which
/// renders as a generic "Translation failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GatewayErrorKind {
    InsufficientCredits,
    LanguageNotSupported,
    NoSpeechDetected,
    SourceLanguageMismatch,
    ServerError,
    Unknown,
}

impl GatewayErrorKind {
    /// Classify raw gateway error text by substring inspection.
    pub fn classify(error_text: &str) -> Self {
        if error_text.contains("INSUFFICIENT_CREDITS")
            || error_text.contains("CREDITS_EXHAUSTED")
        {
            Self::InsufficientCredits
        } else if error_text.contains("LANGUAGE_NOT_SUPPORTED") {
            Self::LanguageNotSupported
        } else if error_text.contains("SPEECH_NOT_PRESENT") {
            Self::NoSpeechDetected
        } else if error_text.contains("SOURCE_LANGUAGE_MISMATCH") {
            Self::SourceLanguageMismatch
        } else if error_text.contains("SERVER_ERROR") {
            Self::ServerError
        } else {
            Self::Unknown
        }
    }

    /// Human-readable message shown to the affected listener.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::InsufficientCredits => "Translation service credits exhausted",
            Self::LanguageNotSupported => "Language not supported for translation",
            Self::NoSpeechDetected => "No speech detected in audio",
            Self::SourceLanguageMismatch => "Source language mismatch",
            Self::ServerError => "Translation server error",
            Self::Unknown => "Translation failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
