//! Language-code to dubbing-locale mapping.
//!
//! The dubbing service identifies target languages by full locale
//! codes (`es_ES`), while clients speak in short language codes
//! (`es`). Unmapped languages fall back to [`DEFAULT_LOCALE`].

/// Locale used when a language code has no entry in the map.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Static language-code to locale-code table for the dubbing API.
const LANGUAGE_MAP: &[(&str, &str)] = &[
    ("en", "en_US"),
    ("es", "es_ES"),
    ("fr", "fr_FR"),
    ("ja", "ja_JP"),
    ("hi", "hi_IN"),
];

/// Resolve the dubbing-service locale for a client language code.
///
/// Returns [`DEFAULT_LOCALE`] for unknown codes rather than failing:
/// an unmapped listener still gets a best-effort dub.
pub fn locale_for(language: &str) -> &'static str {
    LANGUAGE_MAP
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, locale)| *locale)
        .unwrap_or(DEFAULT_LOCALE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
