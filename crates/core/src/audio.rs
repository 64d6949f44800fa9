//! Audio payload validation.
//!
//! Performed synchronously at dispatch time, before any dubbing job is
//! created. A payload that fails here is reported back to the speaker
//! and never reaches the gateway.

use crate::error::CoreError;

/// Minimum decoded payload size accepted for dubbing. Anything shorter
/// cannot contain usable speech and would burn gateway credits.
pub const MIN_AUDIO_BYTES: usize = 100;

/// Validate a decoded audio payload.
///
/// Rules:
/// - Must not be empty.
/// - Must be at least [`MIN_AUDIO_BYTES`] bytes.
pub fn validate_audio_payload(audio: &[u8]) -> Result<(), CoreError> {
    if audio.is_empty() {
        return Err(CoreError::Validation(
            "Audio payload is empty".to_string(),
        ));
    }
    if audio.len() < MIN_AUDIO_BYTES {
        return Err(CoreError::Validation(format!(
            "Audio payload too short ({} bytes, minimum {MIN_AUDIO_BYTES})",
            audio.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
