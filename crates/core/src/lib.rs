//! Pure domain types and functions shared across the backend.
//!
//! This crate has no internal dependencies and no I/O: type aliases,
//! the domain error type, the language-to-locale mapping for the
//! dubbing service, audio payload validation, and the gateway error
//! classifier.

pub mod audio;
pub mod classify;
pub mod error;
pub mod locale;
pub mod types;
