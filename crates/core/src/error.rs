//! Error types for wp-import operations.
//!
//! This module defines the main error type [`WpImportError`] which represents
//! everything that can go wrong while reading an export, converting posts,
//! and talking to a Write.as/WriteFreely instance.
//!
//! # Example
//!
//! ```rust
//! use wpimport_core::{WpImportError, Result};
//!
//! fn require_alias(alias: &str) -> Result<&str> {
//!     if alias.is_empty() {
//!         return Err(WpImportError::ConfigError("blog alias is empty".to_string()));
//!     }
//!     Ok(alias)
//! }
//! # assert!(require_alias("").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for import operations.
///
/// Variants fall into three groups: fatal source errors (the export cannot be
/// read or parsed), per-item errors (a single post could not be converted or
/// created), and API errors returned by the destination instance.
#[derive(Error, Debug)]
pub enum WpImportError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues,
    /// and undecodable response bodies.
    #[cfg(feature = "client")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid instance URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The export is not well-formed XML or not a WXR document.
    #[error("Failed to parse export: {0}")]
    ParseError(String),

    /// The export is not valid UTF-8.
    #[error("Invalid character encoding")]
    InvalidEncoding,

    /// The input file is in a format no source adapter understands.
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// A post body could not be converted to Markdown.
    ///
    /// This only affects the post being converted; the importer skips it
    /// and carries on with the rest of the export.
    #[error("Markdown conversion failed: {0}")]
    ConversionError(String),

    /// Signing in to the instance failed.
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// A collection with the requested name already exists.
    #[error("Collection name is already taken: {0}")]
    CollectionTaken(String),

    /// Any other non-success response from the instance.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read and write errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Instance store errors.
    ///
    /// Returned when `instances.ini` is malformed or cannot be located.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for WpImportError.
pub type Result<T> = std::result::Result<T, WpImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WpImportError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_api_error_display() {
        let err = WpImportError::Api { status: 409, message: "Post with that slug already exists.".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("409"));
        assert!(msg.contains("slug already exists"));
    }

    #[test]
    fn test_timeout_error() {
        let err = WpImportError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_conversion_error_display() {
        let err = WpImportError::ConversionError("unexpected end of input".to_string());
        assert!(err.to_string().starts_with("Markdown conversion failed"));
    }
}
