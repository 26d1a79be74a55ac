//! Error types for the WebView shell.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use webview_shell::{Result, Error};
//!
//! fn drawer_state(dom: &dyn PageDom) -> Result<bool> {
//!     dom.is_drawer_open()
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Bridge | [`Error::Envelope`] |
//! | Page contract | [`Error::Dom`] |
//! | Assets | [`Error::AssetFetch`], [`Error::Http`], [`Error::Io`] |
//! | External | [`Error::Json`] |
//!
//! Nothing here is user-facing: envelope and DOM failures are logged and
//! dropped at their call sites, asset failures leave the page without the
//! enhancement layer until the next reload.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when shell configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// URL failed to parse.
    ///
    /// Returned for destinations or asset locations that are not valid URLs.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Bridge Errors
    // ========================================================================
    /// Malformed or unrecognized bridge payload.
    ///
    /// Raised when an inbound envelope or content command fails to decode.
    /// The bridge logs and drops these; they never propagate to the caller.
    #[error("Malformed envelope: {message}")]
    Envelope {
        /// Description of the decode failure, including a payload snippet.
        message: String,
    },

    // ========================================================================
    // Page Contract Errors
    // ========================================================================
    /// The hosted page broke the documented structural contract.
    ///
    /// Raised by [`PageDom`](crate::content::PageDom) implementations when an
    /// expected element is absent (e.g. after a site redesign). The content
    /// runtime catches these at each call site.
    #[error("Page contract violation: {message}")]
    Dom {
        /// Description of the missing or unexpected structure.
        message: String,
    },

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// A behavior script or stylesheet could not be retrieved.
    #[error("Failed to fetch {resource}: {message}")]
    AssetFetch {
        /// The resource that failed (behavior script or stylesheet).
        resource: String,
        /// Description of the fetch failure.
        message: String,
    },

    /// HTTP error while fetching remote assets.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a malformed envelope error.
    #[inline]
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope {
            message: message.into(),
        }
    }

    /// Creates a page contract error.
    #[inline]
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom {
            message: message.into(),
        }
    }

    /// Creates an asset fetch error.
    #[inline]
    pub fn asset_fetch(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssetFetch {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is an asset retrieval error.
    ///
    /// Fetch errors are non-fatal: the page simply runs without the
    /// enhancement layer until the next reload.
    #[inline]
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::AssetFetch { .. } | Self::Http(_) | Self::Io(_)
        )
    }

    /// Returns `true` if this is a page contract error.
    #[inline]
    #[must_use]
    pub fn is_dom_error(&self) -> bool {
        matches!(self, Self::Dom { .. })
    }

    /// Returns `true` if this is a bridge decode error.
    #[inline]
    #[must_use]
    pub fn is_envelope_error(&self) -> bool {
        matches!(self, Self::Envelope { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
