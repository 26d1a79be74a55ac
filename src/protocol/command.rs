//! Content command definitions.
//!
//! Commands travel host → content as script-injected JSON with a `type`
//! discriminant. The discriminant strings are part of the wire contract with
//! deployed behavior scripts and must not change (including the historical
//! `Drawler` spelling).
//!
//! # Commands
//!
//! | Wire name | Purpose |
//! |-----------|---------|
//! | `openDrawler` | Open the navigation drawer (idempotent) |
//! | `closeDrawler` | Close the navigation drawer (idempotent) |
//! | `checkIsOpen` | Query drawer state; response echoes `id` |
//! | `load` | Initialize the runtime; carries the version token |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::{QueryId, VersionToken};

// ============================================================================
// ContentCommand
// ============================================================================

/// A command dispatched into the content runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentCommand {
    /// Open the navigation drawer. No-op when already open.
    #[serde(rename = "openDrawler")]
    OpenDrawer,

    /// Close the navigation drawer. No-op when already closed.
    #[serde(rename = "closeDrawler")]
    CloseDrawer,

    /// Recompute drawer state and answer with a correlated envelope.
    #[serde(rename = "checkIsOpen")]
    QueryDrawerOpen {
        /// Correlation id echoed on the response.
        id: QueryId,
    },

    /// Initialize the runtime with the script version.
    ///
    /// `"dev"` selects development mode. Re-delivery after initialization
    /// re-runs only the idempotent affordance-insertion path.
    #[serde(rename = "load")]
    Load {
        /// Cache-busting version token.
        ver: VersionToken,
    },
}

impl ContentCommand {
    /// Creates a drawer-state query with a fresh correlation id.
    #[inline]
    #[must_use]
    pub fn query() -> Self {
        Self::QueryDrawerOpen { id: QueryId::next() }
    }

    /// Creates a load command for the given version token.
    #[inline]
    #[must_use]
    pub fn load(ver: VersionToken) -> Self {
        Self::Load { ver }
    }

    /// Returns the wire discriminant for this command.
    #[inline]
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::OpenDrawer => "openDrawler",
            Self::CloseDrawer => "closeDrawler",
            Self::QueryDrawerOpen { .. } => "checkIsOpen",
            Self::Load { .. } => "load",
        }
    }

    /// Serializes the command to its wire text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }

    /// Parses a command from its wire text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Envelope`] if the payload is not a valid command.
    /// The runtime's dispatcher logs and drops these.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            let snippet: String = text.chars().take(120).collect();
            Error::envelope(format!("{e}: {snippet}"))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_drawer_wire_format() {
        let json = ContentCommand::OpenDrawer.encode().expect("encode");
        assert_eq!(json, r#"{"type":"openDrawler"}"#);
    }

    #[test]
    fn test_close_drawer_wire_format() {
        let json = ContentCommand::CloseDrawer.encode().expect("encode");
        assert_eq!(json, r#"{"type":"closeDrawler"}"#);
    }

    #[test]
    fn test_query_carries_id() {
        let command = ContentCommand::query();
        let json = command.encode().expect("encode");

        assert!(json.contains(r#""type":"checkIsOpen""#));
        assert!(json.contains(r#""id":"#));
    }

    #[test]
    fn test_load_wire_format() {
        let command = ContentCommand::load(VersionToken::dev());
        let json = command.encode().expect("encode");
        assert_eq!(json, r#"{"type":"load","ver":"dev"}"#);
    }

    #[test]
    fn test_decode_round_trip() {
        let command = ContentCommand::load(VersionToken::from("1700000000000"));
        let decoded = ContentCommand::decode(&command.encode().expect("encode")).expect("decode");
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let result = ContentCommand::decode(r#"{"type":"selfDestruct"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(ContentCommand::decode("").is_err());
        assert!(ContentCommand::decode("null").is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(ContentCommand::OpenDrawer.wire_name(), "openDrawler");
        assert_eq!(ContentCommand::CloseDrawer.wire_name(), "closeDrawler");
        assert_eq!(ContentCommand::query().wire_name(), "checkIsOpen");
        assert_eq!(
            ContentCommand::load(VersionToken::dev()).wire_name(),
            "load"
        );
    }
}
