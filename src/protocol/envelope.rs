//! Envelope message types.
//!
//! Envelopes are notifications sent from the content runtime to the host
//! shell when page activity occurs, plus the drawer-state query response.
//!
//! # Format
//!
//! ```json
//! { "type": 0, "value": true, "id": 7 }
//! ```
//!
//! `type` is the [`MessageKind`] ordinal. `value` is only meaningful on
//! drawer-state responses (a boolean); `id` echoes the query's correlation
//! id and is absent on plain events.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::QueryId;

// ============================================================================
// MessageKind
// ============================================================================

/// Message kinds exchanged across the bridge.
///
/// The set is closed and ordinal-stable: kinds serialize as their ordinal
/// and new kinds may only be appended, never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum MessageKind {
    /// Drawer-state query response. Carries a boolean `value`.
    QueryDrawerOpen = 0,
    /// Theme synchronization. Currently inert; the ordinal is reserved.
    SyncTheme = 1,
    /// The page navigated away from the chat route; hide the keyboard.
    DismissKeyboard = 2,
    /// Horizontal in-page scrolling began; suspend gesture recognition.
    ScrollStarted = 3,
    /// Horizontal in-page scrolling settled; resume gesture recognition.
    ScrollEnded = 4,
    /// The page requests a full surface reload.
    ReloadPage = 5,
    /// The bootstrap ran; the host should push the behavior payload.
    ReadyForScript = 6,
}

impl From<MessageKind> for u8 {
    #[inline]
    fn from(kind: MessageKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::QueryDrawerOpen),
            1 => Ok(Self::SyncTheme),
            2 => Ok(Self::DismissKeyboard),
            3 => Ok(Self::ScrollStarted),
            4 => Ok(Self::ScrollEnded),
            5 => Ok(Self::ReloadPage),
            6 => Ok(Self::ReadyForScript),
            other => Err(format!("unknown message kind ordinal: {other}")),
        }
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// A message unit exchanged across the bridge.
///
/// Envelopes are immutable and serialized as JSON text. Exactly one `type`
/// per envelope; `value` and `id` are present only where §3 of the design
/// gives them meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message kind discriminant.
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Payload. Only meaningful on drawer-state responses (boolean).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Correlation id. Present only on query responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QueryId>,
}

impl Envelope {
    /// Creates a plain event envelope with no payload.
    #[inline]
    #[must_use]
    pub fn event(kind: MessageKind) -> Self {
        Self {
            kind,
            value: None,
            id: None,
        }
    }

    /// Creates a drawer-state response for the query `id`.
    #[inline]
    #[must_use]
    pub fn drawer_state(id: QueryId, open: bool) -> Self {
        Self {
            kind: MessageKind::QueryDrawerOpen,
            value: Some(Value::Bool(open)),
            id: Some(id),
        }
    }

    /// Returns `true` if this envelope is a query response.
    #[inline]
    #[must_use]
    pub fn is_response(&self) -> bool {
        self.kind == MessageKind::QueryDrawerOpen
    }

    /// Returns the boolean payload, defaulting to `false`.
    #[inline]
    #[must_use]
    pub fn bool_value(&self) -> bool {
        self.value
            .as_ref()
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Serializes the envelope to its wire text.
    ///
    /// Serialization of an envelope cannot fail in practice; the fallback
    /// emits a bare `{"type": N}` event.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{{\"type\":{}}}", u8::from(self.kind)))
    }

    /// Parses an envelope from its wire text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Envelope`] if the payload is not a valid envelope.
    /// Callers on the hot path log and drop these; they never propagate.
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
