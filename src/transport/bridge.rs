//! Host side of the bridge: command injection and envelope routing.
//!
//! The bridge turns [`ContentCommand`]s into guarded script fragments,
//! decodes inbound envelope text, and correlates drawer-state queries with
//! their responses.
//!
//! # Query Correlation
//!
//! Every `checkIsOpen` command carries a monotonic
//! [`QueryId`](crate::identifiers::QueryId); the response echoes it. Waiting
//! callers live in a pending map keyed by id, so a late answer to a
//! superseded or timed-out query finds no waiter and is dropped instead of
//! resolving the wrong caller.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::identifiers::QueryId;
use crate::protocol::{ContentCommand, Envelope};

use super::surface::ContentSurface;

// ============================================================================
// Constants
// ============================================================================

/// Deadline for a drawer-state query before it resolves to "closed".
///
/// Prevents the back-button flow from hanging when the content surface is
/// unresponsive.
pub const DRAWER_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Global the injected runtime installs itself under.
const RUNTIME_GLOBAL: &str = "__shellRuntime";

// ============================================================================
// Types
// ============================================================================

/// Map of query ids to response channels.
type PendingQueries = FxHashMap<QueryId, oneshot::Sender<bool>>;

// ============================================================================
// Script Encoding
// ============================================================================

/// Builds the guarded dispatch fragment for a command.
///
/// The guard makes injection into a page where the runtime is not (yet)
/// installed harmless: the fragment evaluates to nothing.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the command fails to
/// serialize.
pub fn command_script(command: &ContentCommand) -> Result<String> {
    let json = command.encode()?;
    Ok(format!(
        "if (window.{RUNTIME_GLOBAL}) {{ window.{RUNTIME_GLOBAL}.dispatch({json}) }}"
    ))
}

// ============================================================================
// Bridge
// ============================================================================

/// Host-owned bridge endpoint.
///
/// Owns the pending-query map and the surface reference used for command
/// injection. Cloneable and shareable across tasks; all operations are
/// non-blocking except the query itself.
pub struct Bridge {
    /// Surface commands are injected into.
    surface: Arc<dyn ContentSurface>,
    /// Pending drawer-state queries by correlation id.
    pending: Mutex<PendingQueries>,
}

impl Bridge {
    /// Creates a bridge for the given surface.
    #[must_use]
    pub fn new(surface: Arc<dyn ContentSurface>) -> Self {
        Self {
            surface,
            pending: Mutex::new(PendingQueries::default()),
        }
    }

    /// Injects a command into the content surface, fire-and-forget.
    ///
    /// Encoding failures are logged and dropped; there is nothing to retry
    /// and no caller to surface them to.
    pub fn send(&self, command: &ContentCommand) {
        match command_script(command) {
            Ok(script) => {
                trace!(command = command.wire_name(), "Injecting command");
                self.surface.inject_script(&script);
            }
            Err(e) => warn!(command = command.wire_name(), error = %e, "Failed to encode command"),
        }
    }

    /// Queries drawer state with the default deadline.
    ///
    /// Resolves to `false` (closed) when no response arrives in time, so the
    /// back-button flow always terminates.
    pub async fn query_drawer_open(&self) -> bool {
        self.query_drawer_open_with_timeout(DRAWER_QUERY_TIMEOUT)
            .await
    }

    /// Queries drawer state with a custom deadline.
    pub async fn query_drawer_open_with_timeout(&self, deadline: Duration) -> bool {
        let id = QueryId::next();
        let (tx, rx) = oneshot::channel();

        self.pending.lock().insert(id, tx);
        self.send(&ContentCommand::QueryDrawerOpen { id });
        debug!(query_id = %id, "Drawer-state query sent");

        match timeout(deadline, rx).await {
            Ok(Ok(open)) => {
                debug!(query_id = %id, open, "Drawer-state query answered");
                open
            }
            Ok(Err(_)) => {
                // Sender dropped without answering; treat as closed.
                debug!(query_id = %id, "Drawer-state query abandoned");
                false
            }
            Err(_) => {
                // Timeout - clean up the pending entry so a late answer
                // finds no waiter.
                self.pending.lock().remove(&id);
                debug!(
                    query_id = %id,
                    timeout_ms = deadline.as_millis() as u64,
                    "Drawer-state query timed out; defaulting to closed"
                );
                false
            }
        }
    }

    /// Decodes inbound envelope text.
    ///
    /// Malformed payloads are logged and dropped, never propagated: one bad
    /// message must not crash the controller.
    #[must_use]
    pub fn decode(&self, raw: &str) -> Option<Envelope> {
        match Envelope::decode(raw) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                warn!(error = %e, "Dropping malformed envelope");
                None
            }
        }
    }

    /// Resolves the pending query registered under `id`.
    ///
    /// Answers without a waiter (superseded or timed out) are dropped.
    pub fn resolve_query(&self, id: QueryId, open: bool) {
        let waiter = self.pending.lock().remove(&id);

        match waiter {
            Some(tx) => {
                let _ = tx.send(open);
            }
            None => debug!(query_id = %id, "Response for unknown or expired query"),
        }
    }

    /// Returns the number of queries awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

// ============================================================================
// Tests
// ============================================================================
