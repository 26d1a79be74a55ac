//! Bridge transport layer.
//!
//! This module carries envelopes between the native host and the runtime
//! inside the embedded content surface.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   inject_script (commands)   ┌──────────────────┐
//! │  Shell (host)   │ ───────────────────────────► │  Content surface │
//! │                 │                              │  (page runtime)  │
//! │  Bridge         │ ◄─────────────────────────── │                  │
//! └─────────────────┘     post (envelopes)         └──────────────────┘
//! ```
//!
//! Both primitives are fire-and-forget. There is no shared memory between
//! the two sides; every state transfer is a posted envelope or an injected
//! script literal. The only correlated exchange is the drawer-state query,
//! tracked by a pending map keyed on
//! [`QueryId`](crate::identifiers::QueryId).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `bridge` | Command encoding, envelope decode, query correlation |
//! | `surface` | Traits the embedding platform implements |

// ============================================================================
// Submodules
// ============================================================================

/// Command encoding, envelope decode, and query correlation.
pub mod bridge;

/// Traits the embedding platform implements.
pub mod surface;

// ============================================================================
// Re-exports
// ============================================================================

pub use bridge::{Bridge, DRAWER_QUERY_TIMEOUT, command_script};
pub use surface::{ChannelPort, ContentSurface, MessagePort};
