//! Content-side runtime.
//!
//! Everything in this module runs conceptually inside the embedded content
//! surface's execution context: it sees the page through the narrow
//! [`PageDom`] contract and reaches the host only through the outbound
//! [`MessagePort`](crate::transport::MessagePort).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dom` | Structural contract with the hosted page |
//! | `navigation` | Mutation-driven, frame-coalesced route detection |
//! | `runtime` | Command dispatch, init latch, recovery timer |
//! | `scroll` | Horizontal scroll start/end debounce |

// ============================================================================
// Submodules
// ============================================================================

/// Structural contract with the hosted page.
pub mod dom;

/// In-page navigation detection.
pub mod navigation;

/// Command dispatch and runtime lifecycle.
pub mod runtime;

/// Horizontal scroll detection.
pub mod scroll;

// ============================================================================
// Re-exports
// ============================================================================

pub use dom::{AffordanceAction, PageDom};
pub use navigation::{CHAT_ROUTE, NavigationWatcher, SETTLE_DELAY};
pub use runtime::{ContentRuntime, RECOVERY_INTERVAL, ScriptMode};
pub use scroll::{SCROLL_END_DEBOUNCE, ScrollMonitor};
