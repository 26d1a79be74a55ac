//! WebView Shell - native shell around a single hosted web app.
//!
//! This library wraps one remote web application in an embedded browser
//! surface and augments it with native gestures, lifecycle handling, and
//! cosmetic DOM modifications. Its core is the bidirectional message bridge
//! between the native host and the runtime injected into the content
//! surface, and the gesture-to-state-query protocol carried over it.
//!
//! # Architecture
//!
//! Two independent single-threaded execution contexts with no shared memory:
//!
//! - **Host shell (native)**: owns the surface, reacts to envelopes, drives
//!   gestures, back handling, theme sync, and script bootstrapping.
//! - **Content runtime (in-page)**: observes the page DOM, answers drawer
//!   queries, emits envelopes on state changes.
//!
//! Every state transfer is either a posted envelope (content → host) or an
//! injected script literal (host → content), fire-and-forget in both
//! directions. The only correlated exchange is the drawer-state query,
//! matched by a monotonic id and raced against a 10-second deadline.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use webview_shell::{Shell, Theme};
//!
//! #[tokio::main]
//! async fn main() -> webview_shell::Result<()> {
//!     // `surface` and `native` are the platform's WebView and chrome hooks.
//!     let shell = Shell::builder()
//!         .surface(surface)
//!         .native(native)
//!         .theme(Theme::Dark)
//!         .build()?;
//!
//!     shell.start();
//!
//!     // Platform wiring:
//!     //   posted message  -> shell.on_message(raw)
//!     //   load finished   -> shell.on_content_loaded()
//!     //   hardware back   -> shell.handle_back().await
//!     //   pan gesture     -> shell.on_drag(dx, dy)
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`content`] | Content-side runtime: DOM contract, observers, dispatch |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`gesture`] | Drag classification and throttled drawer intents |
//! | [`identifiers`] | Type-safe id and version-token wrappers |
//! | [`protocol`] | Envelope and command wire types |
//! | [`shell`] | Host controller, builder, assets, native seams |
//! | [`transport`] | The two fire-and-forget bridge primitives |

// ============================================================================
// Modules
// ============================================================================

/// Content-side runtime.
///
/// Runs conceptually inside the content surface's execution context; sees
/// the page only through the [`PageDom`] contract.
pub mod content;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Drawer gesture recognition.
pub mod gesture;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing incompatible values at compile time.
pub mod identifiers;

/// Bridge message types.
///
/// Wire format shared by both sides of the bridge.
pub mod protocol;

/// Host shell controller.
pub mod shell;

/// Bridge transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Content types
pub use content::{
    AffordanceAction, ContentRuntime, NavigationWatcher, PageDom, ScriptMode, ScrollMonitor,
};

// Error types
pub use error::{Error, Result};

// Gesture types
pub use gesture::{GestureRecognizer, SWIPE_THRESHOLD, ScrollGate, SwipeIntent};

// Identifier types
pub use identifiers::{QueryId, VersionToken};

// Protocol types
pub use protocol::{ContentCommand, Envelope, MessageKind};

// Shell types
pub use shell::{
    AssetSource, LocalAssets, NativeHost, RemoteAssets, Shell, ShellBuilder, Theme,
};

// Transport types
pub use transport::{Bridge, ChannelPort, ContentSurface, DRAWER_QUERY_TIMEOUT, MessagePort};
