//! Host shell controller.
//!
//! The shell owns the embedded surface, routes inbound envelopes to native
//! actions, bootstraps the enhancement layer, and handles native input
//! (hardware back, pan gestures).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `assets` | Enhancement asset retrieval and script construction |
//! | `builder` | Validated shell configuration |
//! | `core` | The [`Shell`] coordinator |
//! | `native` | Native affordances and theme colors |
//! | `useragent` | Impersonated client identity selection |

// ============================================================================
// Submodules
// ============================================================================

/// Enhancement assets and injected script construction.
pub mod assets;

/// Builder pattern for shell configuration.
pub mod builder;

/// Shell coordinator.
pub mod core;

/// Native affordances and theme colors.
pub mod native;

/// Impersonated client identity selection.
pub mod useragent;

// ============================================================================
// Re-exports
// ============================================================================

pub use assets::{AssetSource, DEFAULT_ASSET_BASE, LocalAssets, RemoteAssets};
pub use builder::{DEFAULT_DESTINATION, ShellBuilder};
pub use core::Shell;
pub use native::{COLOR_DARK, COLOR_LIGHT, NativeHost, Theme};
pub use useragent::{UA_ANDROID_CHROME, UA_IPHONE_SAFARI, user_agent_for};
