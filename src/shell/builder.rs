//! Builder pattern for shell configuration.
//!
//! Provides a fluent API for configuring and creating [`Shell`] instances.
//!
//! # Example
//!
//! ```ignore
//! use webview_shell::Shell;
//!
//! let shell = Shell::builder()
//!     .surface(surface)
//!     .native(native)
//!     .build()?;
//! shell.start();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::content::ScriptMode;
use crate::error::{Error, Result};
use crate::shell::assets::{AssetSource, LocalAssets, RemoteAssets};
use crate::shell::native::{NativeHost, Theme};
use crate::transport::ContentSurface;

use super::core::Shell;

// ============================================================================
// Constants
// ============================================================================

/// Destination loaded once at startup.
pub const DEFAULT_DESTINATION: &str = "https://chat.openai.com/auth/ext_callback?next=";

// ============================================================================
// ShellBuilder
// ============================================================================

/// Builder for configuring a [`Shell`] instance.
///
/// Use [`Shell::builder()`] to create a new builder.
#[derive(Default)]
pub struct ShellBuilder {
    /// Embedded browser surface.
    surface: Option<Arc<dyn ContentSurface>>,
    /// Native affordances.
    native: Option<Arc<dyn NativeHost>>,
    /// Destination override.
    destination: Option<String>,
    /// Asset source override.
    assets: Option<Arc<dyn AssetSource>>,
    /// Local bundle directory selecting development mode.
    dev_bundle: Option<PathBuf>,
    /// Initial system theme.
    theme: Theme,
}

// ============================================================================
// ShellBuilder Implementation
// ============================================================================

impl ShellBuilder {
    /// Creates a new shell builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the embedded browser surface.
    #[inline]
    #[must_use]
    pub fn surface(mut self, surface: Arc<dyn ContentSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Sets the native affordances.
    #[inline]
    #[must_use]
    pub fn native(mut self, native: Arc<dyn NativeHost>) -> Self {
        self.native = Some(native);
        self
    }

    /// Overrides the destination URL.
    #[inline]
    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Overrides the asset source.
    #[inline]
    #[must_use]
    pub fn assets(mut self, assets: Arc<dyn AssetSource>) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Selects development mode with assets read from `bundle_dir`.
    #[inline]
    #[must_use]
    pub fn development(mut self, bundle_dir: impl Into<PathBuf>) -> Self {
        self.dev_bundle = Some(bundle_dir.into());
        self
    }

    /// Sets the initial system theme.
    #[inline]
    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Builds the shell with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if surface or native affordances are not set
    /// - [`Error::InvalidUrl`] if the destination does not parse
    pub fn build(self) -> Result<Shell> {
        let (mode, assets) = self.resolve_assets()?;

        let surface = self.surface.ok_or_else(|| {
            Error::config(
                "Content surface is required. Use .surface() to supply the \
                 platform's embedded browser view.",
            )
        })?;
        let native = self.native.ok_or_else(|| {
            Error::config(
                "Native affordances are required. Use .native() to supply the \
                 platform's chrome/keyboard/exit hooks.",
            )
        })?;

        let destination = Url::parse(
            self.destination
                .as_deref()
                .unwrap_or(DEFAULT_DESTINATION),
        )?;

        Ok(Shell::new(
            surface,
            native,
            assets,
            destination,
            mode,
            self.theme,
        ))
    }

    /// Resolves script mode and asset source from the configuration.
    fn resolve_assets(&self) -> Result<(ScriptMode, Arc<dyn AssetSource>)> {
        if let Some(dir) = &self.dev_bundle {
            let source: Arc<dyn AssetSource> = match &self.assets {
                Some(assets) => Arc::clone(assets),
                None => Arc::new(LocalAssets::new(dir.clone())),
            };
            return Ok((ScriptMode::Development, source));
        }

        let source: Arc<dyn AssetSource> = match &self.assets {
            Some(assets) => Arc::clone(assets),
            None => Arc::new(RemoteAssets::published()?),
        };
        Ok((ScriptMode::Production, source))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::shell::core::tests_support::{NullNative, NullSurface};

    fn surface() -> Arc<dyn ContentSurface> {
        Arc::new(NullSurface)
    }

    fn native() -> Arc<dyn NativeHost> {
        Arc::new(NullNative)
    }

    #[test]
    fn test_build_fails_without_surface() {
        let result = ShellBuilder::new().native(native()).build();
        let err = result.expect_err("missing surface");
        assert!(err.to_string().contains("surface"));
    }

    #[test]
    fn test_build_fails_without_native() {
        let result = ShellBuilder::new().surface(surface()).build();
        let err = result.expect_err("missing native");
        assert!(err.to_string().contains("Native"));
    }

    #[test]
    fn test_build_rejects_bad_destination() {
        let result = ShellBuilder::new()
            .surface(surface())
            .native(native())
            .destination("not a url")
            .build();

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_default_destination() {
        let shell = ShellBuilder::new()
            .surface(surface())
            .native(native())
            .build()
            .expect("build");

        assert_eq!(shell.destination().as_str(), DEFAULT_DESTINATION);
    }

    #[test]
    fn test_development_selects_dev_mode() {
        let shell = ShellBuilder::new()
            .surface(surface())
            .native(native())
            .development("/tmp/bundle")
            .build()
            .expect("build");

        assert_eq!(shell.mode(), ScriptMode::Development);
    }

    #[test]
    fn test_default_mode_is_production() {
        let shell = ShellBuilder::new()
            .surface(surface())
            .native(native())
            .build()
            .expect("build");

        assert_eq!(shell.mode(), ScriptMode::Production);
    }
}
