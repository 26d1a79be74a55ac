//! Shell coordinator.
//!
//! The [`Shell`] owns the embedded surface reference, translates inbound
//! envelopes into native actions, and manages script bootstrapping. The
//! embedding platform feeds it lifecycle events (`on_content_loaded`,
//! `on_system_theme_changed`, `on_navigation_state_changed`), raw input
//! (`on_drag`, `handle_back`) and the surface's posted messages
//! (`on_message`).
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
//!
//! shell.start();
//! // platform wiring:
//! //   surface message   -> shell.on_message(raw)
//! //   load finished     -> shell.on_content_loaded()
//! //   hardware back     -> shell.handle_back().await
//! //   pan gesture       -> shell.on_drag(dx, dy)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::content::ScriptMode;
use crate::gesture::{GestureRecognizer, ScrollGate, SwipeIntent};
use crate::identifiers::VersionToken;
use crate::protocol::{ContentCommand, MessageKind};
use crate::transport::{Bridge, ContentSurface};

use super::assets::{AssetSource, bootstrap_script, enhancement_script};
use super::builder::ShellBuilder;
use super::native::{NativeHost, Theme};
use super::useragent::user_agent_for;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the shell.
struct ShellInner {
    /// Embedded browser surface.
    surface: Arc<dyn ContentSurface>,

    /// Native affordances.
    native: Arc<dyn NativeHost>,

    /// Host endpoint of the bridge.
    bridge: Bridge,

    /// Enhancement asset source.
    assets: Arc<dyn AssetSource>,

    /// Destination loaded once at startup.
    destination: Url,

    /// Script mode (fixed at build time).
    mode: ScriptMode,

    /// Scroll flag shared with the gesture recognizer.
    gate: ScrollGate,

    /// Drag classification and throttling.
    recognizer: GestureRecognizer,

    /// Latch: content load handled once per surface lifetime.
    loaded: AtomicBool,

    /// Current system theme.
    theme: Mutex<Theme>,

    /// Currently selected client identity.
    user_agent: Mutex<&'static str>,
}

// ============================================================================
// Shell
// ============================================================================

/// Host shell controller.
///
/// Cloneable handle over shared state; clones are cheap and all refer to the
/// same shell.
#[derive(Clone)]
pub struct Shell {
    /// Shared inner state.
    inner: Arc<ShellInner>,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("destination", &self.inner.destination.as_str())
            .field("mode", &self.inner.mode)
            .field("loaded", &self.inner.loaded.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Shell - Construction
// ============================================================================

impl Shell {
    /// Creates a configuration builder for the shell.
    #[inline]
    #[must_use]
    pub fn builder() -> ShellBuilder {
        ShellBuilder::new()
    }

    /// Creates a new shell instance.
    pub(crate) fn new(
        surface: Arc<dyn ContentSurface>,
        native: Arc<dyn NativeHost>,
        assets: Arc<dyn AssetSource>,
        destination: Url,
        mode: ScriptMode,
        theme: Theme,
    ) -> Self {
        let gate = ScrollGate::new();

        Self {
            inner: Arc::new(ShellInner {
                bridge: Bridge::new(Arc::clone(&surface)),
                recognizer: GestureRecognizer::new(gate.clone()),
                surface,
                native,
                assets,
                destination,
                mode,
                gate,
                loaded: AtomicBool::new(false),
                theme: Mutex::new(theme),
                user_agent: Mutex::new(user_agent_for("")),
            }),
        }
    }
}

// ============================================================================
// Shell - Accessors
// ============================================================================

impl Shell {
    /// Returns the startup destination.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &Url {
        &self.inner.destination
    }

    /// Returns the script mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ScriptMode {
        self.inner.mode
    }

    /// Returns the currently selected client identity.
    #[inline]
    #[must_use]
    pub fn user_agent(&self) -> &'static str {
        *self.inner.user_agent.lock()
    }

    /// Returns `true` while the page is mid horizontal scroll.
    #[inline]
    #[must_use]
    pub fn is_content_scrolling(&self) -> bool {
        self.inner.gate.is_active()
    }
}

// ============================================================================
// Shell - Lifecycle
// ============================================================================

impl Shell {
    /// Boots the surface: selects the client identity for the destination
    /// and loads it with the bootstrap script.
    ///
    /// Called once; the shell never navigates afterwards — only the content
    /// surface's own internal navigation moves the page.
    pub fn start(&self) {
        let destination = &self.inner.destination;
        let user_agent = user_agent_for(destination.as_str());

        *self.inner.user_agent.lock() = user_agent;
        self.inner.surface.set_user_agent(user_agent);

        info!(destination = %destination, mode = ?self.inner.mode, "Starting shell");
        self.inner
            .surface
            .load(destination, &bootstrap_script(self.inner.mode));
    }

    /// Handles content load completion.
    ///
    /// Latched: only the first call requests focus and synchronizes the
    /// chrome color; repeated load events are ignored.
    pub fn on_content_loaded(&self) {
        if self.inner.loaded.swap(true, Ordering::SeqCst) {
            trace!("Repeated load event ignored");
            return;
        }

        debug!("Content loaded; focusing surface and syncing chrome");
        self.inner.surface.request_focus();

        let theme = *self.inner.theme.lock();
        self.inner.native.set_chrome_color(theme.chrome_color());
    }

    /// Handles a system theme change.
    ///
    /// Resynchronizes the native chrome only; the theme is deliberately not
    /// propagated into the content (the `SyncTheme` path is stubbed out).
    pub fn on_system_theme_changed(&self, theme: Theme) {
        *self.inner.theme.lock() = theme;
        debug!(?theme, "System theme changed");
        self.inner.native.set_chrome_color(theme.chrome_color());
    }

    /// Handles a navigation state change in the surface.
    ///
    /// Reselects the impersonated client identity by substring match; no
    /// other request manipulation occurs.
    pub fn on_navigation_state_changed(&self, url: &str) {
        let user_agent = user_agent_for(url);

        let changed = {
            let mut current = self.inner.user_agent.lock();
            let changed = *current != user_agent;
            *current = user_agent;
            changed
        };

        if changed {
            debug!(url, "Client identity reselected");
        }
        self.inner.surface.set_user_agent(user_agent);
    }
}

// ============================================================================
// Shell - Inbound Envelopes
// ============================================================================

impl Shell {
    /// Handles one raw message posted by the content surface.
    ///
    /// Malformed envelopes are logged and dropped; nothing here can crash
    /// the controller.
    pub fn on_message(&self, raw: &str) {
        let Some(envelope) = self.inner.bridge.decode(raw) else {
            return;
        };

        trace!(kind = ?envelope.kind, "Envelope received");

        match envelope.kind {
            MessageKind::ReadyForScript => {
                debug!("Content ready; loading enhancement payload");
                tokio::spawn(self.clone().load_enhancement());
            }

            MessageKind::ReloadPage => {
                debug!("Reload requested by content");
                self.inner.surface.reload();
            }

            // Deliberately inert; the ordinal is reserved.
            MessageKind::SyncTheme => trace!("Theme sync is disabled"),

            MessageKind::DismissKeyboard => {
                debug!("Dismissing keyboard via proxy input");
                self.inner.native.focus_keyboard_proxy();
                self.inner.native.blur_keyboard_proxy();
            }

            MessageKind::ScrollStarted => self.inner.gate.set(true),
            MessageKind::ScrollEnded => self.inner.gate.set(false),

            MessageKind::QueryDrawerOpen => match envelope.id {
                Some(id) => self.inner.bridge.resolve_query(id, envelope.bool_value()),
                None => warn!("Drawer response without correlation id dropped"),
            },
        }
    }

    /// Fetches both enhancement assets and injects the combined payload.
    ///
    /// Failures are logged and abandoned — no retry; the page runs without
    /// the enhancement layer until the next reload.
    async fn load_enhancement(self) {
        let ver = match self.inner.mode {
            ScriptMode::Development => VersionToken::dev(),
            ScriptMode::Production => VersionToken::now(),
        };

        let behavior = match self.inner.assets.behavior_script(&ver).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Behavior script fetch failed; enhancement skipped");
                return;
            }
        };

        let stylesheet = match self.inner.assets.stylesheet(&ver).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Stylesheet fetch failed; enhancement skipped");
                return;
            }
        };

        match enhancement_script(&stylesheet, &behavior, &ver) {
            Ok(script) => {
                info!(ver = %ver, "Injecting enhancement payload");
                self.inner.surface.inject_script(&script);
            }
            Err(e) => warn!(error = %e, "Enhancement payload construction failed"),
        }
    }
}

// ============================================================================
// Shell - Input
// ============================================================================

impl Shell {
    /// Handles a hardware back signal.
    ///
    /// Queries drawer state (10 s deadline, defaulting to closed); closes
    /// the drawer if open, exits the application otherwise. Always returns
    /// `true`: the platform's default back behavior is suppressed.
    pub async fn handle_back(&self) -> bool {
        let open = self.inner.bridge.query_drawer_open().await;

        if open {
            debug!("Back: closing drawer");
            self.inner.bridge.send(&ContentCommand::CloseDrawer);
        } else {
            info!("Back: exiting application");
            self.inner.native.exit_app();
        }

        true
    }

    /// Feeds one drag delta from the platform's pan gesture.
    ///
    /// Recognized, throttle-passing drags dispatch a drawer command.
    pub fn on_drag(&self, dx: f64, dy: f64) {
        match self.inner.recognizer.on_drag(dx, dy) {
            Some(SwipeIntent::OpenDrawer) => self.inner.bridge.send(&ContentCommand::OpenDrawer),
            Some(SwipeIntent::CloseDrawer) => self.inner.bridge.send(&ContentCommand::CloseDrawer),
            None => {}
        }
    }
}

// ============================================================================
// Test Support
// ============================================================================


// ============================================================================
// Tests
// ============================================================================
