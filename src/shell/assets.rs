//! Enhancement assets and injected script construction.
//!
//! The enhancement layer reaches the page as two text resources — a behavior
//! script and a stylesheet — combined into one injected payload. Production
//! fetches them from the published remote location with a cache-defeating
//! version tag; development reads them from a local bundle directory so
//! edits land on the next reload.
//!
//! # Injection Flow
//!
//! 1. Surface boots with [`bootstrap_script`]
//! 2. Bootstrap posts `ReadyForScript` once the page load completes
//! 3. Shell fetches both resources and injects [`enhancement_script`]
//! 4. The payload's trailing `load` dispatch initializes the content runtime

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::content::ScriptMode;
use crate::error::{Error, Result};
use crate::identifiers::VersionToken;
use crate::protocol::{ContentCommand, Envelope, MessageKind};
use crate::transport::command_script;

// ============================================================================
// Constants
// ============================================================================

/// Published location of the enhancement assets.
pub const DEFAULT_ASSET_BASE: &str =
    "https://raw.githubusercontent.com/webview-shell/webview-shell/master/assets/";

/// Behavior script file name under the asset base.
pub const BEHAVIOR_SCRIPT_FILE: &str = "enhance.js";

/// Stylesheet file name under the asset base.
pub const STYLESHEET_FILE: &str = "enhance.css";

/// Outbound message global the bootstrap posts through.
const PORT_GLOBAL: &str = "__shellPort";

/// On-page debug console loaded by the development bootstrap.
const DEBUG_CONSOLE_URL: &str = "https://cdn.jsdelivr.net/npm/eruda";

// ============================================================================
// AssetSource
// ============================================================================

/// Source of the two enhancement text resources.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Retrieves the behavior script text.
    async fn behavior_script(&self, ver: &VersionToken) -> Result<String>;

    /// Retrieves the stylesheet text.
    async fn stylesheet(&self, ver: &VersionToken) -> Result<String>;
}

// ============================================================================
// RemoteAssets
// ============================================================================

/// Production asset source: HTTP fetch from a versioned location.
pub struct RemoteAssets {
    /// Base URL the resource files live under.
    base: Url,
    /// Shared HTTP client.
    client: reqwest::Client,
}

impl RemoteAssets {
    /// Creates a source rooted at `base`.
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    /// Creates a source rooted at the published default location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the compiled-in default fails to
    /// parse (which would be a packaging defect).
    pub fn published() -> Result<Self> {
        Ok(Self::new(Url::parse(DEFAULT_ASSET_BASE)?))
    }

    /// Builds the versioned URL for one resource file.
    fn resource_url(&self, file: &str, ver: &VersionToken) -> Result<Url> {
        let mut url = self.base.join(file)?;
        url.set_query(Some(&format!("t={ver}")));
        Ok(url)
    }

    /// Fetches one resource as text.
    async fn fetch(&self, file: &str, ver: &VersionToken) -> Result<String> {
        let url = self.resource_url(file, ver)?;
        debug!(url = %url, "Fetching enhancement asset");

        let text = self
            .client
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(text)
    }
}

#[async_trait]
impl AssetSource for RemoteAssets {
    async fn behavior_script(&self, ver: &VersionToken) -> Result<String> {
        self.fetch(BEHAVIOR_SCRIPT_FILE, ver).await
    }

    async fn stylesheet(&self, ver: &VersionToken) -> Result<String> {
        self.fetch(STYLESHEET_FILE, ver).await
    }
}

// ============================================================================
// LocalAssets
// ============================================================================

/// Development asset source: files read from a local bundle directory.
pub struct LocalAssets {
    /// Directory holding the resource files.
    dir: PathBuf,
}

impl LocalAssets {
    /// Creates a source reading from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads one resource as text.
    async fn read(&self, file: &str) -> Result<String> {
        let path = self.dir.join(file);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::asset_fetch(file, format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl AssetSource for LocalAssets {
    async fn behavior_script(&self, _ver: &VersionToken) -> Result<String> {
        self.read(BEHAVIOR_SCRIPT_FILE).await
    }

    async fn stylesheet(&self, _ver: &VersionToken) -> Result<String> {
        self.read(STYLESHEET_FILE).await
    }
}

// ============================================================================
// Script Construction
// ============================================================================

/// Builds the bootstrap script the surface boots with.
///
/// Production posts `ReadyForScript` once the window load completes. The
/// development variant first loads the on-page debug console, then posts.
/// Every step is wrapped in local try/catch: a bootstrap failure must leave
/// the page usable without the enhancement layer.
#[must_use]
pub fn bootstrap_script(mode: ScriptMode) -> String {
    let ready = ready_post_fragment();

    let body = match mode {
        ScriptMode::Production => ready,
        ScriptMode::Development => DEBUG_CONSOLE_TEMPLATE
            .replace("$CONSOLE_URL", DEBUG_CONSOLE_URL)
            .replace("$READY_POST", &ready),
    };

    BOOTSTRAP_TEMPLATE.replace("$BODY", &body)
}

/// Builds the combined enhancement payload.
///
/// Style element construction, the behavior script verbatim, and the final
/// `load` dispatch carrying the version token, in that order.
///
/// # Errors
///
/// Returns [`Error::Json`] if the trailing load command fails to encode.
pub fn enhancement_script(
    stylesheet: &str,
    behavior: &str,
    ver: &VersionToken,
) -> Result<String> {
    let load = command_script(&ContentCommand::load(ver.clone()))?;

    Ok(ENHANCEMENT_TEMPLATE
        .replace("$CSS_TEXT", &json_string(stylesheet))
        .replace("$BEHAVIOR", behavior)
        .replace("$LOAD_DISPATCH", &load))
}

/// Fragment posting the readiness envelope through the outbound global.
fn ready_post_fragment() -> String {
    let envelope = Envelope::event(MessageKind::ReadyForScript).encode();
    format!("window.{PORT_GLOBAL}.postMessage(JSON.stringify({envelope}));")
}

/// Escapes a string for safe embedding in a script literal.
pub(crate) fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

// ============================================================================
// Templates
// ============================================================================

/// Outer bootstrap wrapper: defer until window load, isolate failures.
const BOOTSTRAP_TEMPLATE: &str = r#"
try {
  window.addEventListener('load', () => {
    try {
      $BODY
    } catch (error) {
      console.error(error);
    }
  });
} catch (error) {
  console.error(error);
}
"#;

/// Development-only debug console loader.
const DEBUG_CONSOLE_TEMPLATE: &str = r#"
var script = document.createElement('script');
script.src = '$CONSOLE_URL';
document.body.appendChild(script);
script.onload = () => {
  try {
    eruda.init();
    $READY_POST
  } catch (error) {
    console.error(error);
  }
};
"#;

/// Combined enhancement payload.
const ENHANCEMENT_TEMPLATE: &str = r#"
var style = document.createElement('style');
style.textContent = $CSS_TEXT;
document.head.appendChild(style);

$BEHAVIOR

$LOAD_DISPATCH
"#;

// ============================================================================
// Tests
// ============================================================================
