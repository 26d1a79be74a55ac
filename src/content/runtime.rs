//! The content-side runtime.
//!
//! One [`ContentRuntime`] instance exists per page load, explicitly
//! constructed and owning its own dispatch table — no ambient global state
//! beyond the single well-known handle the host's injected fragments call
//! into. It answers drawer queries, performs idempotent drawer toggles, and
//! wires the navigation and scroll observers.
//!
//! All DOM-touching handlers are locally failure-isolated: a page that no
//! longer matches the structural contract degrades one feature at a time,
//! never the whole enhancement layer.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::identifiers::{QueryId, VersionToken};
use crate::protocol::{ContentCommand, Envelope};
use crate::transport::MessagePort;

use super::dom::PageDom;
use super::navigation::{NavigationWatcher, ensure_refresh_affordance};
use super::scroll::ScrollMonitor;

// ============================================================================
// Constants
// ============================================================================

/// Interval between unconditional page reloads.
///
/// The upstream edge credential lasts about two hours from issue; reloading
/// hourly renews it with a conservative margin. This is a scheduled renewal,
/// not a reaction to failure.
pub const RECOVERY_INTERVAL: Duration = Duration::from_secs(3600);

/// Remote stylesheet location, tagged with the version token on append.
const REMOTE_STYLESHEET_URL: &str =
    "https://raw.githubusercontent.com/webview-shell/webview-shell/master/assets/enhance.css";

// ============================================================================
// ScriptMode
// ============================================================================

/// Script variant selected by the `load` command's version token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMode {
    /// Local assets, inline CSS, on-page debug console.
    Development,
    /// Remote assets with cache-busting stylesheet link.
    Production,
}

impl ScriptMode {
    /// Derives the mode from a version token.
    #[inline]
    #[must_use]
    pub fn from_token(token: &VersionToken) -> Self {
        if token.is_dev() {
            Self::Development
        } else {
            Self::Production
        }
    }
}

// ============================================================================
// ContentRuntime
// ============================================================================

/// Initialization state, set exactly once per page load.
struct RuntimeState {
    /// Mode selected by the first `load` command; `None` until then.
    mode: Option<ScriptMode>,
}

/// The runtime installed into the content surface's execution context.
pub struct ContentRuntime {
    /// Page document access.
    dom: Arc<dyn PageDom>,
    /// Outbound envelope channel.
    port: Arc<dyn MessagePort>,
    /// Navigation change detection.
    navigation: NavigationWatcher,
    /// Horizontal scroll detection.
    scroll: ScrollMonitor,
    /// Init-once latch and mode.
    state: Mutex<RuntimeState>,
}

impl ContentRuntime {
    /// Creates a runtime for the current page load.
    ///
    /// The runtime is inert until the host delivers the `load` command.
    #[must_use]
    pub fn new(dom: Arc<dyn PageDom>, port: Arc<dyn MessagePort>) -> Self {
        Self {
            navigation: NavigationWatcher::new(Arc::clone(&dom), Arc::clone(&port)),
            scroll: ScrollMonitor::new(Arc::clone(&port)),
            dom,
            port,
            state: Mutex::new(RuntimeState { mode: None }),
        }
    }

    /// Returns the mode selected at initialization, if any.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Option<ScriptMode> {
        self.state.lock().mode
    }

    // ========================================================================
    // Inbound Dispatch
    // ========================================================================

    /// Dispatches one inbound command payload.
    ///
    /// Malformed payloads are logged and dropped; one bad injection must not
    /// stop the runtime.
    pub fn dispatch(&self, raw: &str) {
        let command = match ContentCommand::decode(raw) {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "Dropping malformed command");
                return;
            }
        };

        debug!(command = command.wire_name(), "Dispatching command");

        match command {
            ContentCommand::OpenDrawer => self.handle_open_drawer(),
            ContentCommand::CloseDrawer => self.handle_close_drawer(),
            ContentCommand::QueryDrawerOpen { id } => self.handle_query(id),
            ContentCommand::Load { ver } => self.handle_load(&ver),
        }
    }

    /// Answers a drawer-state query.
    ///
    /// State is recomputed from the marker on every call, never cached. A
    /// failed lookup answers `false` so the host's back flow terminates
    /// without waiting out its deadline.
    fn handle_query(&self, id: QueryId) {
        let open = self.dom.is_drawer_open().unwrap_or_else(|e| {
            warn!(error = %e, "Drawer marker lookup failed; answering closed");
            false
        });

        self.port.post(&Envelope::drawer_state(id, open).encode());
    }

    /// Opens the drawer unless it is already open.
    fn handle_open_drawer(&self) {
        match self.dom.is_drawer_open() {
            Ok(true) => debug!("Drawer already open"),
            Ok(false) => {
                if let Err(e) = self.dom.activate_drawer_toggle() {
                    warn!(error = %e, "Drawer toggle failed");
                }
            }
            Err(e) => warn!(error = %e, "Drawer marker lookup failed"),
        }
    }

    /// Closes the drawer unless it is already closed.
    fn handle_close_drawer(&self) {
        match self.dom.is_drawer_open() {
            Ok(false) => debug!("Drawer already closed"),
            Ok(true) => {
                if let Err(e) = self.dom.activate_drawer_toggle() {
                    warn!(error = %e, "Drawer toggle failed");
                }
            }
            Err(e) => warn!(error = %e, "Drawer marker lookup failed"),
        }
    }

    /// Initializes the runtime from the `load` command.
    ///
    /// Runs the full sequence exactly once per page load. Re-delivery only
    /// re-runs the idempotent affordance-insertion path; mode, stylesheet,
    /// and the recovery timer stay latched to the first delivery.
    fn handle_load(&self, ver: &VersionToken) {
        let first = {
            let mut state = self.state.lock();
            if state.mode.is_some() {
                false
            } else {
                state.mode = Some(ScriptMode::from_token(ver));
                true
            }
        };

        if !first {
            debug!("Runtime already initialized; re-ensuring affordance only");
            ensure_refresh_affordance(&self.dom, &self.port);
            return;
        }

        let mode = ScriptMode::from_token(ver);
        info!(?mode, ver = %ver, "Content runtime initializing");

        if mode == ScriptMode::Production {
            self.append_versioned_stylesheet(ver);
        }

        self.spawn_recovery_timer();
        ensure_refresh_affordance(&self.dom, &self.port);
    }

    // ========================================================================
    // Observer Entry Points
    // ========================================================================

    /// Records that DOM mutations occurred (see [`NavigationWatcher`]).
    #[inline]
    pub fn on_mutation(&self) {
        self.navigation.on_mutation();
    }

    /// Runs the per-frame coalesced location check.
    #[inline]
    pub fn on_frame(&self) {
        self.navigation.on_frame();
    }

    /// Feeds one scroll callback with its horizontal offset.
    #[inline]
    pub fn on_scroll(&self, horizontal_offset: f64) {
        self.scroll.on_scroll(horizontal_offset);
    }

    // ========================================================================
    // Initialization Steps
    // ========================================================================

    /// Appends the remote stylesheet with a cache-defeating version tag.
    ///
    /// Development builds skip this: the host already injected the CSS
    /// inline with the behavior payload.
    fn append_versioned_stylesheet(&self, ver: &VersionToken) {
        let href = format!("{REMOTE_STYLESHEET_URL}?t={ver}");
        match self.dom.append_stylesheet(&href) {
            Ok(()) => debug!(href = %href, "Stylesheet appended"),
            Err(e) => warn!(error = %e, "Stylesheet append failed"),
        }
    }

    /// Starts the hourly unconditional reload (see [`RECOVERY_INTERVAL`]).
    fn spawn_recovery_timer(&self) {
        let dom = Arc::clone(&self.dom);
        tokio::spawn(async move {
            loop {
                sleep(RECOVERY_INTERVAL).await;
                info!("Scheduled recovery reload");
                dom.reload();
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::mpsc::UnboundedReceiver;
    use url::Url;

    use crate::content::dom::AffordanceAction;
    use crate::error::Result;
    use crate::protocol::MessageKind;
    use crate::transport::ChannelPort;

    /// In-memory page document for runtime tests.
    #[derive(Default)]
    struct FakeDom {
        drawer_open: Mutex<bool>,
        toggles: AtomicUsize,
        affordance_present: Mutex<bool>,
        insertions: AtomicUsize,
        stylesheets: Mutex<Vec<String>>,
        reloads: AtomicUsize,
    }

    impl PageDom for FakeDom {
        fn is_drawer_open(&self) -> Result<bool> {
            Ok(*self.drawer_open.lock())
        }

        fn activate_drawer_toggle(&self) -> Result<()> {
            let mut open = self.drawer_open.lock();
            *open = !*open;
            self.toggles.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn has_refresh_affordance(&self) -> Result<bool> {
            Ok(*self.affordance_present.lock())
        }

        fn insert_refresh_affordance(&self, _on_activate: AffordanceAction) -> Result<()> {
            *self.affordance_present.lock() = true;
            self.insertions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn append_stylesheet(&self, href: &str) -> Result<()> {
            self.stylesheets.lock().push(href.to_string());
            Ok(())
        }

        fn location(&self) -> Result<Url> {
            Ok(Url::parse("https://app.example/chat").expect("valid url"))
        }

        fn reload(&self) {
            self.reloads.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn runtime() -> (ContentRuntime, Arc<FakeDom>, UnboundedReceiver<String>) {
        let dom = Arc::new(FakeDom::default());
        let (port, rx) = ChannelPort::unbounded();
        let runtime = ContentRuntime::new(
            Arc::clone(&dom) as Arc<dyn PageDom>,
            Arc::new(port),
        );
        (runtime, dom, rx)
    }

    fn dispatch(runtime: &ContentRuntime, command: &ContentCommand) {
        runtime.dispatch(&command.encode().expect("encode"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_is_idempotent() {
        let (runtime, dom, _rx) = runtime();

        dispatch(&runtime, &ContentCommand::OpenDrawer);
        assert_eq!(dom.toggles.load(Ordering::SeqCst), 1);
        assert!(*dom.drawer_open.lock());

        // Already open: must be a no-op.
        dispatch(&runtime, &ContentCommand::OpenDrawer);
        assert_eq!(dom.toggles.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent() {
        let (runtime, dom, _rx) = runtime();

        // Already closed: must be a no-op.
        dispatch(&runtime, &ContentCommand::CloseDrawer);
        assert_eq!(dom.toggles.load(Ordering::SeqCst), 0);

        *dom.drawer_open.lock() = true;
        dispatch(&runtime, &ContentCommand::CloseDrawer);
        assert_eq!(dom.toggles.load(Ordering::SeqCst), 1);
        assert!(!*dom.drawer_open.lock());
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_answers_with_correlated_envelope() {
        let (runtime, dom, mut rx) = runtime();
        *dom.drawer_open.lock() = true;

        let id = QueryId::next();
        dispatch(&runtime, &ContentCommand::QueryDrawerOpen { id });

        let raw = rx.try_recv().expect("response posted");
        let envelope = Envelope::decode(&raw).expect("valid envelope");
        assert_eq!(envelope.kind, MessageKind::QueryDrawerOpen);
        assert!(envelope.bool_value());
        assert_eq!(envelope.id, Some(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_recomputes_every_call() {
        let (runtime, dom, mut rx) = runtime();

        dispatch(&runtime, &ContentCommand::query());
        *dom.drawer_open.lock() = true;
        dispatch(&runtime, &ContentCommand::query());

        let first = Envelope::decode(&rx.try_recv().expect("first")).expect("valid");
        let second = Envelope::decode(&rx.try_recv().expect("second")).expect("valid");
        assert!(!first.bool_value());
        assert!(second.bool_value());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_production_appends_versioned_stylesheet() {
        let (runtime, dom, _rx) = runtime();

        dispatch(
            &runtime,
            &ContentCommand::load(VersionToken::from("1700000000000")),
        );

        assert_eq!(runtime.mode(), Some(ScriptMode::Production));
        let stylesheets = dom.stylesheets.lock().clone();
        assert_eq!(stylesheets.len(), 1);
        assert!(stylesheets[0].ends_with("?t=1700000000000"));
        assert_eq!(dom.insertions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_dev_skips_stylesheet() {
        let (runtime, dom, _rx) = runtime();

        dispatch(&runtime, &ContentCommand::load(VersionToken::dev()));

        assert_eq!(runtime.mode(), Some(ScriptMode::Development));
        assert!(dom.stylesheets.lock().is_empty());
        assert_eq!(dom.insertions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_load_only_reensures_affordance() {
        let (runtime, dom, _rx) = runtime();

        dispatch(&runtime, &ContentCommand::load(VersionToken::dev()));
        dispatch(
            &runtime,
            &ContentCommand::load(VersionToken::from("1700000000000")),
        );

        // Mode and stylesheet stay latched to the first load; the affordance
        // already exists so no second insertion happens.
        assert_eq!(runtime.mode(), Some(ScriptMode::Development));
        assert!(dom.stylesheets.lock().is_empty());
        assert_eq!(dom.insertions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_timer_reloads_hourly() {
        let (runtime, dom, _rx) = runtime();

        dispatch(&runtime, &ContentCommand::load(VersionToken::dev()));
        assert_eq!(dom.reloads.load(Ordering::SeqCst), 0);

        tokio::time::sleep(RECOVERY_INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(dom.reloads.load(Ordering::SeqCst), 1);

        tokio::time::sleep(RECOVERY_INTERVAL).await;
        assert_eq!(dom.reloads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_command_is_dropped() {
        let (runtime, dom, mut rx) = runtime();

        runtime.dispatch("not json at all");
        runtime.dispatch(r#"{"type":"unknownCommand"}"#);

        assert_eq!(dom.toggles.load(Ordering::SeqCst), 0);
        assert!(rx.try_recv().is_err());
        assert!(runtime.mode().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_entry_points_flow_through() {
        let (runtime, _dom, mut rx) = runtime();

        runtime.on_scroll(4.0);
        tokio::time::sleep(Duration::from_millis(1100)).await;

        // Location never changes in FakeDom, so the frame check is silent.
        runtime.on_mutation();
        runtime.on_frame();

        let mut seen = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            seen.push(Envelope::decode(&raw).expect("valid envelope").kind);
        }
        assert_eq!(
            seen,
            vec![MessageKind::ScrollStarted, MessageKind::ScrollEnded]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_inert_before_load() {
        let (runtime, dom, _rx) = runtime();

        assert!(runtime.mode().is_none());
        assert!(dom.stylesheets.lock().is_empty());
        assert_eq!(dom.insertions.load(Ordering::SeqCst), 0);
    }
}
