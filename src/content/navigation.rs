//! In-page navigation detection.
//!
//! The hosted app is a single-page application: route changes rewrite the
//! DOM without a document load. The watcher observes mutation notifications,
//! coalesces them through the rendering scheduler (at most one location
//! check per animation frame, however many mutations arrived), and compares
//! the current location against the previously recorded one.
//!
//! On a change:
//!
//! - off the chat route → post
//!   [`DismissKeyboard`](MessageKind::DismissKeyboard) so the host drops the
//!   soft keyboard;
//! - onto the chat route → wait out a settle delay (the page is still
//!   re-rendering), then re-run the idempotent affordance-insertion routine.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::protocol::{Envelope, MessageKind};
use crate::transport::MessagePort;

use super::dom::PageDom;

// ============================================================================
// Constants
// ============================================================================

/// Path of the chat route inside the hosted app.
pub const CHAT_ROUTE: &str = "/chat";

/// Delay before touching the DOM after navigating onto the chat route.
///
/// The page re-renders the header on route entry; inserting earlier would
/// race the framework and lose the affordance.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

// ============================================================================
// NavigationWatcher
// ============================================================================

/// Per-page-load state of the watcher.
struct WatchState {
    /// Last recorded location, as its serialized form.
    last_location: Option<String>,
    /// Whether mutations arrived since the last frame check.
    dirty: bool,
}

/// Mutation-driven, frame-coalesced location watcher.
pub struct NavigationWatcher {
    /// Page document access.
    dom: Arc<dyn PageDom>,
    /// Outbound envelope channel.
    port: Arc<dyn MessagePort>,
    /// Watcher state.
    state: Mutex<WatchState>,
}

impl NavigationWatcher {
    /// Creates a watcher with the current location as its baseline.
    ///
    /// If the location is unreadable at construction, the first successful
    /// read establishes the baseline without emitting an event.
    #[must_use]
    pub fn new(dom: Arc<dyn PageDom>, port: Arc<dyn MessagePort>) -> Self {
        let last_location = match dom.location() {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!(error = %e, "Location unreadable at watcher install");
                None
            }
        };

        Self {
            dom,
            port,
            state: Mutex::new(WatchState {
                last_location,
                dirty: false,
            }),
        }
    }

    /// Records that DOM mutations occurred.
    ///
    /// Cheap and callable at any volume; the actual check is deferred to the
    /// next frame.
    pub fn on_mutation(&self) {
        self.state.lock().dirty = true;
    }

    /// Runs at most one location check for the elapsed frame.
    ///
    /// The platform calls this once per animation frame. Frames without
    /// mutations are free.
    pub fn on_frame(&self) {
        {
            let mut state = self.state.lock();
            if !state.dirty {
                return;
            }
            state.dirty = false;
        }

        self.check_location();
    }

    /// Compares the current location against the recorded one.
    fn check_location(&self) {
        let current = match self.dom.location() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Location check failed");
                return;
            }
        };

        let changed = {
            let mut state = self.state.lock();
            let serialized = current.to_string();
            let changed = state.last_location.as_deref() != Some(serialized.as_str());
            if changed {
                state.last_location = Some(serialized);
            }
            changed
        };

        if !changed {
            return;
        }

        debug!(location = %current, "In-page navigation detected");

        if current.path() == CHAT_ROUTE {
            let dom = Arc::clone(&self.dom);
            let port = Arc::clone(&self.port);
            tokio::spawn(async move {
                sleep(SETTLE_DELAY).await;
                ensure_refresh_affordance(&dom, &port);
            });
        } else {
            self.port
                .post(&Envelope::event(MessageKind::DismissKeyboard).encode());
        }
    }
}

// ============================================================================
// Affordance Insertion
// ============================================================================

/// Inserts the refresh affordance if it is not already present.
///
/// Idempotent: checks for the affordance before inserting. Activation posts
/// [`ReloadPage`](MessageKind::ReloadPage). Every DOM touch is locally
/// failure-isolated.
pub(crate) fn ensure_refresh_affordance(dom: &Arc<dyn PageDom>, port: &Arc<dyn MessagePort>) {
    match dom.has_refresh_affordance() {
        Ok(true) => {
            debug!("Refresh affordance already present");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            warn!(error = %e, "Affordance presence check failed");
            return;
        }
    }

    let port = Arc::clone(port);
    let on_activate = Box::new(move || {
        port.post(&Envelope::event(MessageKind::ReloadPage).encode());
    });

    match dom.insert_refresh_affordance(on_activate) {
        Ok(()) => debug!("Refresh affordance inserted"),
        Err(e) => warn!(error = %e, "Refresh affordance insertion failed"),
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
    use crate::error::{Error, Result};
    use crate::transport::ChannelPort;

    /// In-memory page document for watcher tests.
    struct FakeDom {
        location: Mutex<Url>,
        location_reads: AtomicUsize,
        affordance_present: Mutex<bool>,
        insertions: AtomicUsize,
    }

    impl FakeDom {
        fn at(url: &str) -> Arc<Self> {
            Arc::new(Self {
                location: Mutex::new(Url::parse(url).expect("valid url")),
                location_reads: AtomicUsize::new(0),
                affordance_present: Mutex::new(false),
                insertions: AtomicUsize::new(0),
            })
        }

        fn navigate(&self, url: &str) {
            *self.location.lock() = Url::parse(url).expect("valid url");
        }

        fn insertions(&self) -> usize {
            self.insertions.load(Ordering::SeqCst)
        }

        fn location_reads(&self) -> usize {
            self.location_reads.load(Ordering::SeqCst)
        }
    }

    impl PageDom for FakeDom {
        fn is_drawer_open(&self) -> Result<bool> {
            Ok(false)
        }

        fn activate_drawer_toggle(&self) -> Result<()> {
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

        fn append_stylesheet(&self, _href: &str) -> Result<()> {
            Ok(())
        }

        fn location(&self) -> Result<Url> {
            self.location_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.location.lock().clone())
        }

        fn reload(&self) {}
    }

    fn kinds(rx: &mut UnboundedReceiver<String>) -> Vec<MessageKind> {
        let mut seen = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            seen.push(Envelope::decode(&raw).expect("valid envelope").kind);
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_chat_dismisses_keyboard() {
        let dom = FakeDom::at("https://app.example/chat");
        let (port, mut rx) = ChannelPort::unbounded();
        let watcher = NavigationWatcher::new(dom.clone(), Arc::new(port));

        dom.navigate("https://app.example/settings");
        watcher.on_mutation();
        watcher.on_frame();
        tokio::time::sleep(SETTLE_DELAY * 2).await;

        assert_eq!(kinds(&mut rx), vec![MessageKind::DismissKeyboard]);
        assert_eq!(dom.insertions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entering_chat_inserts_affordance_after_settle() {
        let dom = FakeDom::at("https://app.example/settings");
        let (port, mut rx) = ChannelPort::unbounded();
        let watcher = NavigationWatcher::new(dom.clone(), Arc::new(port));

        dom.navigate("https://app.example/chat");
        watcher.on_mutation();
        watcher.on_frame();

        // Nothing happens before the settle delay elapses.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(dom.insertions(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(dom.insertions(), 1);
        assert!(kinds(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insertion_skipped_when_affordance_exists() {
        let dom = FakeDom::at("https://app.example/settings");
        *dom.affordance_present.lock() = true;
        let (port, _rx) = ChannelPort::unbounded();
        let watcher = NavigationWatcher::new(dom.clone(), Arc::new(port));

        dom.navigate("https://app.example/chat");
        watcher.on_mutation();
        watcher.on_frame();
        tokio::time::sleep(SETTLE_DELAY * 2).await;

        assert_eq!(dom.insertions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_coalesce_to_one_check_per_frame() {
        let dom = FakeDom::at("https://app.example/chat");
        let (port, _rx) = ChannelPort::unbounded();
        let watcher = NavigationWatcher::new(dom.clone(), Arc::new(port));

        let baseline = dom.location_reads();
        for _ in 0..50 {
            watcher.on_mutation();
        }
        watcher.on_frame();

        assert_eq!(dom.location_reads(), baseline + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_without_mutations_is_free() {
        let dom = FakeDom::at("https://app.example/chat");
        let (port, _rx) = ChannelPort::unbounded();
        let watcher = NavigationWatcher::new(dom.clone(), Arc::new(port));

        let baseline = dom.location_reads();
        watcher.on_frame();
        watcher.on_frame();

        assert_eq!(dom.location_reads(), baseline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_location_emits_nothing() {
        let dom = FakeDom::at("https://app.example/chat");
        let (port, mut rx) = ChannelPort::unbounded();
        let watcher = NavigationWatcher::new(dom.clone(), Arc::new(port));

        watcher.on_mutation();
        watcher.on_frame();
        tokio::time::sleep(SETTLE_DELAY * 2).await;

        assert!(kinds(&mut rx).is_empty());
        assert_eq!(dom.insertions(), 0);
    }

    /// Wraps [`FakeDom`] and hands the captured affordance action to the test.
    struct CapturingDom {
        inner: Arc<FakeDom>,
        action: Mutex<Option<AffordanceAction>>,
    }

    impl PageDom for CapturingDom {
        fn is_drawer_open(&self) -> Result<bool> {
            self.inner.is_drawer_open()
        }

        fn activate_drawer_toggle(&self) -> Result<()> {
            self.inner.activate_drawer_toggle()
        }

        fn has_refresh_affordance(&self) -> Result<bool> {
            self.inner.has_refresh_affordance()
        }

        fn insert_refresh_affordance(&self, on_activate: AffordanceAction) -> Result<()> {
            *self.action.lock() = Some(on_activate);
            self.inner.insert_refresh_affordance(Box::new(|| {}))
        }

        fn append_stylesheet(&self, href: &str) -> Result<()> {
            self.inner.append_stylesheet(href)
        }

        fn location(&self) -> Result<Url> {
            self.inner.location()
        }

        fn reload(&self) {
            self.inner.reload();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_affordance_activation_posts_reload() {
        let (port, mut rx) = ChannelPort::unbounded();
        let port: Arc<dyn MessagePort> = Arc::new(port);

        let capturing = Arc::new(CapturingDom {
            inner: FakeDom::at("https://app.example/chat"),
            action: Mutex::new(None),
        });
        let dom: Arc<dyn PageDom> = Arc::clone(&capturing) as Arc<dyn PageDom>;

        ensure_refresh_affordance(&dom, &port);

        // Simulate the user activating the inserted affordance.
        let action = capturing.action.lock().take().expect("action captured");
        action();

        assert_eq!(kinds(&mut rx), vec![MessageKind::ReloadPage]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dom_failure_is_isolated() {
        struct BrokenDom;

        impl PageDom for BrokenDom {
            fn is_drawer_open(&self) -> Result<bool> {
                Err(Error::dom("marker gone"))
            }

            fn activate_drawer_toggle(&self) -> Result<()> {
                Err(Error::dom("toggle gone"))
            }

            fn has_refresh_affordance(&self) -> Result<bool> {
                Err(Error::dom("header gone"))
            }

            fn insert_refresh_affordance(&self, _on_activate: AffordanceAction) -> Result<()> {
                Err(Error::dom("anchor gone"))
            }

            fn append_stylesheet(&self, _href: &str) -> Result<()> {
                Err(Error::dom("head gone"))
            }

            fn location(&self) -> Result<Url> {
                Err(Error::dom("location gone"))
            }

            fn reload(&self) {}
        }

        let (port, mut rx) = ChannelPort::unbounded();
        let dom: Arc<dyn PageDom> = Arc::new(BrokenDom);
        let watcher = NavigationWatcher::new(Arc::clone(&dom), Arc::new(port.clone()));

        // Every path must swallow the failure without panicking or posting.
        watcher.on_mutation();
        watcher.on_frame();
        ensure_refresh_affordance(&dom, &(Arc::new(port) as Arc<dyn MessagePort>));

        assert!(kinds(&mut rx).is_empty());
    }
}
