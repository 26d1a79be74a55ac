//! Horizontal scroll detection.
//!
//! The hosted page scrolls horizontally in places (code blocks, tables);
//! a native drawer gesture during such a scroll would fight the page. The
//! monitor reports the start and settled end of horizontal scrolling so the
//! host can gate gesture recognition.
//!
//! Qualifying events are scroll callbacks with a positive horizontal offset.
//! The first one since the last settled end posts
//! [`ScrollStarted`](MessageKind::ScrollStarted); after 1000 ms with no
//! further qualifying event, exactly one
//! [`ScrollEnded`](MessageKind::ScrollEnded) follows. The debounce window
//! restarts on every qualifying event.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::protocol::{Envelope, MessageKind};
use crate::transport::MessagePort;

// ============================================================================
// Constants
// ============================================================================

/// Quiet period after the last qualifying event before scrolling counts as
/// ended.
pub const SCROLL_END_DEBOUNCE: Duration = Duration::from_millis(1000);

// ============================================================================
// ScrollMonitor
// ============================================================================

/// Debounced horizontal-scroll state machine.
///
/// Must be driven from within a tokio runtime: the end-of-scroll watcher is
/// a spawned timer task.
pub struct ScrollMonitor {
    /// Outbound envelope channel.
    port: Arc<dyn MessagePort>,
    /// Current debounce deadline; `None` while idle.
    window: Arc<Mutex<Option<Instant>>>,
}

impl ScrollMonitor {
    /// Creates an idle monitor posting through `port`.
    #[must_use]
    pub fn new(port: Arc<dyn MessagePort>) -> Self {
        Self {
            port,
            window: Arc::new(Mutex::new(None)),
        }
    }

    /// Feeds one scroll callback with its horizontal offset.
    ///
    /// Non-positive offsets never qualify and are ignored entirely.
    pub fn on_scroll(&self, horizontal_offset: f64) {
        if horizontal_offset <= 0.0 {
            return;
        }

        let deadline = Instant::now() + SCROLL_END_DEBOUNCE;
        let was_idle = {
            let mut window = self.window.lock();
            let was_idle = window.is_none();
            *window = Some(deadline);
            was_idle
        };

        if was_idle {
            debug!(horizontal_offset, "Scroll started");
            post(&self.port, MessageKind::ScrollStarted);
            self.spawn_end_watcher();
        }
    }

    /// Returns `true` while a scroll is in progress.
    #[inline]
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.window.lock().is_some()
    }

    /// Watches the debounce window and posts the end-of-scroll envelope.
    ///
    /// The window may be pushed out by further qualifying events while the
    /// watcher sleeps; it keeps re-arming until a deadline survives intact.
    fn spawn_end_watcher(&self) {
        let port = Arc::clone(&self.port);
        let window = Arc::clone(&self.window);

        tokio::spawn(async move {
            loop {
                let Some(deadline) = *window.lock() else {
                    return;
                };

                sleep_until(deadline).await;

                let settled = {
                    let mut window = window.lock();
                    if *window == Some(deadline) {
                        *window = None;
                        true
                    } else {
                        false
                    }
                };

                if settled {
                    debug!("Scroll ended");
                    post(&port, MessageKind::ScrollEnded);
                    return;
                }
            }
        });
    }
}

/// Posts a plain event envelope, fire-and-forget.
fn post(port: &Arc<dyn MessagePort>, kind: MessageKind) {
    port.post(&Envelope::event(kind).encode());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::sleep;

    use crate::transport::ChannelPort;

    fn monitor() -> (ScrollMonitor, UnboundedReceiver<String>) {
        let (port, rx) = ChannelPort::unbounded();
        (ScrollMonitor::new(Arc::new(port)), rx)
    }

    fn kinds(rx: &mut UnboundedReceiver<String>) -> Vec<MessageKind> {
        let mut seen = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            seen.push(Envelope::decode(&raw).expect("valid envelope").kind);
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_scroll_posts_start_then_end() {
        let (monitor, mut rx) = monitor();

        monitor.on_scroll(5.0);
        assert!(monitor.is_scrolling());

        sleep(Duration::from_millis(1100)).await;

        assert_eq!(
            kinds(&mut rx),
            vec![MessageKind::ScrollStarted, MessageKind::ScrollEnded]
        );
        assert!(!monitor.is_scrolling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_restarts_on_each_event() {
        let (monitor, mut rx) = monitor();

        monitor.on_scroll(10.0);
        sleep(Duration::from_millis(600)).await;

        // Still inside the window: this must push the deadline out.
        monitor.on_scroll(3.0);
        sleep(Duration::from_millis(600)).await;

        assert_eq!(kinds(&mut rx), vec![MessageKind::ScrollStarted]);
        assert!(monitor.is_scrolling());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(kinds(&mut rx), vec![MessageKind::ScrollEnded]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_scroll_posts_one_start() {
        let (monitor, mut rx) = monitor();

        for _ in 0..20 {
            monitor.on_scroll(1.0);
            sleep(Duration::from_millis(50)).await;
        }
        sleep(Duration::from_millis(1100)).await;

        assert_eq!(
            kinds(&mut rx),
            vec![MessageKind::ScrollStarted, MessageKind::ScrollEnded]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_positive_offsets_ignored() {
        let (monitor, mut rx) = monitor();

        monitor.on_scroll(0.0);
        monitor.on_scroll(-12.0);
        sleep(Duration::from_millis(1500)).await;

        assert!(kinds(&mut rx).is_empty());
        assert!(!monitor.is_scrolling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_scroll_after_end_posts_again() {
        let (monitor, mut rx) = monitor();

        monitor.on_scroll(5.0);
        sleep(Duration::from_millis(1100)).await;
        monitor.on_scroll(5.0);
        sleep(Duration::from_millis(1100)).await;

        assert_eq!(
            kinds(&mut rx),
            vec![
                MessageKind::ScrollStarted,
                MessageKind::ScrollEnded,
                MessageKind::ScrollStarted,
                MessageKind::ScrollEnded,
            ]
        );
    }
}
