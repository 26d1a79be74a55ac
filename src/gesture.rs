//! Drawer gesture recognition.
//!
//! Raw multi-touch drag deltas are classified into drawer-toggle intents:
//! a candidate drag must be predominantly horizontal, long enough, and must
//! not compete with the page's own horizontal scrolling. Recognized drags
//! pass through a leading-edge throttle so one continuous drag issues one
//! command, not dozens.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::trace;

// ============================================================================
// Constants
// ============================================================================

/// Minimum Euclidean drag magnitude, in device-independent units.
pub const SWIPE_THRESHOLD: f64 = 70.0;

/// Throttle window for drawer-toggle dispatch.
pub const SWIPE_THROTTLE_WINDOW: Duration = Duration::from_millis(500);

// ============================================================================
// ScrollGate
// ============================================================================

/// Shared flag suppressing gestures while the page scrolls horizontally.
///
/// Owned by the shell, mutated only by `ScrollStarted`/`ScrollEnded`
/// envelopes, read by the recognizer.
#[derive(Clone, Default)]
pub struct ScrollGate(Arc<AtomicBool>);

impl ScrollGate {
    /// Creates an inactive gate.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the page is mid-scroll.
    #[inline]
    pub fn set(&self, active: bool) {
        self.0.store(active, Ordering::Relaxed);
    }

    /// Returns `true` while the page is mid-scroll.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// SwipeIntent
// ============================================================================

/// Drawer intent derived from a recognized drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeIntent {
    /// Rightward drag: open the drawer.
    OpenDrawer,
    /// Leftward drag: close the drawer.
    CloseDrawer,
}

// ============================================================================
// GestureRecognizer
// ============================================================================

/// Leading-edge throttle state.
///
/// The contract: the first event in a window fires immediately; subsequent
/// events inside the window are dropped entirely — not queued, not fired at
/// window end.
struct Throttle {
    /// Instant of the last dispatched intent.
    last_fired: Option<Instant>,
}

impl Throttle {
    /// Attempts to fire; returns `true` on the leading edge.
    fn try_fire(&mut self, window: Duration) -> bool {
        let now = Instant::now();
        match self.last_fired {
            Some(last) if now.duration_since(last) < window => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }
}

/// Classifies drag deltas into throttled drawer intents.
pub struct GestureRecognizer {
    /// Suppresses recognition while the page scrolls.
    gate: ScrollGate,
    /// Leading-edge dispatch throttle.
    throttle: Mutex<Throttle>,
}

impl GestureRecognizer {
    /// Creates a recognizer gated by `gate`.
    #[must_use]
    pub fn new(gate: ScrollGate) -> Self {
        Self {
            gate,
            throttle: Mutex::new(Throttle { last_fired: None }),
        }
    }

    /// Classifies a drag delta without touching the throttle.
    ///
    /// A candidate requires: gate inactive, horizontal dominance, and
    /// Euclidean magnitude above [`SWIPE_THRESHOLD`].
    #[must_use]
    pub fn classify(&self, dx: f64, dy: f64) -> Option<SwipeIntent> {
        if self.gate.is_active() {
            return None;
        }

        if dx.abs() <= dy.abs() {
            return None;
        }

        if (dx * dx + dy * dy).sqrt() <= SWIPE_THRESHOLD {
            return None;
        }

        if dx > 0.0 {
            Some(SwipeIntent::OpenDrawer)
        } else {
            Some(SwipeIntent::CloseDrawer)
        }
    }

    /// Classifies a drag delta and applies the dispatch throttle.
    ///
    /// Returns the intent to dispatch, or `None` when the drag is not a
    /// candidate or falls inside the current throttle window.
    #[must_use]
    pub fn on_drag(&self, dx: f64, dy: f64) -> Option<SwipeIntent> {
        let intent = self.classify(dx, dy)?;

        if !self.throttle.lock().try_fire(SWIPE_THROTTLE_WINDOW) {
            trace!(?intent, "Swipe dropped inside throttle window");
            return None;
        }

        trace!(?intent, dx, dy, "Swipe recognized");
        Some(intent)
    }
}

// ============================================================================
// Tests
// ============================================================================
