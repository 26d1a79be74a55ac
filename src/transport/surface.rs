//! Traits the embedding platform implements.
//!
//! The embedded browser surface and the page's outbound message call are
//! capabilities supplied by the host platform (a WebView on device, a mock
//! in tests). The shell only ever talks to these two seams.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use url::Url;

// ============================================================================
// ContentSurface
// ============================================================================

/// The embedded browser surface hosting the remote web app.
///
/// All methods are fire-and-forget: the surface gives no acknowledgement and
/// the shell must not assume delivery. Implementations are expected to be
/// cheap to call from the host's event context (typically marshalling onto
/// the platform's UI thread internally).
pub trait ContentSurface: Send + Sync {
    /// Loads the destination with a bootstrap script that runs before the
    /// page's own content.
    ///
    /// Called once at startup; the shell never navigates afterwards.
    fn load(&self, destination: &Url, bootstrap: &str);

    /// Executes a script fragment inside the content surface.
    ///
    /// This is the host→content transport primitive; commands and the
    /// enhancement payload both travel through it.
    fn inject_script(&self, script: &str);

    /// Reloads the current page.
    fn reload(&self);

    /// Requests input focus on the surface.
    fn request_focus(&self);

    /// Sets the impersonated client identity for subsequent requests.
    fn set_user_agent(&self, user_agent: &str);
}

// ============================================================================
// MessagePort
// ============================================================================

/// The content side's single outbound call.
///
/// Carries one serialized envelope per post, fire-and-forget, FIFO within
/// the channel. This is the content→host transport primitive.
pub trait MessagePort: Send + Sync {
    /// Delivers a serialized envelope to the host.
    fn post(&self, envelope: &str);
}

// ============================================================================
// ChannelPort
// ============================================================================

/// [`MessagePort`] backed by an in-process channel.
///
/// Used when the content runtime is hosted in the same process as the shell
/// (demos, tests): the receiving end is drained into
/// [`Shell::on_message`](crate::shell::Shell::on_message).
#[derive(Clone)]
pub struct ChannelPort {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelPort {
    /// Creates a port and the receiver for its posted envelopes.
    #[must_use]
    pub fn unbounded() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl MessagePort for ChannelPort {
    fn post(&self, envelope: &str) {
        // Receiver gone means the host shut down; posts become no-ops.
        let _ = self.sender.send(envelope.to_string());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_port_delivers_in_order() {
        let (port, mut rx) = ChannelPort::unbounded();

        port.post("first");
        port.post("second");

        assert_eq!(rx.try_recv().ok().as_deref(), Some("first"));
        assert_eq!(rx.try_recv().ok().as_deref(), Some("second"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_port_survives_dropped_receiver() {
        let (port, rx) = ChannelPort::unbounded();
        drop(rx);

        // Fire-and-forget: posting into a closed channel must not panic.
        port.post("lost");
    }

    #[test]
    fn test_traits_are_object_safe() {
        fn assert_object_safe(_: Option<&dyn ContentSurface>, _: Option<&dyn MessagePort>) {}
        assert_object_safe(None, None);
    }
}
