//! Impersonated client identity selection.
//!
//! Some destinations refuse embedded surfaces outright; presenting a
//! first-party mobile browser identity keeps them working. The identity is
//! chosen by simple substring matching against the navigated destination and
//! reselected on every navigation state change. No other request
//! manipulation occurs.

// ============================================================================
// Constants
// ============================================================================

/// Safari-on-iPhone identity, for destinations that reject embedded Chrome.
pub const UA_IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Mobile/15E148 Safari/604.1";

/// Chrome-on-Android identity, the default.
pub const UA_ANDROID_CHROME: &str = "Mozilla/5.0 (Linux; Android 13) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.5481.65 Mobile Safari/537.36";

// ============================================================================
// Selection
// ============================================================================

/// Chooses the client identity for a destination.
#[must_use]
pub fn user_agent_for(url: &str) -> &'static str {
    // Google sign-in flows block embedded surfaces presenting as Chrome.
    if url.contains("google.com") {
        return UA_IPHONE_SAFARI;
    }

    UA_ANDROID_CHROME
}

// ============================================================================
// Tests
// ============================================================================
