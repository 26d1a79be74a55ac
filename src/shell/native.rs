//! Native affordances and theme colors.

// ============================================================================
// Constants
// ============================================================================

/// Chrome color for the light theme.
pub const COLOR_LIGHT: &str = "#FFFFFF";

/// Chrome color for the dark theme.
pub const COLOR_DARK: &str = "#343541";

// ============================================================================
// Theme
// ============================================================================

/// System light/dark preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light preference.
    #[default]
    Light,
    /// Dark preference.
    Dark,
}

impl Theme {
    /// Returns the chrome/background color for this theme.
    ///
    /// The dark value matches the hosted app's own background so the native
    /// chrome blends into the page.
    #[inline]
    #[must_use]
    pub fn chrome_color(self) -> &'static str {
        match self {
            Self::Light => COLOR_LIGHT,
            Self::Dark => COLOR_DARK,
        }
    }
}

// ============================================================================
// NativeHost
// ============================================================================

/// Native affordances consumed by the shell.
///
/// Each call is a simple fire-and-forget platform operation with no further
/// protocol.
pub trait NativeHost: Send + Sync {
    /// Sets the status/navigation chrome color.
    fn set_chrome_color(&self, color: &str);

    /// Exits the application.
    fn exit_app(&self);

    /// Focuses the invisible keyboard proxy input.
    ///
    /// The embedded surface's own focus state cannot be cleared from the
    /// host; focusing then blurring this proxy is the only way to force the
    /// soft keyboard down.
    fn focus_keyboard_proxy(&self);

    /// Blurs the invisible keyboard proxy input.
    fn blur_keyboard_proxy(&self);
}

// ============================================================================
// Tests
// ============================================================================
