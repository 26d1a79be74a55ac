//! The structural contract with the hosted page.
//!
//! The hosted web app is consumed, never owned: drawer state is detected
//! through a marker attribute, the drawer is toggled through the page's own
//! button, and the refresh affordance is inserted next to a documented
//! anchor. All of that positional coupling lives behind [`PageDom`] so that
//! adapting to a redesigned page touches exactly one implementation.
//!
//! # Selector Contract
//!
//! | Constant | Role |
//! |----------|------|
//! | [`DRAWER_OPEN_MARKER`] | Present iff the drawer is open |
//! | [`DRAWER_TOGGLE_SELECTOR`] | The page's drawer toggle control |
//! | [`HEADER_ANCHOR_SELECTOR`] | Insertion anchor for the affordance |
//! | [`REFRESH_AFFORDANCE_ID`] | Element id of the inserted affordance |

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::Result;

// ============================================================================
// Selector Contract
// ============================================================================

/// Marker present in the page exactly while the drawer is open.
pub const DRAWER_OPEN_MARKER: &str = r#"div[data-headlessui-state="open"]"#;

/// Selector for the page's drawer toggle control.
pub const DRAWER_TOGGLE_SELECTOR: &str = "button";

/// Selector for the header element the affordance is inserted into.
pub const HEADER_ANCHOR_SELECTOR: &str = "#__next > div:nth-of-type(1) > div > div";

/// Element id carried by the inserted refresh affordance.
pub const REFRESH_AFFORDANCE_ID: &str = "refresh";

/// Class applied to the inserted refresh affordance.
pub const REFRESH_AFFORDANCE_CLASS: &str = "px-3";

/// Icon markup for the refresh affordance.
pub const REFRESH_ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" fill="currentColor" width="25" viewBox="0 0 48 48"><path d="M24 40q-6.65 0-11.325-4.675Q8 30.65 8 24q0-6.65 4.675-11.325Q17.35 8 24 8q4.25 0 7.45 1.725T37 14.45V9.5q0-.65.425-1.075Q37.85 8 38.5 8q.65 0 1.075.425Q40 8.85 40 9.5v9.7q0 .65-.425 1.075-.425.425-1.075.425h-9.7q-.65 0-1.075-.425-.425-.425-.425-1.075 0-.65.425-1.075.425-.425 1.075-.425h6.9q-1.9-3-4.85-4.85Q27.9 11 24 11q-5.45 0-9.225 3.775Q11 18.55 11 24q0 5.45 3.775 9.225Q18.55 37 24 37q3.9 0 7.15-2.075Q34.4 32.85 36 29.35q.2-.4.65-.7.45-.3.9-.3.85 0 1.225.55.375.55.075 1.3-1.85 4.45-5.875 7.125T24 40Z"/></svg>"#;

// ============================================================================
// Types
// ============================================================================

/// Callback wired to the refresh affordance's activation.
pub type AffordanceAction = Box<dyn Fn() + Send + Sync>;

// ============================================================================
// PageDom
// ============================================================================

/// Narrow interface over the hosted page's document.
///
/// Implementations bind the selector contract above to an actual document.
/// Every method may fail when the page no longer matches the contract; the
/// content runtime catches each failure locally so one broken assumption
/// does not disable the rest of the enhancement layer.
pub trait PageDom: Send + Sync {
    /// Returns whether the drawer-open marker is present.
    ///
    /// Recomputed on every call; drawer state is never cached.
    fn is_drawer_open(&self) -> Result<bool>;

    /// Activates the page's drawer toggle control.
    fn activate_drawer_toggle(&self) -> Result<()>;

    /// Returns whether the refresh affordance is already present.
    fn has_refresh_affordance(&self) -> Result<bool>;

    /// Inserts the refresh affordance before the header anchor.
    ///
    /// `on_activate` fires each time the affordance is activated.
    fn insert_refresh_affordance(&self, on_activate: AffordanceAction) -> Result<()>;

    /// Appends a stylesheet link to the document head.
    fn append_stylesheet(&self, href: &str) -> Result<()>;

    /// Returns the document's current location.
    fn location(&self) -> Result<Url>;

    /// Reloads the page in place.
    fn reload(&self);
}

// ============================================================================
// Tests
// ============================================================================
