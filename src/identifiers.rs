//! Type-safe identifiers for bridge traffic.
//!
//! Newtype wrappers prevent mixing incompatible values at compile time:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QueryId`] | Monotonic correlation id for drawer-state queries |
//! | [`VersionToken`] | Cache-busting script version (`"dev"` = development) |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ============================================================================
// QueryId
// ============================================================================

/// Monotonic counter backing [`QueryId::next`].
static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);

/// Correlation id for a drawer-state query.
///
/// Every `checkIsOpen` command carries a fresh id and the content runtime
/// echoes it on the response, so a late answer to a superseded query finds
/// no waiter instead of resolving the wrong caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(u64);

impl QueryId {
    /// Returns the next id in the process-wide monotonic sequence.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// VersionToken
// ============================================================================

/// Sentinel value selecting development mode.
const DEV_TOKEN: &str = "dev";

/// Cache-busting version token for the behavior script and stylesheet.
///
/// Production tokens are millisecond timestamps, monotonically increasing
/// across injections and used purely for cache defeat. The literal `"dev"`
/// selects development mode on the content side (inline CSS, no remote
/// stylesheet link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    /// Creates a token from the current wall clock, in milliseconds.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self(millis.to_string())
    }

    /// Creates the development-mode token.
    #[inline]
    #[must_use]
    pub fn dev() -> Self {
        Self(DEV_TOKEN.to_string())
    }

    /// Returns `true` if this token selects development mode.
    #[inline]
    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.0 == DEV_TOKEN
    }

    /// Returns the token as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for VersionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for VersionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_id_is_monotonic() {
        let a = QueryId::next();
        let b = QueryId::next();
        assert!(b.as_u64() > a.as_u64());
    }

    #[test]
    fn test_query_id_serializes_as_number() {
        let id = QueryId::next();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, id.as_u64().to_string());
    }

    #[test]
    fn test_dev_token() {
        let token = VersionToken::dev();
        assert!(token.is_dev());
        assert_eq!(token.as_str(), "dev");
    }

    #[test]
    fn test_now_token_is_numeric() {
        let token = VersionToken::now();
        assert!(!token.is_dev());
        assert!(token.as_str().parse::<u128>().is_ok());
    }

    #[test]
    fn test_token_from_str() {
        let token = VersionToken::from("dev");
        assert!(token.is_dev());

        let token = VersionToken::from("1700000000000");
        assert!(!token.is_dev());
    }

    #[test]
    fn test_token_serializes_as_string() {
        let token = VersionToken::from("123");
        let json = serde_json::to_string(&token).expect("serialize");
        assert_eq!(json, "\"123\"");
    }
}
