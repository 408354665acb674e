//! Request identifier type.
//!
//! A [`RequestId`] is an opaque string. Identifiers propagated by an upstream
//! proxy are accepted as-is (after a sanity check), while locally generated
//! identifiers are random UUID v4 values drawn from the OS random source.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest identifier accepted from an upstream hop.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// A unique identifier for each request.
///
/// # Example
///
/// ```
/// use heraldo_core::RequestId;
///
/// let generated = RequestId::generate();
/// assert!(!generated.as_str().is_empty());
///
/// let propagated = RequestId::parse("abc-123").unwrap();
/// assert_eq!(propagated.as_str(), "abc-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a fresh identifier with 122 bits of randomness.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accepts an identifier supplied by a caller or upstream proxy.
    ///
    /// Returns `None` when the value is empty, longer than
    /// [`MAX_REQUEST_ID_LEN`], or contains anything other than visible ASCII.
    /// The accepted value is kept byte-for-byte; it is never trimmed.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.is_empty() || value.len() > MAX_REQUEST_ID_LEN {
            return None;
        }
        if !value.bytes().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        Some(Self(value.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}
