//! Per-request pipeline context.
//!
//! The [`RequestContext`] is created once per request and travels through
//! every stage and into the handler. It carries the request identifier, the
//! dispatcher's [`PipelineState`], timing, and type-keyed extensions that
//! stages may use to hand data to each other.

use heraldo_core::RequestId;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Where a request is in its lifecycle.
///
/// ```text
/// Received ─► Tagged ─► Validating(0) ─► … ─► Validating(n) ─► Handling ─► Responded
///                │            │                      │              │            ▲
///                └────────────┴──────────┬───────────┴──────────────┘            │
///                                        ▼                                       │
///                                      Failed ───────────────────────────────────┘
/// ```
///
/// `Tagged ─► Failed` covers requests whose body or query cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineState {
    /// Context created, no identifier yet.
    #[default]
    Received,
    /// Request identifier assigned.
    Tagged,
    /// Running the stage at this index.
    Validating(usize),
    /// Every stage passed; the handler is running.
    Handling,
    /// A stage, the decoder or the handler signalled a failure.
    Failed,
    /// A response has been produced.
    Responded,
}

impl PipelineState {
    /// Returns `true` if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Received, Self::Tagged)
            | (Self::Tagged | Self::Validating(_), Self::Handling | Self::Failed)
            | (Self::Tagged, Self::Validating(0))
            | (Self::Handling | Self::Failed, Self::Responded)
            | (Self::Handling, Self::Failed) => true,
            (Self::Validating(current), Self::Validating(following)) => following == current + 1,
            _ => false,
        }
    }

    /// Returns `true` once a response exists.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Responded)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => f.write_str("received"),
            Self::Tagged => f.write_str("tagged"),
            Self::Validating(index) => write!(f, "validating({index})"),
            Self::Handling => f.write_str("handling"),
            Self::Failed => f.write_str("failed"),
            Self::Responded => f.write_str("responded"),
        }
    }
}

/// Context that flows through the pipeline.
///
/// # Example
///
/// ```
/// use heraldo_core::RequestId;
/// use heraldo_middleware::{PipelineState, RequestContext};
///
/// let mut ctx = RequestContext::new();
/// assert!(ctx.request_id().is_none());
/// assert_eq!(ctx.state(), PipelineState::Received);
///
/// let id = ctx.set_request_id_if_absent(RequestId::parse("abc-123").unwrap()).clone();
/// assert_eq!(id.as_str(), "abc-123");
///
/// // The first identifier wins.
/// ctx.set_request_id_if_absent(RequestId::generate());
/// assert_eq!(ctx.request_id(), Some(&id));
/// ```
pub struct RequestContext {
    request_id: Option<RequestId>,
    state: PipelineState,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: None,
            state: PipelineState::Received,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Creates a context that already carries an identifier.
    ///
    /// The pipeline keeps this identifier rather than reading or generating one.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id: Some(request_id),
            ..Self::new()
        }
    }

    /// Returns the request identifier, once assigned.
    #[must_use]
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Assigns `request_id` unless an identifier is already present, and
    /// returns the identifier in effect.
    pub fn set_request_id_if_absent(&mut self, request_id: RequestId) -> &RequestId {
        self.request_id.get_or_insert(request_id)
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal pipeline transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Returns when processing started.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the time elapsed since processing started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores an extension value, replacing any value of the same type.
    pub fn set_extension<T: Any + Send + Sync>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns an extension value by type.
    #[must_use]
    pub fn get_extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Removes and returns an extension value by type.
    pub fn remove_extension<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }

    /// Returns `true` if an extension of this type is present.
    #[must_use]
    pub fn has_extension<T: Any + Send + Sync>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("state", &self.state)
            .field("elapsed", &self.elapsed())
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            PipelineState::Received,
            PipelineState::Tagged,
            PipelineState::Validating(0),
            PipelineState::Validating(1),
            PipelineState::Handling,
            PipelineState::Responded,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failure_transitions() {
        assert!(PipelineState::Tagged.can_advance_to(PipelineState::Failed));
        assert!(PipelineState::Validating(3).can_advance_to(PipelineState::Failed));
        assert!(PipelineState::Handling.can_advance_to(PipelineState::Failed));
        assert!(PipelineState::Failed.can_advance_to(PipelineState::Responded));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!PipelineState::Received.can_advance_to(PipelineState::Handling));
        assert!(!PipelineState::Validating(0).can_advance_to(PipelineState::Validating(2)));
        assert!(!PipelineState::Validating(1).can_advance_to(PipelineState::Validating(0)));
        assert!(!PipelineState::Tagged.can_advance_to(PipelineState::Validating(1)));
        assert!(!PipelineState::Failed.can_advance_to(PipelineState::Handling));
        assert!(!PipelineState::Responded.can_advance_to(PipelineState::Failed));
        assert!(PipelineState::Responded.is_terminal());
    }

    #[test]
    fn test_existing_id_is_never_replaced() {
        let original = RequestId::parse("upstream-1").unwrap();
        let mut ctx = RequestContext::with_request_id(original.clone());
        let in_effect = ctx.set_request_id_if_absent(RequestId::generate()).clone();
        assert_eq!(in_effect, original);
        assert_eq!(ctx.request_id(), Some(&original));
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, PartialEq)]
        struct Tenant(&'static str);

        let mut ctx = RequestContext::new();
        assert!(!ctx.has_extension::<Tenant>());

        ctx.set_extension(Tenant("acme"));
        assert_eq!(ctx.get_extension::<Tenant>(), Some(&Tenant("acme")));

        assert_eq!(ctx.remove_extension::<Tenant>(), Some(Tenant("acme")));
        assert!(!ctx.has_extension::<Tenant>());
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let ctx = RequestContext::new();
        let first = ctx.elapsed();
        assert!(ctx.elapsed() >= first);
    }
}
