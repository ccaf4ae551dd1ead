//! Request context — the mutable state threaded through a handler tree
//!
//! One [`Context`] is built per routed path. Handlers consume segments from
//! the front, capture parameters, and may stash caller data in `state`.
//! Alternation rolls all three back through [`Restore`].

use crate::combine::Restore;
use crate::template::Params;
use crate::token::{decode_segment, SEPARATOR};
use std::collections::VecDeque;

/// Per-request routing state.
///
/// `path` is fixed at construction. `segments`, `params` and `state` are the
/// only parts handlers change.
///
/// # Example
///
/// ```
/// use rota::Context;
///
/// let mut ctx: Context = Context::new("/admin/users/j%C3%B6hn");
/// assert_eq!(ctx.peek(), Some("admin"));
/// assert_eq!(ctx.consume().as_deref(), Some("admin"));
/// assert_eq!(ctx.tail(), "/users/j%C3%B6hn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context<S = ()> {
    path: String,
    segments: VecDeque<String>,
    params: Params,
    /// Caller-owned data passed between chained handlers.
    pub state: S,
}

impl<S: Default> Context<S> {
    /// Build a context for `path` with default state.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_state(path, S::default())
    }
}

impl<S> Context<S> {
    /// Build a context for `path` with the given initial state.
    pub fn with_state(path: impl Into<String>, state: S) -> Self {
        let path = path.into();
        let segments = to_segments(&path);
        Self {
            path,
            segments,
            params: Params::new(),
            state,
        }
    }

    /// The path being routed, exactly as given.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Segments not yet consumed, decoded.
    #[must_use]
    pub fn segments(&self) -> &VecDeque<String> {
        &self.segments
    }

    /// The next unconsumed segment.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.segments.front().map(String::as_str)
    }

    /// Number of unconsumed segments.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` once every segment has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.segments.is_empty()
    }

    /// Remove and return the next segment.
    pub fn consume(&mut self) -> Option<String> {
        self.segments.pop_front()
    }

    /// Remove the next `count` segments (or all remaining, if fewer).
    pub fn consume_many(&mut self, count: usize) {
        let count = count.min(self.segments.len());
        self.segments.drain(..count);
    }

    /// Replace the unconsumed segments.
    pub fn set_segments(&mut self, segments: impl IntoIterator<Item = String>) {
        self.segments = segments.into_iter().collect();
    }

    /// Captured parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A captured parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Capture `value` under `name`, replacing any earlier capture.
    pub fn insert_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// The unconsumed segments rendered as a percent-encoded path.
    ///
    /// Empty when every segment has been consumed, otherwise `/`-prefixed.
    #[must_use]
    pub fn tail(&self) -> String {
        self.segments.iter().fold(String::new(), |mut tail, segment| {
            tail.push(SEPARATOR);
            tail.push_str(&urlencoding::encode(segment));
            tail
        })
    }
}

/// Saved copy of a [`Context`]'s mutable fields.
#[derive(Debug, Clone)]
pub struct ContextSnapshot<S> {
    segments: VecDeque<String>,
    params: Params,
    state: S,
}

impl<S: Clone> Restore for Context<S> {
    type Snapshot = ContextSnapshot<S>;

    fn snapshot(&self) -> ContextSnapshot<S> {
        ContextSnapshot {
            segments: self.segments.clone(),
            params: self.params.clone(),
            state: self.state.clone(),
        }
    }

    fn restore(&mut self, snapshot: &ContextSnapshot<S>) {
        self.segments.clone_from(&snapshot.segments);
        self.params.clone_from(&snapshot.params);
        self.state.clone_from(&snapshot.state);
    }
}

/// Split a path into its non-empty, decoded segments.
///
/// Leading, trailing and repeated separators are insignificant.
///
/// ```
/// use rota::to_segments;
///
/// assert_eq!(to_segments("/foo//bar/"), ["foo", "bar"]);
/// assert_eq!(to_segments("a+b/%C3%B6"), ["a b", "ö"]);
/// assert!(to_segments("/").is_empty());
/// ```
#[must_use]
pub fn to_segments(path: &str) -> VecDeque<String> {
    path.split(SEPARATOR)
        .filter(|piece| !piece.is_empty())
        .map(decode_segment)
        .collect()
}
