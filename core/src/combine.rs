//! Combination engine — sequential chains and ordered alternation
//!
//! Two domain-agnostic combinators over handlers of the shape
//! `Fn(&mut C, next) -> R`, where `next` is the continuation:
//!
//! - [`chain`] — each handler decides whether to call the next one.
//! - [`first_match`] — try handlers in order; a handler that comes back
//!   [`Outcome::Absent`] has its context mutations rolled back before the next
//!   attempt.
//!
//! The continuation takes the context as an argument instead of capturing it,
//! because the running handler holds the only mutable borrow.
//!
//! # Rollback
//!
//! [`first_match`] snapshots the context (via [`Restore`]) before every
//! attempt and restores it whenever the attempt is absent or errors. Only a
//! matched attempt commits its mutations.

use std::sync::Arc;
use tracing::trace;

/// Continuation passed to a handler: runs the rest of the chain.
pub type Next<'a, C, R> = &'a mut dyn FnMut(&mut C) -> R;

/// A type-erased, shareable handler body.
pub type Behavior<C, R> = Arc<dyn Fn(&mut C, Next<'_, C, R>) -> R + Send + Sync>;

/// Result of a handler that may decline to match.
///
/// `Absent` is a separate variant rather than a "falsy" value, so a handler
/// can legitimately produce `()`, `None` or an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Outcome<T> {
    /// The handler matched and produced a value.
    Matched(T),
    /// The handler did not match; the caller may try an alternative.
    Absent,
}

impl<T> Outcome<T> {
    /// Returns `true` for [`Outcome::Matched`].
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Returns `true` for [`Outcome::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Transform the matched value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Matched(value) => Outcome::Matched(f(value)),
            Self::Absent => Outcome::Absent,
        }
    }

    /// The matched value, if any.
    pub fn matched(self) -> Option<T> {
        match self {
            Self::Matched(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Matched)
    }
}

/// Snapshot and rollback of the caller-mutable parts of a context.
///
/// The snapshot must be independent of the live value: mutating the context
/// after [`snapshot`](Self::snapshot) never changes what
/// [`restore`](Self::restore) puts back.
pub trait Restore {
    /// Saved state.
    type Snapshot;

    /// Capture the current state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Overwrite the current state with `snapshot`.
    fn restore(&mut self, snapshot: &Self::Snapshot);
}

impl Restore for () {
    type Snapshot = ();

    fn snapshot(&self) {}

    fn restore(&mut self, _snapshot: &()) {}
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sequential chain
// ═══════════════════════════════════════════════════════════════════════════════

/// Compose handlers into one that runs them in order.
///
/// Handler `i` receives a continuation that invokes handler `i + 1`; the last
/// handler receives the continuation the composed handler was called with.
/// An empty list calls that continuation directly.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rota::{chain, Behavior, Next};
///
/// let double: Behavior<(), i32> = Arc::new(|ctx: &mut (), next: Next<'_, (), i32>| 2 * next(ctx));
/// let quarter: Behavior<(), i32> = Arc::new(|ctx: &mut (), next: Next<'_, (), i32>| next(ctx) / 4);
/// let h = chain(vec![double, quarter]);
///
/// assert_eq!(h(&mut (), &mut |_| 44), 22);
/// ```
pub fn chain<C: 'static, R: 'static>(handlers: Vec<Behavior<C, R>>) -> Behavior<C, R> {
    let handlers: Arc<[Behavior<C, R>]> = handlers.into();
    Arc::new(move |ctx: &mut C, next: Next<'_, C, R>| run_chain(&handlers, ctx, next))
}

/// Run `handlers` as a chain ending in `fallback`.
pub fn run_chain<C, R>(handlers: &[Behavior<C, R>], ctx: &mut C, fallback: Next<'_, C, R>) -> R {
    match handlers.split_first() {
        None => fallback(ctx),
        Some((first, rest)) => first(ctx, &mut |ctx: &mut C| run_chain(rest, ctx, &mut *fallback)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Ordered alternation
// ═══════════════════════════════════════════════════════════════════════════════

/// Compose handlers into one that returns the first matched outcome.
///
/// Every alternative receives the same continuation. Errors are not
/// alternatives: they roll back the failed attempt and propagate at once.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use std::sync::Arc;
/// use rota::{first_match, Behavior, Next, Outcome};
///
/// type Flow = Result<Outcome<i32>, Infallible>;
///
/// let miss: Behavior<(), Flow> = Arc::new(|_: &mut (), _: Next<'_, (), Flow>| Ok(Outcome::Absent));
/// let hit: Behavior<(), Flow> = Arc::new(|ctx: &mut (), next: Next<'_, (), Flow>| next(ctx));
/// let h = first_match(vec![miss, hit]);
///
/// assert_eq!(h(&mut (), &mut |_| Ok(Outcome::Matched(42))), Ok(Outcome::Matched(42)));
/// ```
pub fn first_match<C, T, E>(
    handlers: Vec<Behavior<C, Result<Outcome<T>, E>>>,
) -> Behavior<C, Result<Outcome<T>, E>>
where
    C: Restore + 'static,
    T: 'static,
    E: 'static,
{
    let handlers: Arc<[Behavior<C, Result<Outcome<T>, E>>]> = handlers.into();
    Arc::new(
        move |ctx: &mut C, next: Next<'_, C, Result<Outcome<T>, E>>| {
            run_first_match(&handlers, ctx, next)
        },
    )
}

/// Try `handlers` in order against `ctx`, rolling back every failed attempt.
pub fn run_first_match<C, T, E>(
    handlers: &[Behavior<C, Result<Outcome<T>, E>>],
    ctx: &mut C,
    next: Next<'_, C, Result<Outcome<T>, E>>,
) -> Result<Outcome<T>, E>
where
    C: Restore,
{
    let saved = ctx.snapshot();
    for (attempt, handler) in handlers.iter().enumerate() {
        match handler(ctx, &mut *next) {
            Ok(Outcome::Matched(value)) => {
                trace!(attempt, "alternative matched");
                return Ok(Outcome::Matched(value));
            }
            Ok(Outcome::Absent) => {
                trace!(attempt, "alternative absent, rolling back");
                ctx.restore(&saved);
            }
            Err(err) => {
                trace!(attempt, "alternative failed, rolling back");
                ctx.restore(&saved);
                return Err(err);
            }
        }
    }
    Ok(Outcome::Absent)
}
