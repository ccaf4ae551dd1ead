//! Route handlers — a behavior plus the `greedy` capability flag

use crate::combine::{Behavior, Next, Outcome};
use crate::context::Context;
use crate::RouteError;
use std::fmt;
use std::sync::Arc;

/// What a route handler returns: a matched value, `Absent`, or a failure
/// that aborts routing.
pub type Flow<T> = Result<Outcome<T>, RouteError>;

/// Continuation handed to a route handler.
pub type RouteNext<'a, T, S = ()> = Next<'a, Context<S>, Flow<T>>;

/// A route handler.
///
/// Receives the request [`Context`] and a continuation. It may consume
/// segments and call the continuation, return a value directly, or decline
/// with [`Outcome::Absent`].
///
/// A greedy handler may succeed while segments remain. [`route`](crate::route)
/// only runs a non-greedy final handler once every segment is consumed.
///
/// # Example
///
/// ```
/// use rota::{Handler, Outcome};
///
/// // Middleware that decorates whatever the rest of the chain produces
/// let admin: Handler<String> = Handler::new(|ctx, next| {
///     Ok(next(ctx)?.map(|page| format!("admin: {page}")))
/// });
/// assert!(!admin.is_greedy());
/// ```
pub struct Handler<T, S = ()> {
    behavior: Behavior<Context<S>, Flow<T>>,
    greedy: bool,
}

impl<T: 'static, S: 'static> Handler<T, S> {
    /// Wrap a continuation-aware handler function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context<S>, RouteNext<'_, T, S>) -> Flow<T> + Send + Sync + 'static,
    {
        Self {
            behavior: Arc::new(f),
            greedy: false,
        }
    }
}

impl<T, S> Handler<T, S> {
    pub(crate) fn from_behavior(behavior: Behavior<Context<S>, Flow<T>>, greedy: bool) -> Self {
        Self { behavior, greedy }
    }

    pub(crate) fn into_behavior(self) -> Behavior<Context<S>, Flow<T>> {
        self.behavior
    }

    /// Run the handler.
    ///
    /// # Errors
    ///
    /// Propagates whatever [`RouteError`] the handler tree raises.
    pub fn call(&self, ctx: &mut Context<S>, next: RouteNext<'_, T, S>) -> Flow<T> {
        (self.behavior)(ctx, next)
    }

    /// Whether this handler may succeed with segments left over.
    #[must_use]
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    /// Mark this handler greedy. Behavior is unchanged.
    #[must_use]
    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }
}

impl<T, S> Clone for Handler<T, S> {
    fn clone(&self) -> Self {
        Self {
            behavior: Arc::clone(&self.behavior),
            greedy: self.greedy,
        }
    }
}

impl<T, S> fmt::Debug for Handler<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("greedy", &self.greedy)
            .finish_non_exhaustive()
    }
}

/// A final handler that always produces a value.
///
/// ```
/// use rota::{leaf, Context, Outcome};
///
/// let h = leaf(|ctx: &mut Context| ctx.remaining());
/// let mut ctx = Context::new("/a/b");
/// assert_eq!(h.call(&mut ctx, &mut |_| unreachable!()), Ok(Outcome::Matched(2)));
/// ```
pub fn leaf<T, S, F>(f: F) -> Handler<T, S>
where
    T: 'static,
    S: 'static,
    F: Fn(&mut Context<S>) -> T + Send + Sync + 'static,
{
    Handler::new(move |ctx, _next| Ok(Outcome::Matched(f(ctx))))
}
