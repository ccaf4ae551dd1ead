//! Route building — segment matchers, routes and bunches
//!
//! Every primitive produces a [`Handler`]. Segment matchers consume from the
//! front of the context's remaining segments and call the continuation on
//! success; they decline with [`Outcome::Absent`] otherwise.
//!
//! | Primitive | Consumes | Captures |
//! |-----------|----------|----------|
//! | [`literal`] | one segment equal to the text | — |
//! | [`re`] / [`pattern`] | one segment the regex matches | named groups |
//! | [`param`] | any one segment | the segment |
//! | [`root`] | nothing; requires no segments left | — |
//! | [`split`] | several literal segments | — |
//! | [`template`] | the template's prefix | template placeholders |
//!
//! [`route`] chains steps into one route; [`bunch`] tries routes in order
//! and rolls back the ones that decline.

use crate::combine::{chain, first_match, Outcome};
use crate::context::{to_segments, Context};
use crate::handler::Handler;
use crate::template::Template;
use crate::{RouteError, MAX_REGEX_PATTERN_LENGTH};
use regex::Regex;

/// One step of a [`route`].
///
/// Resolved into a [`Handler`] when the route is built; never inspected
/// again while matching.
pub enum Step<T, S = ()> {
    /// Matches one segment exactly. See [`literal`].
    Literal(String),
    /// Matches one segment against a regex. See [`re`].
    Pattern(Regex),
    /// Any handler, used as-is.
    Handler(Handler<T, S>),
}

impl<T: 'static, S: 'static> Step<T, S> {
    /// Resolve this step into a handler.
    pub fn into_handler(self) -> Handler<T, S> {
        match self {
            Self::Literal(text) => literal(text),
            Self::Pattern(regex) => re(regex),
            Self::Handler(handler) => handler,
        }
    }
}

impl<T, S> From<&str> for Step<T, S> {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_owned())
    }
}

impl<T, S> From<String> for Step<T, S> {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl<T, S> From<Regex> for Step<T, S> {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

impl<T, S> From<Handler<T, S>> for Step<T, S> {
    fn from(handler: Handler<T, S>) -> Self {
        Self::Handler(handler)
    }
}

impl<T, S> std::fmt::Debug for Step<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::Handler(handler) => f.debug_tuple("Handler").field(handler).finish(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Segment matchers
// ═══════════════════════════════════════════════════════════════════════════════

/// Consume one segment equal to `text`.
pub fn literal<T: 'static, S: 'static>(text: impl Into<String>) -> Handler<T, S> {
    let text = text.into();
    Handler::new(move |ctx, next| {
        if ctx.peek() != Some(text.as_str()) {
            return Ok(Outcome::Absent);
        }
        ctx.consume();
        next(ctx)
    })
}

/// Consume one segment the regex matches anywhere in (anchor it with `^`/`$`
/// for whole-segment matches). Named groups that took part in the match are
/// captured as parameters.
///
/// ```
/// use regex::Regex;
/// use rota::{leaf, re, route, Router};
///
/// let router: Router<String> = Router::new(route(
///     vec![re(Regex::new(r"^(?P<id>\d+)$").unwrap()).into()],
///     leaf(|ctx| ctx.param("id").unwrap_or_default().to_owned()),
/// ));
/// assert_eq!(router.resolve("/42").unwrap(), "42");
/// assert!(router.resolve("/abc").is_err());
/// ```
pub fn re<T: 'static, S: 'static>(regex: Regex) -> Handler<T, S> {
    Handler::new(move |ctx, next| {
        let named: Vec<(String, String)> = {
            let Some(segment) = ctx.peek() else {
                return Ok(Outcome::Absent);
            };
            let Some(captures) = regex.captures(segment) else {
                return Ok(Outcome::Absent);
            };
            regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_owned(), m.as_str().to_owned()))
                })
                .collect()
        };

        ctx.consume();
        for (name, value) in named {
            ctx.insert_param(name, value);
        }
        next(ctx)
    })
}

/// Compile `pattern` and build a [`re`] handler from it.
///
/// # Errors
///
/// Returns [`RouteError::InvalidPattern`] if the pattern is too long or does
/// not compile.
pub fn pattern<T: 'static, S: 'static>(pattern: &str) -> Result<Handler<T, S>, RouteError> {
    if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
        return Err(RouteError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: format!(
                "pattern length is {}, but maximum allowed is {MAX_REGEX_PATTERN_LENGTH}",
                pattern.len()
            ),
        });
    }
    Regex::new(pattern)
        .map(re)
        .map_err(|e| RouteError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        })
}

/// Consume any one segment and capture it under `name`.
pub fn param<T: 'static, S: 'static>(name: impl Into<String>) -> Handler<T, S> {
    let name = name.into();
    Handler::new(move |ctx, next| match ctx.consume() {
        Some(segment) => {
            ctx.insert_param(name.as_str(), segment);
            next(ctx)
        }
        None => Ok(Outcome::Absent),
    })
}

/// Match only when no segments remain. Consumes nothing.
pub fn root<T: 'static, S: 'static>() -> Handler<T, S> {
    Handler::new(|ctx, next| {
        if ctx.is_exhausted() {
            next(ctx)
        } else {
            Ok(Outcome::Absent)
        }
    })
}

/// Consume the literal segments of `path` in one step.
///
/// `split("about/blank")` behaves like `literal("about")` followed by
/// `literal("blank")`. Segments are decoded like request paths.
pub fn split<T: 'static, S: 'static>(path: &str) -> Handler<T, S> {
    let expected = to_segments(path);
    Handler::new(move |ctx, next| {
        let segments = ctx.segments();
        if segments.len() < expected.len() || !expected.iter().zip(segments).all(|(a, b)| a == b) {
            return Ok(Outcome::Absent);
        }
        ctx.consume_many(expected.len());
        next(ctx)
    })
}

/// Consume the prefix described by a [`Template`].
///
/// The remaining segments are rendered as a `/`-rooted path (just `/` when
/// none remain) and matched structurally. Placeholders are captured, and the
/// match tail becomes the new remaining segments. The empty template matches
/// anything and consumes nothing.
///
/// Templates should start with `/`: a placeholder that lines up with a
/// separator fails routing with [`RouteError::Template`].
///
/// ```
/// use rota::{leaf, route, template, Router};
///
/// let router: Router<String> = Router::new(route(
///     vec![template("/{lang}/{page=about}").into()],
///     leaf(|ctx| format!("{}:{}", ctx.param("lang").unwrap_or(""), ctx.param("page").unwrap_or(""))),
/// ));
/// assert_eq!(router.resolve("/en/about").unwrap(), "en:about");
/// assert!(router.resolve("/en/home").is_err());
/// ```
pub fn template<T: 'static, S: 'static>(template: &str) -> Handler<T, S> {
    let template = Template::parse(template);
    Handler::new(move |ctx, next| {
        let rendered = if ctx.is_exhausted() {
            String::from("/")
        } else {
            ctx.tail()
        };
        let Some(matched) = template.matches(&rendered)? else {
            return Ok(Outcome::Absent);
        };
        for (name, value) in matched.params {
            ctx.insert_param(name, value);
        }
        ctx.set_segments(to_segments(&matched.tail));
        next(ctx)
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Composition
// ═══════════════════════════════════════════════════════════════════════════════

/// Chain `steps` and finish with `last`.
///
/// A non-greedy `last` only runs when every segment has been consumed; a
/// greedy one runs regardless. The route itself is greedy, so it can be the
/// final step of an enclosing route.
///
/// ```
/// use rota::{leaf, route, Router, RouteError};
///
/// let router: Router<i32> = Router::new(route(vec!["foo".into()], leaf(|_| 42)));
/// assert_eq!(router.resolve("/foo/"), Ok(42));
/// assert!(matches!(router.resolve("foo/bar"), Err(RouteError::NotFound { .. })));
/// ```
pub fn route<T: 'static, S: 'static>(steps: Vec<Step<T, S>>, last: Handler<T, S>) -> Handler<T, S> {
    let mut behaviors: Vec<_> = steps
        .into_iter()
        .map(|step| step.into_handler().into_behavior())
        .collect();
    behaviors.push(if last.is_greedy() {
        last.into_behavior()
    } else {
        exhaustive(last).into_behavior()
    });
    Handler::from_behavior(chain(behaviors), true)
}

/// Try `handlers` in order; the first one that matches wins.
///
/// Each attempt runs against a snapshot of the context, so a handler that
/// consumed segments, captured parameters or changed state before declining
/// leaves nothing behind. The bunch is greedy.
pub fn bunch<T: 'static, S: Clone + 'static>(handlers: Vec<Handler<T, S>>) -> Handler<T, S> {
    let behaviors = handlers.into_iter().map(Handler::into_behavior).collect();
    Handler::from_behavior(first_match(behaviors), true)
}

/// Mark `handler` greedy without changing what it does.
#[must_use]
pub fn greedy<T, S>(handler: Handler<T, S>) -> Handler<T, S> {
    handler.greedy()
}

fn exhaustive<T: 'static, S: 'static>(last: Handler<T, S>) -> Handler<T, S> {
    Handler::new(move |ctx, next| {
        if ctx.is_exhausted() {
            last.call(ctx, next)
        } else {
            Ok(Outcome::Absent)
        }
    })
}
