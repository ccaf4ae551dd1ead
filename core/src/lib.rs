//! rota - backtracking path router built from composable handlers
//!
//! Routes are trees of handlers. Each handler sees the request [`Context`]
//! and a continuation; it consumes segments, captures parameters, and either
//! continues, answers, or declines.
//!
//! # Architecture
//!
//! - [`Token`] / [`tokenize_template`] / [`tokenize_path`] — lexical layer
//! - [`Template`] — structural prefix matching with `{name}` and `{name=value}` slots
//! - [`chain`] / [`first_match`] — continuation combinators, generic over any
//!   context implementing [`Restore`]
//! - [`Handler`] — a behavior plus the `greedy` flag
//! - [`literal`], [`re`], [`param`], [`root`], [`split`], [`template`] — segment matchers
//! - [`route`] / [`bunch`] — sequential and alternative composition
//! - [`Router`] — per-path entry point
//!
//! # Key Design Insights
//!
//! 1. **Absent is not empty**: a handler declines with [`Outcome::Absent`].
//!    `Ok(Outcome::Matched(None))` is a legitimate answer when `T = Option<_>`.
//!
//! 2. **Alternation rolls back**: [`bunch`] restores segments, parameters and
//!    state before trying the next branch, on a miss and on an error alike.
//!
//! 3. **Greedy is a flag, not a wrapper**: a non-greedy final handler of a
//!    [`route`] only runs once every segment is consumed.
//!
//! # Example
//!
//! ```
//! use rota::prelude::*;
//!
//! let set_admin: Handler<String> =
//!     Handler::new(|ctx, next| Ok(next(ctx)?.map(|page| format!("admin: {page}"))));
//!
//! let router: Router<String> = Router::new(bunch(vec![
//!     route(vec![], leaf(|_| "home".to_string())),
//!     route(
//!         vec!["admin".into(), set_admin.into()],
//!         bunch(vec![
//!             route(vec![], leaf(|_| "admin".to_string())),
//!             route(
//!                 vec!["users".into(), param("name").into()],
//!                 leaf(|ctx: &mut Context| format!("user {}", ctx.param("name").unwrap_or_default())),
//!             ),
//!         ]),
//!     ),
//!     leaf(|_| "not found".to_string()),
//! ]));
//!
//! assert_eq!(router.resolve("/").unwrap(), "home");
//! assert_eq!(router.resolve("/admin/users/j%C3%B6hn").unwrap(), "admin: user jöhn");
//! assert_eq!(router.resolve("/elsewhere").unwrap(), "not found");
//! ```
//!
//! # Features
//!
//! - `config` — build routers from serde configuration ([`config`] module)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod combine;
mod context;
mod handler;
mod route;
mod router;
mod template;
mod token;

#[cfg(feature = "config")]
pub mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Lexical layer
pub use token::{decode_segment, render, tokenize_path, tokenize_template, Token, SEPARATOR};

// Structural matcher
pub use template::{match_tokens, Match, Params, Template};

// Combinators
pub use combine::{chain, first_match, run_chain, run_first_match, Behavior, Next, Outcome, Restore};

// Router layer
pub use context::{to_segments, Context, ContextSnapshot};
pub use handler::{leaf, Flow, Handler, RouteNext};
pub use route::{bunch, greedy, literal, param, pattern, re, root, route, split, template, Step};
pub use router::{create_router, Router};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use rota::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Composition
        bunch,
        greedy,
        leaf,
        // Segment matchers
        literal,
        param,
        pattern,
        re,
        root,
        route,
        split,
        template,
        // Core types
        Context,
        Flow,
        Handler,
        Outcome,
        RouteError,
        RouteNext,
        Router,
        Step,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum nesting depth of a configured route tree.
///
/// Every level of nesting adds stack frames to a resolve call. Checked when a
/// router is loaded from configuration.
pub const MAX_DEPTH: usize = 32;

/// Maximum number of routes in a single configured bunch.
///
/// Bounds the width of a tree the same way [`MAX_DEPTH`] bounds its height.
pub const MAX_ROUTES_PER_BUNCH: usize = 256;

/// Maximum length for literal segments and templates in configuration.
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Maximum length for regex patterns.
///
/// Shorter than [`MAX_PATTERN_LENGTH`] because compile cost grows faster
/// for regexes than for literal text.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// A template and a path disagree about where separators are.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// A placeholder in the template lines up with a non-text path token.
    #[error("template token {template} at position {position} cannot match path token {path}")]
    Misaligned {
        /// Token index where the alignment broke.
        position: usize,
        /// The template's token.
        template: Token,
        /// The path's token.
        path: Token,
    },
}

/// Errors from building or resolving routes.
///
/// A path that simply matches nothing is [`RouteError::NotFound`]; the other
/// variants mean the route tree itself is wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// No route matched the path.
    #[error("no route matched \"{path}\"")]
    NotFound {
        /// The path that was resolved.
        path: String,
    },
    /// A handler called its continuation after the last handler of the tree.
    #[error("continuation called past the last handler while resolving \"{path}\"")]
    UnexpectedCall {
        /// The path that was resolved.
        path: String,
    },
    /// A template step could not be aligned with the path.
    #[error(transparent)]
    Template(#[from] MatchError),
    /// A regex pattern is too long or does not compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
}
