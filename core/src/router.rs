//! Router — entry point that drives a handler tree for one path at a time

use crate::combine::Outcome;
use crate::context::Context;
use crate::handler::Handler;
use crate::RouteError;
use tracing::{debug, warn};

/// Resolves paths against a root [`Handler`].
///
/// Each call builds a fresh [`Context`]; the handler tree itself is shared
/// and immutable, so a `Router` can serve many threads at once.
///
/// # Example
///
/// ```
/// use rota::{bunch, leaf, param, route, root, Context, Router, RouteError};
///
/// let router: Router<String> = Router::new(bunch(vec![
///     route(vec![root().into()], leaf(|_| "home".to_string())),
///     route(
///         vec!["admin".into()],
///         route(vec![root().into()], leaf(|_| "admin".to_string())),
///     ),
///     route(
///         vec!["users".into(), param("name").into()],
///         leaf(|ctx: &mut Context| format!("user {}", ctx.param("name").unwrap_or_default())),
///     ),
///     leaf(|_| "not found".to_string()),
/// ]));
///
/// assert_eq!(router.resolve("/").unwrap(), "home");
/// assert_eq!(router.resolve("/admin").unwrap(), "admin");
/// assert_eq!(router.resolve("/users/j%C3%B6hn").unwrap(), "user jöhn");
/// assert_eq!(router.resolve("/xyz").unwrap(), "not found");
/// ```
pub struct Router<T, S = ()> {
    root: Handler<T, S>,
}

impl<T, S> Router<T, S> {
    /// Build a router around `root`.
    #[must_use]
    pub fn new(root: Handler<T, S>) -> Self {
        Self { root }
    }

    /// Resolve `path` with default initial state.
    ///
    /// # Errors
    ///
    /// - [`RouteError::NotFound`] — no branch of the tree matched
    /// - [`RouteError::UnexpectedCall`] — a handler called the continuation
    ///   past the last handler
    /// - [`RouteError::Template`] — a template step could not be aligned
    pub fn resolve(&self, path: &str) -> Result<T, RouteError>
    where
        S: Default,
    {
        self.resolve_with(path, S::default())
    }

    /// Resolve `path` starting from the given state.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_with(&self, path: &str, state: S) -> Result<T, RouteError> {
        let mut ctx = Context::with_state(path, state);
        let outcome = self.root.call(&mut ctx, &mut |ctx: &mut Context<S>| {
            warn!(path = ctx.path(), "continuation called past the last handler");
            Err(RouteError::UnexpectedCall {
                path: ctx.path().to_owned(),
            })
        })?;

        match outcome {
            Outcome::Matched(value) => {
                debug!(path, "route resolved");
                Ok(value)
            }
            Outcome::Absent => {
                debug!(path, "no route matched");
                Err(RouteError::NotFound {
                    path: path.to_owned(),
                })
            }
        }
    }
}

impl<T, S> Clone for Router<T, S> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<T, S> std::fmt::Debug for Router<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("root", &self.root).finish()
    }
}

/// Wrap `root` in a resolving function.
///
/// ```
/// use rota::{create_router, leaf, route};
///
/// let router = create_router::<i32, ()>(route(vec!["foo".into()], leaf(|_| 42)));
/// assert_eq!(router("foo"), Ok(42));
/// ```
pub fn create_router<T, S: Default>(root: Handler<T, S>) -> impl Fn(&str) -> Result<T, RouteError> {
    let router = Router::new(root);
    move |path: &str| router.resolve(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{leaf, RouteNext};
    use crate::route::{bunch, param, re, route, root, split, template};
    use regex::Regex;

    fn not_found(result: Result<impl std::fmt::Debug, RouteError>) -> bool {
        matches!(result, Err(RouteError::NotFound { .. }))
    }

    #[test]
    fn simple_router() {
        let r: Router<i32> = Router::new(route(vec!["foo".into()], leaf(|_| 42)));

        assert_eq!(r.resolve("/foo/"), Ok(42));
        assert_eq!(r.resolve("/foo"), Ok(42));
        assert_eq!(r.resolve("foo"), Ok(42));
        assert!(not_found(r.resolve("foo/bar")));
        assert!(not_found(r.resolve("bar")));
        assert!(not_found(r.resolve("")));
    }

    #[test]
    fn not_found_carries_the_path() {
        let r: Router<i32> = Router::new(route(vec!["foo".into()], leaf(|_| 42)));
        assert_eq!(
            r.resolve("/nope"),
            Err(RouteError::NotFound {
                path: "/nope".to_string()
            })
        );
    }

    #[derive(Debug, Clone, Default)]
    struct Flags {
        is_foo: bool,
    }

    #[test]
    fn custom_state_passes_between_chained_handlers() {
        let mark: Handler<i32, Flags> = Handler::new(|ctx: &mut Context<Flags>, next| {
            ctx.state.is_foo = true;
            next(ctx)
        });
        let r = Router::new(route(
            vec!["foo".into(), mark.into()],
            leaf(|ctx: &mut Context<Flags>| if ctx.state.is_foo { 42 } else { 41 }),
        ));

        assert_eq!(r.resolve("foo"), Ok(42));
        assert_eq!(r.resolve_with("foo", Flags { is_foo: false }), Ok(42));
    }

    #[test]
    fn two_legs_router() {
        let r: Router<i32> = Router::new(bunch(vec![
            route(vec![Regex::new("^foo").unwrap().into()], leaf(|_| 42)),
            route(vec!["bar".into()], leaf(|_| 24)),
        ]));

        assert_eq!(r.resolve("/foo/"), Ok(42));
        assert_eq!(r.resolve("/foooo/"), Ok(42));
        assert_eq!(r.resolve("/bar"), Ok(24));
        assert!(not_found(r.resolve("foo/bar")));
        assert!(not_found(r.resolve("baz")));
    }

    #[test]
    fn fallback_handler() {
        let r: Router<i32> = Router::new(bunch(vec![
            route(vec!["foo".into()], leaf(|_| 42)),
            route(vec!["bar".into()], leaf(|_| 24)),
            leaf(|_| -1),
        ]));

        assert_eq!(r.resolve("/foo/"), Ok(42));
        assert_eq!(r.resolve("/bar"), Ok(24));
        assert_eq!(r.resolve("foo/bar"), Ok(-1));
        assert_eq!(r.resolve("baz"), Ok(-1));
    }

    fn deep_router() -> Router<String> {
        let set_admin: Handler<String> =
            Handler::new(|ctx, next| Ok(next(ctx)?.map(|page| format!("admin: {page}"))));

        Router::new(bunch(vec![
            route(vec![], leaf(|_| "home".to_string())),
            route(vec!["about".into()], leaf(|_| "about".to_string())),
            route(vec!["about".into(), "blank".into()], leaf(|_| "about:blank".to_string())),
            route(
                vec!["admin".into(), set_admin.into()],
                bunch(vec![
                    route(vec![], leaf(|_| "admin".to_string())),
                    route(
                        vec!["users".into()],
                        bunch(vec![
                            route(vec![], leaf(|_| "users".to_string())),
                            route(
                                vec![param("username").into()],
                                leaf(|ctx: &mut Context| {
                                    format!("user {}", ctx.param("username").unwrap_or_default())
                                }),
                            ),
                        ]),
                    ),
                    leaf(|_| "not found in admin".to_string()),
                ]),
            ),
            leaf(|_| "not found".to_string()),
        ]))
    }

    #[test]
    fn deep_router_with_params_and_fallbacks() {
        let r = deep_router();
        let cases = [
            ("/", "home"),
            ("/about", "about"),
            ("/about/blank", "about:blank"),
            ("/admin", "admin: admin"),
            ("/admin/users", "admin: users"),
            ("/admin/users/j%C3%B6hn", "admin: user jöhn"),
            ("/admin/admins", "admin: not found in admin"),
            ("/admin/users/john/snow", "admin: not found in admin"),
            ("/foo", "not found"),
        ];

        for (path, expected) in cases {
            assert_eq!(r.resolve(path).as_deref(), Ok(expected), "path {path:?}");
        }
    }

    #[test]
    fn nested_bunch_with_root_routes() {
        let r: Router<&'static str> = Router::new(bunch(vec![
            route(vec![root().into()], leaf(|_| "home")),
            route(vec!["admin".into()], route(vec![root().into()], leaf(|_| "admin"))),
            leaf(|_| "not found"),
        ]));

        assert_eq!(r.resolve("/"), Ok("home"));
        assert_eq!(r.resolve("/admin"), Ok("admin"));
        assert_eq!(r.resolve("/xyz"), Ok("not found"));
    }

    #[test]
    fn template_routes_with_language_guard() {
        // only ru/en are served; anything else falls through to the catch-all
        let only_langs: Handler<String> = Handler::new(|ctx, next: RouteNext<'_, String>| {
            match ctx.param("lang") {
                Some("ru" | "en") => next(ctx),
                _ => Ok(Outcome::Absent),
            }
        });
        let r: Router<String> = Router::new(bunch(vec![
            route(vec![template("/").into()], leaf(|_| "index".to_string())),
            route(
                vec![template("/{lang}").into(), only_langs.into()],
                bunch(vec![
                    route(vec![template("/home").into()], leaf(|_| "home".to_string())),
                    route(
                        vec![template("/{page=about}").into()],
                        leaf(|ctx: &mut Context| {
                            format!("about {}", ctx.param("lang").unwrap_or_default())
                        }),
                    ),
                ]),
            ),
            route(vec![template("").into()], greedy_tail()),
        ]));

        assert_eq!(r.resolve("/").unwrap(), "index");
        assert_eq!(r.resolve("/ru").unwrap(), "not found /ru");
        assert_eq!(r.resolve("/ru/foo").unwrap(), "not found /ru/foo");
        assert_eq!(r.resolve("/ru/home").unwrap(), "home");
        assert_eq!(r.resolve("/fr/home").unwrap(), "not found /fr/home");
        assert_eq!(r.resolve("/en/about").unwrap(), "about en");
    }

    fn greedy_tail() -> Handler<String> {
        leaf(|ctx: &mut Context| {
            assert!(ctx.params().is_empty());
            format!("not found {}", ctx.tail())
        })
        .greedy()
    }

    #[test]
    fn split_step_matches_multi_segment_prefix() {
        let r: Router<&'static str> = Router::new(bunch(vec![
            route(vec![split("/about/blank").into()], leaf(|_| "about:blank")),
            route(vec!["about".into()], leaf(|_| "about")),
        ]));
        assert_eq!(r.resolve("/about/blank"), Ok("about:blank"));
        assert_eq!(r.resolve("/about"), Ok("about"));
    }

    #[test]
    fn regex_step_captures_named_groups() {
        let r: Router<String> = Router::new(route(
            vec![
                "posts".into(),
                re(Regex::new(r"^(?P<year>\d{4})-(?P<slug>[a-z-]+)$").unwrap()).into(),
            ],
            leaf(|ctx: &mut Context| {
                format!(
                    "{}/{}",
                    ctx.param("year").unwrap_or_default(),
                    ctx.param("slug").unwrap_or_default()
                )
            }),
        ));
        assert_eq!(r.resolve("/posts/2024-hello-world").unwrap(), "2024/hello-world");
        assert!(not_found(r.resolve("/posts/hello")));
    }

    #[test]
    fn calling_continuation_from_last_handler_is_unexpected() {
        let r: Router<i32> = Router::new(route(
            vec!["foo".into()],
            Handler::new(|ctx, next| next(ctx)),
        ));
        assert_eq!(
            r.resolve("/foo"),
            Err(RouteError::UnexpectedCall {
                path: "/foo".to_string()
            })
        );
        assert!(not_found(r.resolve("/bar")));
    }

    #[test]
    fn unexpected_call_is_not_swallowed_by_bunch_fallback() {
        let r: Router<i32> = Router::new(bunch(vec![
            Handler::new(|ctx, next| next(ctx)),
            leaf(|_| 1),
        ]));
        assert!(matches!(
            r.resolve("/"),
            Err(RouteError::UnexpectedCall { .. })
        ));
    }

    #[test]
    fn legitimate_empty_results_are_not_absent() {
        let r: Router<Option<()>> = Router::new(bunch(vec![
            route(vec!["none".into()], leaf(|_| None)),
            leaf(|_| Some(())),
        ]));
        assert_eq!(r.resolve("/none"), Ok(None));
        assert_eq!(r.resolve("/other"), Ok(Some(())));
    }

    #[test]
    fn create_router_resolves_like_router() {
        let r = create_router::<&'static str, ()>(route(vec!["foo".into()], leaf(|_| "foo")));
        assert_eq!(r("/foo"), Ok("foo"));
        assert!(not_found(r("/")));
    }

    #[test]
    fn router_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router<String>>();
    }
}
