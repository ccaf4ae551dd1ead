//! Config types for data-driven router construction.
//!
//! These types describe a route tree as plain data (JSON/YAML) and load into
//! a [`Router`] whose leaves answer with a [`Resolution`].
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime building block |
//! |-------------|------------------------|
//! | [`RouteConfig::Route`] | [`route`](crate::route) |
//! | [`RouteConfig::Bunch`] | [`bunch`](crate::bunch) |
//! | [`RouteConfig::Action`] | [`leaf`](crate::leaf) |
//! | [`StepConfig`] | [`literal`](crate::literal), [`param`](crate::param), [`re`](crate::re), ... |
//!
//! # Example
//!
//! ```
//! use rota::config::{load_router, RouteConfig};
//!
//! let config: RouteConfig = serde_json::from_value(serde_json::json!({
//!     "type": "bunch",
//!     "routes": [
//!         { "type": "route", "steps": [], "action": "home" },
//!         { "type": "route", "steps": [{ "literal": "users" }, { "param": "name" }], "action": "user" },
//!         { "type": "action", "action": "not-found" }
//!     ]
//! }))
//! .unwrap();
//!
//! let router = load_router(config).unwrap();
//! let hit = router.resolve("/users/ann").unwrap();
//! assert_eq!(hit.action, "user");
//! assert_eq!(hit.params["name"], "ann");
//! assert_eq!(router.resolve("/nope").unwrap().action, "not-found");
//! ```

use crate::context::Context;
use crate::handler::{leaf, Handler};
use crate::route::{bunch, literal, param, re, root, route, split, template, Step};
use crate::router::Router;
use crate::{MAX_DEPTH, MAX_PATTERN_LENGTH, MAX_REGEX_PATTERN_LENGTH, MAX_ROUTES_PER_BUNCH};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Configuration for one node of a route tree.
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "route", "steps": [...], "action": "home" }
/// { "type": "route", "steps": [...], "then": { ... } }
/// { "type": "bunch", "routes": [...] }
/// { "type": "action", "action": "not-found" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteConfig {
    /// Steps followed by either an action or a nested node.
    Route {
        /// Steps consumed in order.
        #[serde(default)]
        steps: Vec<StepConfig>,
        /// Answer with this action once the steps match.
        #[serde(default)]
        action: Option<String>,
        /// Continue into this node once the steps match.
        #[serde(default)]
        then: Option<Box<RouteConfig>>,
        /// Let `action` answer with segments left over.
        #[serde(default)]
        greedy: bool,
    },

    /// Alternatives tried in order (first match wins).
    Bunch {
        /// Child nodes.
        routes: Vec<RouteConfig>,
    },

    /// Answer unconditionally.
    Action {
        /// The action name.
        action: String,
        /// Let the action answer with segments left over when it ends a route.
        #[serde(default)]
        greedy: bool,
    },
}

/// Configuration for one route step.
///
/// Externally tagged: `{ "literal": "admin" }`, `{ "param": "user" }`,
/// `{ "regex": "^\\d+$" }`, `{ "split": "about/blank" }`,
/// `{ "template": "/{lang}" }`, or the bare string `"root"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepConfig {
    /// One segment equal to the text.
    Literal(String),
    /// Any one segment, captured under the name.
    Param(String),
    /// One segment matching the regex; named groups are captured.
    Regex(String),
    /// Several literal segments.
    Split(String),
    /// A template prefix.
    Template(String),
    /// No segments left.
    Root,
}

/// What a config-loaded router answers with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The matched action name.
    pub action: String,
    /// Captured parameters, sorted by name.
    pub params: BTreeMap<String, String>,
    /// Unconsumed segments as a `/`-prefixed, percent-encoded path; empty
    /// when every segment was consumed.
    pub tail: String,
}

/// Errors from loading a route configuration.
///
/// These are caught at load time, never while resolving. Fix the
/// configuration and load it again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The configuration could not be deserialized.
    #[error("invalid config: {reason}")]
    Parse {
        /// The underlying error message.
        reason: String,
    },
    /// A regex step does not compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },
    /// Route nesting exceeds [`MAX_DEPTH`].
    #[error("route nesting depth is {depth}, but maximum allowed is {max}; flatten the route tree")]
    DepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// A bunch has more than [`MAX_ROUTES_PER_BUNCH`] routes.
    #[error("bunch has {count} routes, but maximum allowed is {max}")]
    TooManyRoutes {
        /// Actual count of routes.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// A step's text or pattern is too long.
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// A route has neither `action` nor `then`.
    #[error("route needs exactly one of `action` or `then`, found neither")]
    EmptyRoute,
    /// A route has both `action` and `then`.
    #[error("route needs exactly one of `action` or `then`, found both")]
    ConflictingRoute,
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

impl RouteConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown node types.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Depth of this node: 1 for an action, plus one per `route`/`bunch` level.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Route { then, .. } => 1 + then.as_deref().map_or(1, Self::depth),
            Self::Bunch { routes } => 1 + routes.iter().map(Self::depth).max().unwrap_or(0),
            Self::Action { .. } => 1,
        }
    }
}

/// Load a [`Router`] from configuration.
///
/// Walks the config tree, compiles steps, and validates size limits before
/// anything is built.
///
/// # Errors
///
/// - [`ConfigError::DepthExceeded`] — nesting exceeds [`MAX_DEPTH`]
/// - [`ConfigError::TooManyRoutes`] — a bunch exceeds [`MAX_ROUTES_PER_BUNCH`]
/// - [`ConfigError::PatternTooLong`] — a step exceeds [`MAX_PATTERN_LENGTH`]
///   (or [`MAX_REGEX_PATTERN_LENGTH`] for regexes)
/// - [`ConfigError::InvalidPattern`] — a regex does not compile
/// - [`ConfigError::EmptyRoute`] / [`ConfigError::ConflictingRoute`] — a route
///   without exactly one of `action` and `then`
pub fn load_router(config: RouteConfig) -> Result<Router<Resolution>, ConfigError> {
    let depth = config.depth();
    if depth > MAX_DEPTH {
        return Err(ConfigError::DepthExceeded {
            depth,
            max: MAX_DEPTH,
        });
    }
    let root = load_node(config)?;
    debug!(depth, "loaded route config");
    Ok(Router::new(root))
}

fn load_node(config: RouteConfig) -> Result<Handler<Resolution>, ConfigError> {
    match config {
        RouteConfig::Route {
            steps,
            action,
            then,
            greedy,
        } => {
            let steps = steps
                .into_iter()
                .map(load_step)
                .collect::<Result<Vec<_>, _>>()?;
            let last = match (action, then) {
                (Some(action), None) => action_handler(action, greedy),
                (None, Some(then)) => load_node(*then)?,
                (None, None) => return Err(ConfigError::EmptyRoute),
                (Some(_), Some(_)) => return Err(ConfigError::ConflictingRoute),
            };
            Ok(route(steps, last))
        }
        RouteConfig::Bunch { routes } => {
            if routes.len() > MAX_ROUTES_PER_BUNCH {
                return Err(ConfigError::TooManyRoutes {
                    count: routes.len(),
                    max: MAX_ROUTES_PER_BUNCH,
                });
            }
            let handlers = routes
                .into_iter()
                .map(load_node)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(bunch(handlers))
        }
        RouteConfig::Action { action, greedy } => Ok(action_handler(action, greedy)),
    }
}

fn load_step(config: StepConfig) -> Result<Step<Resolution>, ConfigError> {
    let handler: Handler<Resolution> = match config {
        StepConfig::Literal(text) => {
            check_length(&text, MAX_PATTERN_LENGTH)?;
            literal(text)
        }
        StepConfig::Param(name) => param(name),
        StepConfig::Regex(pattern) => {
            check_length(&pattern, MAX_REGEX_PATTERN_LENGTH)?;
            let regex = Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
                reason: e.to_string(),
                pattern,
            })?;
            re(regex)
        }
        StepConfig::Split(path) => {
            check_length(&path, MAX_PATTERN_LENGTH)?;
            split(&path)
        }
        StepConfig::Template(text) => {
            check_length(&text, MAX_PATTERN_LENGTH)?;
            template(&text)
        }
        StepConfig::Root => root(),
    };
    Ok(handler.into())
}

fn check_length(text: &str, max: usize) -> Result<(), ConfigError> {
    if text.len() > max {
        return Err(ConfigError::PatternTooLong {
            len: text.len(),
            max,
        });
    }
    Ok(())
}

fn action_handler(action: String, greedy: bool) -> Handler<Resolution> {
    let handler = leaf(move |ctx: &mut Context| Resolution {
        action: action.clone(),
        params: ctx
            .params()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        tail: ctx.tail(),
    });
    if greedy {
        handler.greedy()
    } else {
        handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouteError;

    fn load(json: serde_json::Value) -> Result<Router<Resolution>, ConfigError> {
        load_router(serde_json::from_value(json).map_err(ConfigError::from)?)
    }

    fn action_of(router: &Router<Resolution>, path: &str) -> Option<String> {
        router.resolve(path).ok().map(|r| r.action)
    }

    fn nested(depth: usize) -> serde_json::Value {
        (1..depth).fold(serde_json::json!({ "type": "action", "action": "x" }), |inner, _| {
            serde_json::json!({ "type": "route", "steps": [], "then": inner })
        })
    }

    #[test]
    fn deserialize_route_tree() {
        let config: RouteConfig = serde_json::from_value(serde_json::json!({
            "type": "bunch",
            "routes": [
                { "type": "route", "steps": ["root"], "action": "home" },
                { "type": "route", "steps": [{ "literal": "a" }, { "regex": "^b" }], "then": {
                    "type": "action", "action": "ab"
                }}
            ]
        }))
        .unwrap();

        match &config {
            RouteConfig::Bunch { routes } => {
                assert_eq!(routes.len(), 2);
                assert!(matches!(
                    &routes[0],
                    RouteConfig::Route { steps, greedy: false, .. } if steps == &[StepConfig::Root]
                ));
            }
            _ => panic!("expected bunch"),
        }
        assert_eq!(config.depth(), 3);
    }

    #[test]
    fn deserialize_yaml() {
        let yaml = r#"
type: bunch
routes:
  - type: route
    steps: []
    action: home
  - type: route
    steps: [{ literal: admin }, { param: user }]
    action: user
  - type: route
    steps: [{ template: "/{lang=ru}" }]
    action: ru
    greedy: true
  - type: action
    action: not-found
"#;
        let config: RouteConfig = serde_yaml::from_str(yaml).unwrap();
        let router = load_router(config).unwrap();

        assert_eq!(action_of(&router, "/").as_deref(), Some("home"));
        assert_eq!(
            router.resolve("/admin/ann").unwrap(),
            Resolution {
                action: "user".to_string(),
                params: [("user".to_string(), "ann".to_string())].into(),
                tail: String::new(),
            }
        );
        let ru = router.resolve("/ru/about/x%20y").unwrap();
        assert_eq!(ru.action, "ru");
        assert_eq!(ru.params["lang"], "ru");
        assert_eq!(ru.tail, "/about/x%20y");
        assert_eq!(action_of(&router, "/admin").as_deref(), Some("not-found"));
    }

    #[test]
    fn non_greedy_action_requires_exhaustion() {
        let router = load(serde_json::json!({
            "type": "route", "steps": [{ "param": "lang" }], "action": "lang"
        }))
        .unwrap();
        assert_eq!(action_of(&router, "/en").as_deref(), Some("lang"));
        assert!(matches!(
            router.resolve("/en/more"),
            Err(RouteError::NotFound { .. })
        ));
    }

    #[test]
    fn regex_and_split_steps() {
        let router = load(serde_json::json!({
            "type": "bunch",
            "routes": [
                { "type": "route", "steps": [{ "split": "about/blank" }], "action": "blank" },
                { "type": "route", "steps": [{ "regex": "^(?P<id>\\d+)$" }], "action": "id" }
            ]
        }))
        .unwrap();
        assert_eq!(action_of(&router, "/about/blank").as_deref(), Some("blank"));
        assert_eq!(router.resolve("/17").unwrap().params["id"], "17");
        assert!(router.resolve("/about").is_err());
    }

    #[test]
    fn route_requires_exactly_one_continuation() {
        assert_eq!(
            load(serde_json::json!({ "type": "route", "steps": [] })).unwrap_err(),
            ConfigError::EmptyRoute
        );
        assert_eq!(
            load(serde_json::json!({
                "type": "route", "steps": [], "action": "a",
                "then": { "type": "action", "action": "b" }
            }))
            .unwrap_err(),
            ConfigError::ConflictingRoute
        );
    }

    #[test]
    fn invalid_regex_rejected() {
        let err = load(serde_json::json!({
            "type": "route", "steps": [{ "regex": "[bad" }], "action": "x"
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { pattern, .. } if pattern == "[bad"));
    }

    #[test]
    fn pattern_length_limits() {
        let long_regex = "a".repeat(MAX_REGEX_PATTERN_LENGTH + 1);
        let err = load(serde_json::json!({
            "type": "route", "steps": [{ "regex": long_regex }], "action": "x"
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::PatternTooLong {
                len: MAX_REGEX_PATTERN_LENGTH + 1,
                max: MAX_REGEX_PATTERN_LENGTH,
            }
        );

        let long_literal = "a".repeat(MAX_PATTERN_LENGTH + 1);
        let err = load(serde_json::json!({
            "type": "route", "steps": [{ "literal": long_literal }], "action": "x"
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PatternTooLong { .. }));
    }

    #[test]
    fn depth_at_limit_accepted() {
        assert!(load(nested(MAX_DEPTH)).is_ok());
    }

    #[test]
    fn depth_over_limit_rejected() {
        assert_eq!(
            load(nested(MAX_DEPTH + 1)).unwrap_err(),
            ConfigError::DepthExceeded {
                depth: MAX_DEPTH + 1,
                max: MAX_DEPTH,
            }
        );
    }

    #[test]
    fn too_many_routes_rejected() {
        let routes: Vec<_> = (0..=MAX_ROUTES_PER_BUNCH)
            .map(|_| serde_json::json!({ "type": "action", "action": "x" }))
            .collect();
        let err = load(serde_json::json!({ "type": "bunch", "routes": routes })).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooManyRoutes {
                count: MAX_ROUTES_PER_BUNCH + 1,
                max: MAX_ROUTES_PER_BUNCH,
            }
        );
    }

    #[test]
    fn unknown_node_type_is_parse_error() {
        let err = RouteConfig::from_json(r#"{ "type": "teleport" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn resolution_serializes_sorted_params() {
        let resolution = Resolution {
            action: "a".to_string(),
            params: [
                ("z".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
            .into(),
            tail: String::new(),
        };
        assert_eq!(
            serde_json::to_string(&resolution).unwrap(),
            r#"{"action":"a","params":{"b":"2","z":"1"},"tail":""}"#
        );
    }
}
