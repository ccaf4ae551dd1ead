//! Template — structural matching of a tokenized template against a path
//!
//! A [`Template`] is parsed once and matched against many paths. Matching is
//! a prefix alignment: the template may be shorter than the path, and the
//! unconsumed remainder is returned as the match [`tail`](Match::tail).

use crate::token::{render, tokenize_path, tokenize_template, Token};
use crate::MatchError;
use std::collections::HashMap;

/// Captured parameters, keyed by name.
pub type Params = HashMap<String, String>;

/// A successful structural match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    /// Parameters captured by `{name}` and `{name=value}` slots.
    pub params: Params,
    /// The path that was matched.
    pub path: String,
    /// The part of the path beyond the template, rendered back to path syntax.
    pub tail: String,
}

/// A parsed route template.
///
/// # Example
///
/// ```
/// use rota::Template;
///
/// let template = Template::parse("/abc/{foo}/{bar}");
/// let m = template.matches("/abc/def/gh/ij").unwrap().unwrap();
/// assert_eq!(m.params["foo"], "def");
/// assert_eq!(m.params["bar"], "gh");
/// assert_eq!(m.tail, "/ij");
///
/// assert!(template.matches("/abc/def").unwrap().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    tokens: Vec<Token>,
}

impl Template {
    /// Tokenize `template` once for repeated matching.
    pub fn parse(template: impl Into<String>) -> Self {
        let source = template.into();
        let tokens = tokenize_template(&source);
        Self { source, tokens }
    }

    /// The template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The template's tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns `true` for the empty catch-all template.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Match a concrete path against this template.
    ///
    /// Returns `Ok(None)` when the path does not match.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Misaligned`] when a placeholder lines up with a
    /// separator (e.g. `{x}` against `/abc`). That is a malformed template
    /// for the path, not a miss.
    pub fn matches(&self, path: &str) -> Result<Option<Match>, MatchError> {
        let path_tokens = tokenize_path(path);
        Ok(match_tokens(&self.tokens, &path_tokens)?.map(|mut m| {
            m.path = path.to_owned();
            m
        }))
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Align `template` against `path` token by token.
///
/// The returned [`Match`] has an empty `path`; [`Template::matches`] fills it.
///
/// # Errors
///
/// Returns [`MatchError::Misaligned`] for a token pairing that a well-formed
/// template/path pair never produces.
pub fn match_tokens(template: &[Token], path: &[Token]) -> Result<Option<Match>, MatchError> {
    if path.len() < template.len() {
        return Ok(None);
    }

    let mut params = Params::new();
    for (position, (expected, actual)) in template.iter().zip(path).enumerate() {
        match (expected, actual) {
            (Token::Separator | Token::Text(_), _) => {
                if expected != actual {
                    return Ok(None);
                }
            }
            (Token::Param(name), Token::Text(value)) => {
                if !bind(&mut params, name, value) {
                    return Ok(None);
                }
            }
            (Token::Const { name, value }, Token::Text(actual_value)) => {
                if value != actual_value || !bind(&mut params, name, actual_value) {
                    return Ok(None);
                }
            }
            _ => {
                return Err(MatchError::Misaligned {
                    position,
                    template: expected.clone(),
                    path: actual.clone(),
                })
            }
        }
    }

    Ok(Some(Match {
        params,
        path: String::new(),
        tail: render(&path[template.len()..]),
    }))
}

/// First binding wins: a later capture under the same name must agree.
fn bind(params: &mut Params, name: &str, value: &str) -> bool {
    match params.get(name) {
        Some(existing) => existing == value,
        None => {
            params.insert(name.to_owned(), value.to_owned());
            true
        }
    }
}
