//! Tokenizer — turns templates and concrete paths into typed token sequences
//!
//! Both modes split on the `/` separator and emit one [`Token::Separator`]
//! per separator character, so `"/ab/"` becomes `[/, ab, /]`.
//!
//! - [`tokenize_template`] understands `{name}` and `{name=value}` placeholders
//!   and backslash escapes (`\/`, `\{`, `\}`, `\=`, `\\`).
//! - [`tokenize_path`] treats every segment as literal text and decodes it
//!   the way form-encoded paths are decoded (`+` is a space, `%XX` is a byte).

use std::fmt;

/// The separator between path segments.
pub const SEPARATOR: char = '/';

const ESCAPE: char = '\\';

/// One unit of a tokenized template or path.
///
/// Paths only ever produce `Separator` and `Text`. Templates may also produce
/// `Param` and `Const`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// The segment delimiter.
    Separator,
    /// A literal segment value (decoded, for paths).
    Text(String),
    /// A named capture slot: `{name}`.
    Param(String),
    /// A named capture slot that only accepts one literal value: `{name=value}`.
    Const {
        /// Parameter name the value is captured under.
        name: String,
        /// The literal the aligned path segment must equal.
        value: String,
    },
}

impl Token {
    /// Shorthand for [`Token::Text`].
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Shorthand for [`Token::Param`].
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    /// Shorthand for [`Token::Const`].
    pub fn constant(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Const {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns `true` for [`Token::Separator`].
    #[must_use]
    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator)
    }
}

/// Renders the token back into path syntax.
///
/// Text is percent-encoded, so rendering a tokenized path and tokenizing the
/// result again yields the same tokens.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Separator => write!(f, "{SEPARATOR}"),
            Self::Text(value) => f.write_str(&urlencoding::encode(value)),
            Self::Param(name) => write!(f, "{{{name}}}"),
            Self::Const { name, value } => write!(f, "{{{name}={value}}}"),
        }
    }
}

/// Tokenize a route template.
///
/// # Example
///
/// ```
/// use rota::{tokenize_template, Token};
///
/// assert_eq!(
///     tokenize_template("/ab/{qq=def}/{cd}"),
///     vec![
///         Token::Separator,
///         Token::text("ab"),
///         Token::Separator,
///         Token::constant("qq", "def"),
///         Token::Separator,
///         Token::param("cd"),
///     ]
/// );
/// assert!(tokenize_template("").is_empty());
/// ```
#[must_use]
pub fn tokenize_template(template: &str) -> Vec<Token> {
    split(template, true, template_token)
}

/// Tokenize a concrete path.
///
/// # Example
///
/// ```
/// use rota::{tokenize_path, Token};
///
/// assert_eq!(tokenize_path("ab%2Fcd"), vec![Token::text("ab/cd")]);
/// assert_eq!(tokenize_path("ab+cd"), vec![Token::text("ab cd")]);
/// ```
#[must_use]
pub fn tokenize_path(path: &str) -> Vec<Token> {
    split(path, false, |piece| Token::Text(decode_segment(piece)))
}

/// Decode one raw path segment: `+` becomes a space, then `%XX` sequences
/// are percent-decoded.
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced with
/// U+FFFD, so decoding never fails.
#[must_use]
pub fn decode_segment(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Render tokens back into a path string.
#[must_use]
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(ToString::to_string).collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Splitting
// ═══════════════════════════════════════════════════════════════════════════════

fn split(input: &str, escapes: bool, mut piece: impl FnMut(&str) -> Token) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE if escapes => escaped = true,
            SEPARATOR => {
                if i > start {
                    tokens.push(piece(&input[start..i]));
                }
                tokens.push(Token::Separator);
                start = i + SEPARATOR.len_utf8();
            }
            _ => {}
        }
    }

    if start < input.len() {
        tokens.push(piece(&input[start..]));
    }
    tokens
}

fn template_token(piece: &str) -> Token {
    let Some(inner) = placeholder(piece) else {
        return Token::Text(unescape(piece));
    };
    match find_unescaped(inner, '=') {
        Some(eq) => Token::Const {
            name: unescape(&inner[..eq]),
            value: unescape(&inner[eq + 1..]),
        },
        None => Token::Param(unescape(inner)),
    }
}

/// The content between `{` and `}` when the whole piece is a placeholder.
fn placeholder(piece: &str) -> Option<&str> {
    let inner = piece.strip_prefix('{')?.strip_suffix('}')?;
    // `{abc\}` ends in an escaped brace, which makes it literal text
    if ends_escaped(inner) {
        return None;
    }
    Some(inner)
}

fn ends_escaped(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == ESCAPE).count() % 2 == 1
}

fn find_unescaped(text: &str, needle: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == needle {
            return Some(i);
        }
    }
    None
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push(ESCAPE),
            }
        } else {
            out.push(c);
        }
    }
    out
}
