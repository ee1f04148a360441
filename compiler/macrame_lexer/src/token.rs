//! Token kinds produced by the tokenizer.
//!
//! Every kind implements `Eq + Hash` so tokens can appear in predicate
//! arguments and in matcher cache keys. Decimal numbers are stored as
//! their IEEE-754 bits to make that possible.

use std::fmt;

use crate::Span;

/// Quote style of a string token.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StringMode {
    /// `"double quoted"`
    Strong,
    /// `'single quoted'`
    Weak,
}

impl StringMode {
    pub const fn quote(self) -> char {
        match self {
            StringMode::Strong => '"',
            StringMode::Weak => '\'',
        }
    }

    /// Mode named by a predicate argument such as `strong` or `WEAK`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("strong") {
            Some(StringMode::Strong)
        } else if name.eq_ignore_ascii_case("weak") {
            Some(StringMode::Weak)
        } else {
            None
        }
    }
}

/// Whether a number was lexed as an integer or a decimal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberMode {
    Integer,
    Decimal,
}

impl NumberMode {
    /// Mode named by a predicate argument such as `integer` or `Decimal`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("integer") {
            Some(NumberMode::Integer)
        } else if name.eq_ignore_ascii_case("decimal") {
            Some(NumberMode::Decimal)
        } else {
            None
        }
    }
}

/// Numeric payload of a number token.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberValue {
    Integer(i64),
    /// IEEE-754 bits of an `f64`.
    Decimal(u64),
}

impl NumberValue {
    #[inline]
    pub fn decimal(value: f64) -> Self {
        NumberValue::Decimal(value.to_bits())
    }

    #[inline]
    pub const fn mode(self) -> NumberMode {
        match self {
            NumberValue::Integer(_) => NumberMode::Integer,
            NumberValue::Decimal(_) => NumberMode::Decimal,
        }
    }

    #[inline]
    pub const fn as_integer(self) -> Option<i64> {
        match self {
            NumberValue::Integer(value) => Some(value),
            NumberValue::Decimal(_) => None,
        }
    }

    /// The value widened to `f64`. Integers beyond 2^53 lose precision.
    #[inline]
    #[allow(
        clippy::cast_precision_loss,
        reason = "decimal ranges compare in f64 by definition"
    )]
    pub fn as_f64(self) -> f64 {
        match self {
            NumberValue::Integer(value) => value as f64,
            NumberValue::Decimal(bits) => f64::from_bits(bits),
        }
    }
}

impl fmt::Debug for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberValue::Integer(value) => write!(f, "Integer({value})"),
            NumberValue::Decimal(bits) => write!(f, "Decimal({:?})", f64::from_bits(*bits)),
        }
    }
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberValue::Integer(value) => write!(f, "{value}"),
            NumberValue::Decimal(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
        }
    }
}

/// Classified token payload.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    Whitespace(String),
    Label(String),
    /// String content (escapes resolved or raw, per tokenizer config) and quote style.
    String(String, StringMode),
    Number(NumberValue),
    Symbol(char),
}

impl TokenKind {
    pub fn label(text: impl Into<String>) -> Self {
        TokenKind::Label(text.into())
    }

    pub fn string(text: impl Into<String>, mode: StringMode) -> Self {
        TokenKind::String(text.into(), mode)
    }

    pub const fn integer(value: i64) -> Self {
        TokenKind::Number(NumberValue::Integer(value))
    }

    pub fn decimal(value: f64) -> Self {
        TokenKind::Number(NumberValue::decimal(value))
    }

    #[inline]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, TokenKind::Whitespace(_))
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            TokenKind::Label(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<(&str, StringMode)> {
        match self {
            TokenKind::String(text, mode) => Some((text, *mode)),
            _ => None,
        }
    }

    pub const fn as_number(&self) -> Option<NumberValue> {
        match self {
            TokenKind::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub const fn as_symbol(&self) -> Option<char> {
        match self {
            TokenKind::Symbol(c) => Some(*c),
            _ => None,
        }
    }

    /// Lowercase name of the kind, matching the predicate keyword for it.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            TokenKind::Whitespace(_) => "whitespace",
            TokenKind::Label(_) => "label",
            TokenKind::String(..) => "string",
            TokenKind::Number(_) => "number",
            TokenKind::Symbol(_) => "symbol",
        }
    }
}

/// Renders the token the way it would be written in source.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Whitespace(text) | TokenKind::Label(text) => f.write_str(text),
            TokenKind::String(text, mode) => {
                let quote = mode.quote();
                write!(f, "{quote}")?;
                for c in text.chars() {
                    if c == quote || c == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "{quote}")
            }
            TokenKind::Number(value) => write!(f, "{value}"),
            TokenKind::Symbol(c) => write!(f, "{c}"),
        }
    }
}

/// A classified token with the span of its source text.
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}
