//! Token predicates and the keyword dispatch table.
//!
//! A token slot such as `<number>[1][]` names a keyword and passes it
//! bracketed arguments. Each keyword owns an ordered list of overloads.
//! An overload pairs an argument shape (one predicate per argument) with a
//! constructor, and the first overload whose shape accepts the arguments
//! builds the predicate.
//!
//! | keyword      | arguments                        | matches                     |
//! |--------------|----------------------------------|-----------------------------|
//! | `any`        | none                             | a whitespace token          |
//! | `whitespace` | none                             | a whitespace token          |
//! | `label`      | none, `[label]`                  | any / that label            |
//! | `string`     | none, `[strong]`, `[weak]`       | any / strings of that mode  |
//! | `number`     | none, `[n]`, `[integer]`, `[decimal]` | any / exact / by mode  |
//! | `number`     | `[lo][hi]` with either side `[]` | integers or decimals in range |
//! | `symbol`     | none, `[s]`, `[s][t]...`         | any / exact / one of a set  |
//!
//! `any` matching whitespace mirrors the keyword's established meaning in
//! existing grammars; [`TokenPredicate::Any`] is the programmatic
//! "every token" test.

use std::collections::BTreeSet;
use std::fmt;

use macrame_lexer::{NumberMode, NumberValue, StringMode, TokenKind};

use crate::PredicateError;

/// A test applied to one token, or to the absence of one.
///
/// Equality and hashing follow the constructing arguments, so two slots
/// written the same way build equal predicates.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenPredicate {
    /// Any present token.
    Any,
    /// Only an absent argument.
    Absent,
    Exact(TokenKind),
    Whitespace,
    Label,
    String,
    StringMode(StringMode),
    Number,
    NumberMode(NumberMode),
    /// Integers in `lo..=hi`. Decimals never match.
    IntegerRange { lo: i64, hi: i64 },
    /// Any number whose `f64` value is in `lo..=hi`, stored as IEEE bits.
    DecimalRange { lo: u64, hi: u64 },
    Symbol,
    SymbolSet(BTreeSet<char>),
}

impl TokenPredicate {
    pub fn exact(kind: TokenKind) -> Self {
        TokenPredicate::Exact(kind)
    }

    pub fn decimal_range(lo: f64, hi: f64) -> Self {
        TokenPredicate::DecimalRange {
            lo: lo.to_bits(),
            hi: hi.to_bits(),
        }
    }

    pub fn symbol_set(symbols: impl IntoIterator<Item = char>) -> Self {
        TokenPredicate::SymbolSet(symbols.into_iter().collect())
    }

    /// Test a token; `None` stands for an absent argument.
    pub fn matches(&self, token: Option<&TokenKind>) -> bool {
        let Some(kind) = token else {
            return matches!(self, TokenPredicate::Absent);
        };
        match self {
            TokenPredicate::Any => true,
            TokenPredicate::Absent => false,
            TokenPredicate::Exact(expected) => kind == expected,
            TokenPredicate::Whitespace => matches!(kind, TokenKind::Whitespace(_)),
            TokenPredicate::Label => matches!(kind, TokenKind::Label(_)),
            TokenPredicate::String => matches!(kind, TokenKind::String(..)),
            TokenPredicate::StringMode(mode) => {
                matches!(kind, TokenKind::String(_, actual) if actual == mode)
            }
            TokenPredicate::Number => matches!(kind, TokenKind::Number(_)),
            TokenPredicate::NumberMode(mode) => kind.as_number().is_some_and(|n| n.mode() == *mode),
            TokenPredicate::IntegerRange { lo, hi } => kind
                .as_number()
                .and_then(NumberValue::as_integer)
                .is_some_and(|n| (*lo..=*hi).contains(&n)),
            TokenPredicate::DecimalRange { lo, hi } => kind.as_number().is_some_and(|n| {
                let value = n.as_f64();
                f64::from_bits(*lo) <= value && value <= f64::from_bits(*hi)
            }),
            TokenPredicate::Symbol => matches!(kind, TokenKind::Symbol(_)),
            TokenPredicate::SymbolSet(set) => kind.as_symbol().is_some_and(|c| set.contains(&c)),
        }
    }

    /// Build the predicate a keyword and its concrete arguments denote.
    ///
    /// The keyword is looked up case-insensitively.
    pub fn build(keyword: &str, arguments: &[Option<TokenKind>]) -> Result<Self, PredicateError> {
        let lowered = keyword.to_ascii_lowercase();
        let overloads =
            overloads(&lowered).ok_or_else(|| PredicateError::UnknownKeyword(keyword.to_owned()))?;
        overloads
            .iter()
            .filter(|overload| overload.shape.accepts(arguments))
            .find_map(|overload| (overload.build)(arguments))
            .ok_or_else(|| PredicateError::NoMatchingOverload {
                keyword: lowered,
                arguments: arguments.to_vec(),
            })
    }
}

impl fmt::Display for TokenPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenPredicate::Any => write!(f, "<any token>"),
            TokenPredicate::Absent => write!(f, "[]"),
            TokenPredicate::Exact(kind) => write!(f, "<{}>[{kind}]", kind.kind_name()),
            TokenPredicate::Whitespace => write!(f, "<whitespace>"),
            TokenPredicate::Label => write!(f, "<label>"),
            TokenPredicate::String => write!(f, "<string>"),
            TokenPredicate::StringMode(StringMode::Strong) => write!(f, "<string>[strong]"),
            TokenPredicate::StringMode(StringMode::Weak) => write!(f, "<string>[weak]"),
            TokenPredicate::Number => write!(f, "<number>"),
            TokenPredicate::NumberMode(NumberMode::Integer) => write!(f, "<number>[integer]"),
            TokenPredicate::NumberMode(NumberMode::Decimal) => write!(f, "<number>[decimal]"),
            TokenPredicate::IntegerRange { lo, hi } => write!(f, "<number>[{lo}][{hi}]"),
            TokenPredicate::DecimalRange { lo, hi } => write!(
                f,
                "<number>[{:?}][{:?}]",
                f64::from_bits(*lo),
                f64::from_bits(*hi)
            ),
            TokenPredicate::Symbol => write!(f, "<symbol>"),
            TokenPredicate::SymbolSet(set) => {
                write!(f, "<symbol>")?;
                set.iter().try_for_each(|c| write!(f, "[{c}]"))
            }
        }
    }
}

// === Dispatch table ===

/// Argument shape of one overload.
enum Shape {
    /// One argument per listed predicate, in order.
    Exactly(&'static [TokenPredicate]),
    /// At least `.1` arguments, all accepted by `.0`.
    AtLeast(TokenPredicate, usize),
}

impl Shape {
    fn accepts(&self, arguments: &[Option<TokenKind>]) -> bool {
        match self {
            Shape::Exactly(params) => {
                params.len() == arguments.len()
                    && params
                        .iter()
                        .zip(arguments)
                        .all(|(param, argument)| param.matches(argument.as_ref()))
            }
            Shape::AtLeast(param, count) => {
                arguments.len() >= *count
                    && arguments
                        .iter()
                        .all(|argument| param.matches(argument.as_ref()))
            }
        }
    }
}

/// Constructors return `None` when an accepted argument still has no
/// meaning for the keyword, such as `<string>[loud]`.
type Build = fn(&[Option<TokenKind>]) -> Option<TokenPredicate>;

struct Overload {
    shape: Shape,
    build: Build,
}

const NONE: &[TokenPredicate] = &[];
const ONE_LABEL: &[TokenPredicate] = &[TokenPredicate::Label];
const ONE_NUMBER: &[TokenPredicate] = &[TokenPredicate::Number];
const ONE_SYMBOL: &[TokenPredicate] = &[TokenPredicate::Symbol];
const INT_INT: &[TokenPredicate] = &[
    TokenPredicate::NumberMode(NumberMode::Integer),
    TokenPredicate::NumberMode(NumberMode::Integer),
];
const INT_OPEN: &[TokenPredicate] = &[
    TokenPredicate::NumberMode(NumberMode::Integer),
    TokenPredicate::Absent,
];
const OPEN_INT: &[TokenPredicate] = &[
    TokenPredicate::Absent,
    TokenPredicate::NumberMode(NumberMode::Integer),
];
const DEC_DEC: &[TokenPredicate] = &[
    TokenPredicate::NumberMode(NumberMode::Decimal),
    TokenPredicate::NumberMode(NumberMode::Decimal),
];
const DEC_OPEN: &[TokenPredicate] = &[
    TokenPredicate::NumberMode(NumberMode::Decimal),
    TokenPredicate::Absent,
];
const OPEN_DEC: &[TokenPredicate] = &[
    TokenPredicate::Absent,
    TokenPredicate::NumberMode(NumberMode::Decimal),
];

static WHITESPACE: &[Overload] = &[Overload {
    shape: Shape::Exactly(NONE),
    build: |_| Some(TokenPredicate::Whitespace),
}];

static LABEL: &[Overload] = &[
    Overload {
        shape: Shape::Exactly(NONE),
        build: |_| Some(TokenPredicate::Label),
    },
    Overload {
        shape: Shape::Exactly(ONE_LABEL),
        build: exact_argument,
    },
];

static STRING: &[Overload] = &[
    Overload {
        shape: Shape::Exactly(NONE),
        build: |_| Some(TokenPredicate::String),
    },
    Overload {
        shape: Shape::Exactly(ONE_LABEL),
        build: |args| match args {
            [Some(TokenKind::Label(name))] => {
                StringMode::from_name(name).map(TokenPredicate::StringMode)
            }
            _ => None,
        },
    },
];

static NUMBER: &[Overload] = &[
    Overload {
        shape: Shape::Exactly(NONE),
        build: |_| Some(TokenPredicate::Number),
    },
    Overload {
        shape: Shape::Exactly(ONE_NUMBER),
        build: exact_argument,
    },
    Overload {
        shape: Shape::Exactly(ONE_LABEL),
        build: |args| match args {
            [Some(TokenKind::Label(name))] => {
                NumberMode::from_name(name).map(TokenPredicate::NumberMode)
            }
            _ => None,
        },
    },
    Overload {
        shape: Shape::Exactly(INT_INT),
        build: integer_range,
    },
    Overload {
        shape: Shape::Exactly(INT_OPEN),
        build: integer_range,
    },
    Overload {
        shape: Shape::Exactly(OPEN_INT),
        build: integer_range,
    },
    Overload {
        shape: Shape::Exactly(DEC_DEC),
        build: decimal_range,
    },
    Overload {
        shape: Shape::Exactly(DEC_OPEN),
        build: decimal_range,
    },
    Overload {
        shape: Shape::Exactly(OPEN_DEC),
        build: decimal_range,
    },
];

static SYMBOL: &[Overload] = &[
    Overload {
        shape: Shape::Exactly(NONE),
        build: |_| Some(TokenPredicate::Symbol),
    },
    Overload {
        shape: Shape::Exactly(ONE_SYMBOL),
        build: exact_argument,
    },
    Overload {
        shape: Shape::AtLeast(TokenPredicate::Symbol, 2),
        build: |args| {
            Some(TokenPredicate::symbol_set(
                args.iter().filter_map(|arg| arg.as_ref()?.as_symbol()),
            ))
        },
    },
];

fn overloads(keyword: &str) -> Option<&'static [Overload]> {
    match keyword {
        "any" | "whitespace" => Some(WHITESPACE),
        "label" => Some(LABEL),
        "string" => Some(STRING),
        "number" => Some(NUMBER),
        "symbol" => Some(SYMBOL),
        _ => None,
    }
}

fn exact_argument(args: &[Option<TokenKind>]) -> Option<TokenPredicate> {
    match args {
        [Some(kind)] => Some(TokenPredicate::exact(kind.clone())),
        _ => None,
    }
}

/// Open bounds default to `0` and `i64::MAX`.
fn integer_range(args: &[Option<TokenKind>]) -> Option<TokenPredicate> {
    let bound = |arg: &Option<TokenKind>, open: i64| match arg {
        Some(kind) => kind.as_number().and_then(NumberValue::as_integer),
        None => Some(open),
    };
    match args {
        [lo, hi] => Some(TokenPredicate::IntegerRange {
            lo: bound(lo, 0)?,
            hi: bound(hi, i64::MAX)?,
        }),
        _ => None,
    }
}

/// Open bounds default to `0.0` and `f64::MAX`.
fn decimal_range(args: &[Option<TokenKind>]) -> Option<TokenPredicate> {
    let bound = |arg: &Option<TokenKind>, open: f64| match arg {
        Some(kind) => kind.as_number().map(NumberValue::as_f64),
        None => Some(open),
    };
    match args {
        [lo, hi] => Some(TokenPredicate::decimal_range(
            bound(lo, 0.0)?,
            bound(hi, f64::MAX)?,
        )),
        _ => None,
    }
}
