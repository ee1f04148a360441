//! Errors raised while compiling templates and building predicates.

use std::fmt::Write as _;

use macrame_lexer::{TokenKind, TokenizeError};

/// A pattern template could not be compiled.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern template does not tokenize: {0}")]
    Lex(#[from] TokenizeError),
    /// `position` is the index of the offending token, whitespace excluded.
    #[error("{kind} (token {position})")]
    Syntax {
        position: usize,
        kind: SyntaxErrorKind,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
    },
    #[error("unexpected {0}")]
    UnexpectedToken(String),
    #[error("argument index {0} is not a positive integer")]
    InvalidArgumentIndex(String),
    #[error("repetition bound {0} is not a non-negative integer")]
    InvalidBound(String),
    #[error("repetition minimum {min} exceeds maximum {max}")]
    MinExceedsMax { min: usize, max: usize },
    #[error("missing comma between repetition bounds")]
    MissingComma,
    #[error("unable to parse past this point")]
    TrailingInput,
}

/// No predicate could be built from a keyword and its arguments.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum PredicateError {
    #[error("unknown token keyword `{0}`")]
    UnknownKeyword(String),
    #[error("`{keyword}` does not accept arguments {}", render_arguments(.arguments))]
    NoMatchingOverload {
        keyword: String,
        arguments: Vec<Option<TokenKind>>,
    },
}

fn render_arguments(arguments: &[Option<TokenKind>]) -> String {
    if arguments.is_empty() {
        return "(none)".to_owned();
    }
    let mut rendered = String::new();
    for argument in arguments {
        match argument {
            Some(kind) => {
                let _ = write!(rendered, "[{kind}]");
            }
            None => rendered.push_str("[]"),
        }
    }
    rendered
}
