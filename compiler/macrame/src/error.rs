//! Engine error types.
//!
//! Registration errors are grammar-authoring mistakes and fail fast.
//! Compile errors surface when a graph is built on first use. A parse
//! that simply does not match is not an error at all.

use std::fmt;

use macrame_lexer::TokenizeError;
use macrame_pattern::{PatternError, PredicateError};

use crate::{HandlerError, MacroSignature};

/// Which argument list an index refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArgumentKind {
    /// `%N` inside a bracketed template token.
    Token,
    /// `$N` in pattern position.
    Matcher,
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKind::Token => f.write_str("token"),
            ArgumentKind::Matcher => f.write_str("matcher"),
        }
    }
}

/// A referenced macro that was never registered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MissingMacro {
    pub signature: MacroSignature,
    /// Macros whose patterns call the missing one.
    pub requested_by: Vec<MacroSignature>,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("macro {0} is already registered")]
    Duplicate(MacroSignature),
    #[error("macro {0} has no alternatives")]
    NoAlternatives(MacroSignature),
    #[error("alternative {alternative} of {signature}: {source}")]
    Pattern {
        signature: MacroSignature,
        alternative: usize,
        source: PatternError,
    },
    #[error("alternative {alternative} of {signature}: {source}")]
    Predicate {
        signature: MacroSignature,
        alternative: usize,
        source: PredicateError,
    },
    #[error(
        "alternative {alternative} of {signature} uses {kind} argument {index}, \
         but only {declared} are declared"
    )]
    ArgumentOutOfRange {
        signature: MacroSignature,
        alternative: usize,
        kind: ArgumentKind,
        index: usize,
        declared: usize,
    },
    #[error("{}", render_missing(.0))]
    Incomplete(Vec<MissingMacro>),
}

fn render_missing(missing: &[MissingMacro]) -> String {
    let mut rendered = String::from("unregistered macros are referenced:");
    for entry in missing {
        let requesters: Vec<String> = entry.requested_by.iter().map(ToString::to_string).collect();
        rendered.push_str(&format!(
            "\n  {} (requested by {})",
            entry.signature,
            requesters.join(", ")
        ));
    }
    rendered
}

/// A matcher graph could not be built.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("no macro is registered as {0}")]
    UnknownMacro(MacroSignature),
    #[error(transparent)]
    Predicate(#[from] PredicateError),
    #[error("{kind} argument {index} is not bound")]
    MissingArgument { kind: ArgumentKind, index: usize },
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("handler failed: {0}")]
    Handler(#[from] HandlerError),
}
