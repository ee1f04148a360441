//! A backtracking macro pattern-matching engine.
//!
//! A grammar is a set of named macros. Each macro has ordered pattern
//! alternatives written in a small template language, and a handler per
//! alternative that turns the raw match into a value:
//!
//! ```text
//! let mut registry = MacroRegistry::<f64, ()>::default();
//! registry.register_macro("sum", 0, 0, [
//!     Alternative::new(r"<number> <symbol>[+] \sum", add),
//!     Alternative::new("<number>", number),
//! ])?;
//! let parser = registry.check_completion()?;
//! let value = parser.parse("1+2+3", "sum", &())?;
//! ```
//!
//! Registration parses and checks each template. [`MacroRegistry::check_completion`]
//! verifies that every called macro exists and yields a [`Parser`].
//! Matcher graphs are compiled on first use and cached per macro and
//! argument list; calls between macros are resolved lazily, so recursive
//! grammars need no special treatment.
//!
//! Matching explores alternatives depth-first. A parse succeeds with the
//! first match, in backtracking order, that consumes the whole input.

mod compile;
mod error;
mod handler;
mod instance;
mod matcher;
mod parser;
mod registry;
mod result;
mod signature;

use std::sync::Once;

pub use error::{ArgumentKind, CompileError, MissingMacro, ParseError, RegistrationError};
pub use handler::{Alternative, Handler};
pub use macrame_lexer::{
    NumberMode, NumberValue, Span, StringMode, Token, TokenKind, TokenizeError, TokenizeErrorKind,
    TokenizerConfig,
};
pub use macrame_pattern::{
    PatternError, PatternQuantifier, PredicateError, QuantifierMode, TokenPredicate,
};
pub use matcher::{HandlerRef, LazyCall, Matcher};
pub use parser::Parser;
pub use registry::MacroRegistry;
pub use result::{Children, HandlerError, MatchResult};
pub use signature::MacroSignature;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only the first call has any
/// effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // Leave an already installed global subscriber in place.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
