//! Pattern templates and token predicates.
//!
//! A macro alternative is written as a pattern template such as
//! `<label>[%1] <symbol>[(] \expression <symbol>[)]`. [`PatternParser`]
//! turns the template into a [`Pattern`] tree. Each token slot in that
//! tree names a predicate keyword (`label`, `number`, ...) with literal or
//! argument-bound parameters, which [`TokenPredicate::build`] resolves
//! into a concrete test once every argument is known.

mod error;
mod parser;
mod pattern;
mod predicate;

pub use error::{PatternError, PredicateError, SyntaxErrorKind};
pub use parser::PatternParser;
pub use pattern::{Pattern, PatternQuantifier, QuantifierMode, TemplateToken};
pub use predicate::TokenPredicate;
