//! Token model and tokenizer for macrame grammars.
//!
//! Source text is split into five token kinds: whitespace runs, labels,
//! quoted strings, numbers and single punctuation symbols. The same
//! tokenizer feeds both the pattern-template compiler and the input side
//! of a parse, each with its own [`TokenizerConfig`].
//!
//! ```text
//! let tokens = Tokenizer::default().tokenize("x = 4.5")?;
//! // Label("x"), Whitespace(" "), Symbol('='), Whitespace(" "), Number(Decimal(4.5))
//! ```

mod config;
mod cursor;
mod error;
mod escape;
mod span;
mod token;
mod tokenizer;

pub use config::TokenizerConfig;
pub use error::{TokenizeError, TokenizeErrorKind};
pub use escape::resolve_escapes;
pub use span::Span;
pub use token::{NumberMode, NumberValue, StringMode, Token, TokenKind};
pub use tokenizer::{is_symbol, Tokenizer, SYMBOLS};
