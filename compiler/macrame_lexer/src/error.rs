//! Tokenizer errors.

use crate::Span;

/// A tokenizer failure at a location in the source.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct TokenizeError {
    pub span: Span,
    pub kind: TokenizeErrorKind,
}

impl TokenizeError {
    pub const fn new(span: Span, kind: TokenizeErrorKind) -> Self {
        TokenizeError { span, kind }
    }

    /// Byte offset where the offending token starts.
    #[inline]
    pub const fn position(&self) -> u32 {
        self.span.start
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum TokenizeErrorKind {
    #[error("invalid symbol `{0}`")]
    InvalidSymbol(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("string literal ends inside an escape")]
    DanglingEscape,
    #[error("number literal `{0}` is out of range")]
    MalformedNumber(String),
    #[error("source of {0} bytes exceeds the u32 offset limit")]
    SourceTooLarge(usize),
}
