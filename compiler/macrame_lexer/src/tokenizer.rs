//! Tokenizer.
//!
//! Dispatches on the class of the first character of each token:
//! whitespace, letter, quote, ASCII digit, or punctuation symbol. Each
//! class has a focused scanning method, and every token records the
//! byte span it was read from.

use crate::cursor::Cursor;
use crate::{
    resolve_escapes, NumberValue, Span, StringMode, Token, TokenKind, TokenizeError,
    TokenizeErrorKind, TokenizerConfig,
};

/// Characters accepted as single-character symbol tokens.
pub const SYMBOLS: &[char] = &[
    '!', '~', '&', '^', '$', '%', '#', '@', '=', '+', '-', '*', '/', '\\', '|', '_', ';', ':',
    '?', ',', '.', '[', '{', '(', '<', ']', '}', ')', '>',
];

#[inline]
pub fn is_symbol(c: char) -> bool {
    SYMBOLS.contains(&c)
}

/// Converts a byte offset into a span offset.
///
/// [`Tokenizer::tokenize`] rejects sources longer than `u32::MAX` up
/// front, so every offset fits.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    reason = "source length checked against u32::MAX before scanning"
)]
const fn offset(pos: usize) -> u32 {
    pos as u32
}

/// Splits text into [`Token`]s according to a [`TokenizerConfig`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub const fn new(config: TokenizerConfig) -> Self {
        Tokenizer { config }
    }

    #[inline]
    pub const fn config(&self) -> TokenizerConfig {
        self.config
    }

    /// Tokenize the whole of `source`.
    ///
    /// Whitespace tokens are dropped unless `include_whitespaces` is set.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, TokenizeError> {
        if u32::try_from(source.len()).is_err() {
            return Err(TokenizeError::new(
                Span::DUMMY,
                TokenizeErrorKind::SourceTooLarge(source.len()),
            ));
        }

        let mut scanner = Scanner {
            cursor: Cursor::new(source),
            config: self.config,
        };
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next_token()? {
            if token.kind.is_whitespace() && !self.config.include_whitespaces {
                continue;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

struct Scanner<'a> {
    cursor: Cursor<'a>,
    config: TokenizerConfig,
}

impl Scanner<'_> {
    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        let start = self.cursor.pos();
        let Some(first) = self.cursor.current() else {
            return Ok(None);
        };

        let kind = match first {
            c if c.is_whitespace() => self.whitespace(start),
            c if c.is_alphabetic() => self.label(start),
            '"' => self.string(start, StringMode::Strong)?,
            '\'' => self.string(start, StringMode::Weak)?,
            c if c.is_ascii_digit() => self.number(start)?,
            c => self.symbol(start, c)?,
        };
        Ok(Some(Token::new(kind, self.span_from(start))))
    }

    #[inline]
    fn span_from(&self, start: usize) -> Span {
        Span::new(offset(start), offset(self.cursor.pos()))
    }

    fn error(&self, start: usize, kind: TokenizeErrorKind) -> TokenizeError {
        TokenizeError::new(self.span_from(start), kind)
    }

    fn whitespace(&mut self, start: usize) -> TokenKind {
        self.cursor.eat_while(char::is_whitespace);
        TokenKind::Whitespace(self.cursor.slice_from(start).to_owned())
    }

    fn label(&mut self, start: usize) -> TokenKind {
        self.cursor.bump();
        if self.config.labels_have_digits {
            self.cursor.eat_while(char::is_alphanumeric);
        } else {
            self.cursor.eat_while(char::is_alphabetic);
        }
        TokenKind::Label(self.cursor.slice_from(start).to_owned())
    }

    /// Scan a quoted string. `\X` never closes the string, whatever `X` is.
    fn string(&mut self, start: usize, mode: StringMode) -> Result<TokenKind, TokenizeError> {
        let quote = mode.quote();
        self.cursor.bump();
        let content_start = self.cursor.pos();
        let content_end = loop {
            let before = self.cursor.pos();
            match self.cursor.bump() {
                None => return Err(self.error(start, TokenizeErrorKind::UnterminatedString)),
                Some('\\') => {
                    if self.cursor.bump().is_none() {
                        return Err(self.error(start, TokenizeErrorKind::DanglingEscape));
                    }
                }
                Some(c) if c == quote => break before,
                Some(_) => {}
            }
        };

        let raw = &self.cursor.slice_from(content_start)[..content_end - content_start];
        let content = if self.config.resolve_escaped_string_characters {
            resolve_escapes(raw).into_owned()
        } else {
            raw.to_owned()
        };
        Ok(TokenKind::String(content, mode))
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, TokenizeError> {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        let is_decimal = self.config.capture_decimal_numbers
            && self.cursor.current() == Some('.')
            && self.cursor.peek().is_some_and(|c| c.is_ascii_digit());
        if is_decimal {
            self.cursor.bump();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        let text = self.cursor.slice_from(start);
        let malformed = || self.error(start, TokenizeErrorKind::MalformedNumber(text.to_owned()));
        let value = if is_decimal {
            text.parse::<f64>()
                .map(NumberValue::decimal)
                .map_err(|_| malformed())?
        } else {
            text.parse::<i64>()
                .map(NumberValue::Integer)
                .map_err(|_| malformed())?
        };
        Ok(TokenKind::Number(value))
    }

    fn symbol(&mut self, start: usize, c: char) -> Result<TokenKind, TokenizeError> {
        self.cursor.bump();
        if is_symbol(c) {
            Ok(TokenKind::Symbol(c))
        } else {
            Err(self.error(start, TokenizeErrorKind::InvalidSymbol(c)))
        }
    }
}
