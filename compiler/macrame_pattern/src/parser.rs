//! Recursive-descent compiler from template text to [`Pattern`].
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! alternation := sequence ('|' sequence)*
//! sequence    := quantified*
//! quantified  := element quantifier? mode?
//! element     := '<' label args '>' args
//!              | '\' label args ('{' alternation '}')*
//!              | '$' integer
//!              | '(' alternation ')'
//! args        := ('[' template-token? ']')*
//! quantifier  := '?' | '*' | '+' | '#' '{' integer? (',' integer?)? '}'
//! mode        := '?' (reluctant) | '+' (possessive)
//! ```
//!
//! Templates are tokenized without whitespace before parsing, so layout
//! is free.

use macrame_lexer::{Token, TokenKind, Tokenizer, TokenizerConfig};
use macrame_stack::ensure_sufficient_stack;

use crate::{
    Pattern, PatternError, PatternQuantifier, QuantifierMode, SyntaxErrorKind, TemplateToken,
};

/// Compiles pattern template strings.
#[derive(Copy, Clone, Debug)]
pub struct PatternParser {
    tokenizer: Tokenizer,
}

impl Default for PatternParser {
    fn default() -> Self {
        PatternParser::new()
    }
}

impl PatternParser {
    pub const fn new() -> Self {
        PatternParser {
            tokenizer: Tokenizer::new(TokenizerConfig {
                include_whitespaces: false,
                capture_decimal_numbers: true,
                resolve_escaped_string_characters: true,
                labels_have_digits: true,
            }),
        }
    }

    pub fn parse(&self, template: &str) -> Result<Pattern, PatternError> {
        let tokens = self.tokenizer.tokenize(template)?;
        let mut cursor = Cursor { tokens: &tokens, pos: 0 };
        let pattern = cursor.alternation()?;
        if cursor.pos < tokens.len() {
            return Err(cursor.error(SyntaxErrorKind::TrailingInput));
        }
        Ok(pattern)
    }
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    #[inline]
    fn current(&self) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    #[inline]
    fn current_symbol(&self) -> Option<char> {
        self.current().and_then(TokenKind::as_symbol)
    }

    #[inline]
    #[allow(dead_code)]
    fn advance(&mut self) -> Option<&'t TokenKind> {
        let kind = self.current()?;
        self.pos += 1;
        Some(kind)
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.current_symbol() == Some(symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, kind: SyntaxErrorKind) -> PatternError {
        PatternError::Syntax {
            position: self.pos,
            kind,
        }
    }

    fn found(&self) -> String {
        match self.current() {
            Some(kind) => format!("`{kind}`"),
            None => "end of pattern".to_owned(),
        }
    }

    fn expected(&self, expected: &'static str) -> PatternError {
        self.error(SyntaxErrorKind::Expected {
            expected,
            found: self.found(),
        })
    }

    fn expect_symbol(&mut self, symbol: char, expected: &'static str) -> Result<(), PatternError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.expected(expected))
        }
    }

    fn expect_label(&mut self, expected: &'static str) -> Result<&'t str, PatternError> {
        match self.current() {
            Some(TokenKind::Label(name)) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.expected(expected)),
        }
    }

    /// Positive 1-based index following `$` or `%`.
    fn argument_index(&mut self) -> Result<usize, PatternError> {
        match self.current() {
            Some(TokenKind::Number(value)) => {
                let index = value
                    .as_integer()
                    .and_then(|n| usize::try_from(n).ok())
                    .filter(|&n| n >= 1)
                    .ok_or_else(|| {
                        self.error(SyntaxErrorKind::InvalidArgumentIndex(value.to_string()))
                    })?;
                self.pos += 1;
                Ok(index)
            }
            _ => Err(self.expected("an argument index")),
        }
    }

    // === Structure ===

    /// Parse branches until `)`, `}` or the end of input, which are left
    /// for the caller.
    fn alternation(&mut self) -> Result<Pattern, PatternError> {
        let mut branches = Vec::new();
        let mut current = Vec::new();
        while self.current().is_some() {
            match self.current_symbol() {
                Some(')' | '}') => break,
                Some('|') => {
                    self.pos += 1;
                    branches.push(into_sequence(std::mem::take(&mut current)));
                }
                _ => {
                    if let Some(element) = self.quantified()? {
                        current.push(element);
                    }
                }
            }
        }
        branches.push(into_sequence(current));

        if branches.len() == 1 {
            Ok(branches.pop().unwrap_or(Pattern::Empty))
        } else {
            Ok(Pattern::Branch(branches))
        }
    }

    /// `None` when the quantifier allows zero occurrences at most.
    fn quantified(&mut self) -> Result<Option<Pattern>, PatternError> {
        let element = ensure_sufficient_stack(|| self.element())?;
        let Some(quantifier) = self.quantifier()? else {
            return Ok(Some(element));
        };
        if quantifier.is_empty() {
            Ok(None)
        } else if quantifier.is_single() {
            Ok(Some(element))
        } else {
            Ok(Some(Pattern::Quantified(Box::new(element), quantifier)))
        }
    }

    fn element(&mut self) -> Result<Pattern, PatternError> {
        match self.current_symbol() {
            Some('<') => self.token_slot(),
            Some('\\') => self.call(),
            Some('$') => {
                self.pos += 1;
                Ok(Pattern::Argument(self.argument_index()?))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.alternation()?;
                self.expect_symbol(')', "`)`")?;
                Ok(inner)
            }
            _ => Err(self.error(SyntaxErrorKind::UnexpectedToken(self.found()))),
        }
    }

    // === Slots and calls ===

    /// `<keyword[arg]...>[arg]...`
    fn token_slot(&mut self) -> Result<Pattern, PatternError> {
        self.pos += 1;
        let keyword = self.expect_label("a token keyword")?;
        let mut arguments = self.template_arguments()?;
        self.expect_symbol('>', "`>`")?;
        arguments.extend(self.template_arguments()?);
        Ok(Pattern::token(keyword, arguments))
    }

    /// `\name[arg]...{pattern}...`
    fn call(&mut self) -> Result<Pattern, PatternError> {
        self.pos += 1;
        let name = self.expect_label("a macro name")?;
        let token_arguments = self.template_arguments()?;
        let mut pattern_arguments = Vec::new();
        while self.eat_symbol('{') {
            pattern_arguments.push(self.alternation()?);
            self.expect_symbol('}', "`}`")?;
        }
        Ok(Pattern::call(name, token_arguments, pattern_arguments))
    }

    fn template_arguments(&mut self) -> Result<Vec<TemplateToken>, PatternError> {
        let mut arguments = Vec::new();
        while self.eat_symbol('[') {
            arguments.push(self.template_token()?);
            self.expect_symbol(']', "`]`")?;
        }
        Ok(arguments)
    }

    /// Contents of one `[...]`, leaving the closing bracket.
    fn template_token(&mut self) -> Result<TemplateToken, PatternError> {
        match self.current() {
            Some(TokenKind::Symbol(']')) => Ok(TemplateToken::Literal(None)),
            Some(TokenKind::Symbol('\\')) => {
                self.pos += 1;
                match self.current() {
                    Some(escaped @ TokenKind::Symbol(_)) => {
                        self.pos += 1;
                        Ok(TemplateToken::Literal(Some(escaped.clone())))
                    }
                    _ => Err(self.expected("an escaped symbol")),
                }
            }
            Some(TokenKind::Symbol('%')) => {
                self.pos += 1;
                Ok(TemplateToken::Argument(self.argument_index()?))
            }
            Some(kind) => {
                self.pos += 1;
                Ok(TemplateToken::Literal(Some(kind.clone())))
            }
            None => Err(self.expected("`]`")),
        }
    }

    // === Quantifiers ===

    fn quantifier(&mut self) -> Result<Option<PatternQuantifier>, PatternError> {
        let bounds = match self.current_symbol() {
            Some('?') => (0, 1),
            Some('*') => (0, PatternQuantifier::UNBOUNDED),
            Some('+') => (1, PatternQuantifier::UNBOUNDED),
            Some('#') => {
                self.pos += 1;
                self.expect_symbol('{', "`{` after `#`")?;
                let bounds = self.bounds()?;
                self.expect_symbol('}', "`}`")?;
                return self.mode(bounds).map(Some);
            }
            _ => return Ok(None),
        };
        self.pos += 1;
        self.mode(bounds).map(Some)
    }

    /// Optional mode suffix after a quantifier.
    fn mode(&mut self, (min, max): (usize, usize)) -> Result<PatternQuantifier, PatternError> {
        let mode = if self.eat_symbol('?') {
            QuantifierMode::Reluctant
        } else if self.eat_symbol('+') {
            QuantifierMode::Possessive
        } else {
            QuantifierMode::Greedy
        };
        PatternQuantifier::new(min, max, mode)
            .ok_or_else(|| self.error(SyntaxErrorKind::MinExceedsMax { min, max }))
    }

    /// Inside `#{...}`: `a,b`, `a,`, `,b`, `a`, `,` or nothing.
    fn bounds(&mut self) -> Result<(usize, usize), PatternError> {
        if self.current_symbol() == Some('}') {
            return Ok((0, 0));
        }
        let min = self.bound()?;
        if self.current_symbol() == Some('}') {
            return Ok(match min {
                Some(n) => (n, n),
                None => (0, PatternQuantifier::UNBOUNDED),
            });
        }
        if !self.eat_symbol(',') {
            return Err(self.error(SyntaxErrorKind::MissingComma));
        }
        let max = self.bound()?;
        Ok((min.unwrap_or(0), max.unwrap_or(PatternQuantifier::UNBOUNDED)))
    }

    fn bound(&mut self) -> Result<Option<usize>, PatternError> {
        match self.current() {
            Some(TokenKind::Number(value)) => {
                let bound = value
                    .as_integer()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| self.error(SyntaxErrorKind::InvalidBound(value.to_string())))?;
                self.pos += 1;
                Ok(Some(bound))
            }
            _ => Ok(None),
        }
    }
}

fn into_sequence(mut elements: Vec<Pattern>) -> Pattern {
    match elements.len() {
        0 => Pattern::Empty,
        1 => elements.pop().unwrap_or(Pattern::Empty),
        _ => Pattern::Sequence(elements),
    }
}
