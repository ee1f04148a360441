//! The use phase: compiled graphs, handlers and the top-level parse loop.

use std::fmt;
use std::sync::Arc;

use macrame_lexer::{Token, TokenKind, TokenizeError, Tokenizer, TokenizerConfig};
use tracing::debug;

use crate::compile::MatcherCompiler;
use crate::handler::Handler;
use crate::instance::{Instance, Scope};
use crate::matcher::CallKey;
use crate::{CompileError, MacroSignature, MatchResult, Matcher, ParseError};

/// Handlers indexed by macro id, then by alternative.
pub(crate) type HandlerTable<T, C> = Vec<Vec<Handler<T, C>>>;

/// A complete, validated grammar ready to parse input.
///
/// Produced by [`MacroRegistry::check_completion`](crate::MacroRegistry::check_completion).
/// Parsing takes `&self`: compiled graphs are shared through an internal
/// cache, and every parse builds its own instance tree, so one parser can
/// serve many threads at once.
pub struct Parser<T, C> {
    compiler: MatcherCompiler,
    handlers: HandlerTable<T, C>,
    tokenizer: Tokenizer,
}

impl<T, C> Parser<T, C> {
    pub(crate) fn new(
        compiler: MatcherCompiler,
        handlers: HandlerTable<T, C>,
        tokenizer: Tokenizer,
    ) -> Self {
        Parser {
            compiler,
            handlers,
            tokenizer,
        }
    }

    pub fn tokenizer_config(&self) -> TokenizerConfig {
        self.tokenizer.config()
    }

    /// Tokenize `text` the way [`Parser::parse`] does.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError> {
        self.tokenizer.tokenize(text)
    }

    /// The graph of macro `name` applied to concrete arguments.
    ///
    /// Graphs are cached per macro and argument list: asking twice for the
    /// same key returns the same `Arc`.
    pub fn compile(
        &self,
        name: &str,
        token_arguments: &[Option<TokenKind>],
        matcher_arguments: &[Arc<Matcher>],
    ) -> Result<Arc<Matcher>, CompileError> {
        let signature = MacroSignature::new(name, token_arguments.len(), matcher_arguments.len());
        let key = CallKey {
            macro_id: self.compiler.lookup(&signature)?,
            token_arguments: token_arguments.to_vec(),
            matcher_arguments: matcher_arguments.to_vec(),
        };
        self.compiler.compile(&key)
    }

    /// Number of distinct graphs compiled so far.
    pub fn cached_graphs(&self) -> usize {
        self.compiler.cached_graphs()
    }

    /// Match `text` against the argument-less macro `entry`.
    ///
    /// Returns `Ok(None)` when no match consumes the whole input.
    pub fn parse(
        &self,
        text: &str,
        entry: &str,
        context: &C,
    ) -> Result<Option<MatchResult<T>>, ParseError> {
        let tokens = self.tokenize(text)?;
        self.parse_tokens(&tokens, entry, context)
    }

    /// [`Parser::parse`] over an already tokenized input.
    #[tracing::instrument(level = "debug", skip_all, fields(entry = entry, tokens = tokens.len()))]
    pub fn parse_tokens(
        &self,
        tokens: &[Token],
        entry: &str,
        context: &C,
    ) -> Result<Option<MatchResult<T>>, ParseError> {
        let graph = self.compile(entry, &[], &[])?;
        let scope = Scope {
            compiler: &self.compiler,
            tokens,
        };

        let mut instance = Instance::new(graph, 0, &scope)?;
        let mut retries = 0usize;
        while instance.end().is_some_and(|end| end < tokens.len()) {
            instance.try_again(&scope)?;
            retries += 1;
        }

        if !instance.is_matching() {
            debug!(retries, "no match consumes the whole input");
            return Ok(None);
        }
        let result = instance.result(&scope, &self.handlers, context)?;
        debug!(retries, "matched");
        Ok(Some(result))
    }
}

impl<T, C> fmt::Debug for Parser<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("macros", &self.handlers.len())
            .field("cached_graphs", &self.cached_graphs())
            .field("tokenizer", &self.tokenizer.config())
            .finish_non_exhaustive()
    }
}
