//! Pattern-to-graph compilation and the graph cache.
//!
//! A macro graph is compiled once per distinct call key: the macro plus
//! its concrete token and matcher arguments. Compilation substitutes the
//! arguments into every alternative, builds token predicates, and turns
//! nested calls into [`LazyCall`] nodes without compiling their callees.

use std::sync::Arc;

use macrame_lexer::TokenKind;
use macrame_pattern::{Pattern, TemplateToken, TokenPredicate};
use macrame_stack::ensure_sufficient_stack;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::matcher::{CallKey, HandlerRef, LazyCall};
use crate::{ArgumentKind, CompileError, MacroSignature, Matcher};

/// The patterns of one registered macro, in alternative order.
pub(crate) struct MacroSource {
    pub(crate) signature: MacroSignature,
    pub(crate) patterns: Vec<Pattern>,
}

/// Argument environment of the macro being compiled.
struct Bindings<'k> {
    tokens: &'k [Option<TokenKind>],
    matchers: &'k [Arc<Matcher>],
}

impl Bindings<'_> {
    fn token(&self, argument: &TemplateToken) -> Result<Option<TokenKind>, CompileError> {
        match argument {
            TemplateToken::Literal(kind) => Ok(kind.clone()),
            TemplateToken::Argument(index) => index
                .checked_sub(1)
                .and_then(|i| self.tokens.get(i))
                .cloned()
                .ok_or(CompileError::MissingArgument {
                    kind: ArgumentKind::Token,
                    index: *index,
                }),
        }
    }

    fn tokens(&self, arguments: &[TemplateToken]) -> Result<Vec<Option<TokenKind>>, CompileError> {
        arguments.iter().map(|argument| self.token(argument)).collect()
    }

    fn matcher(&self, index: usize) -> Result<Arc<Matcher>, CompileError> {
        index
            .checked_sub(1)
            .and_then(|i| self.matchers.get(i))
            .map(Arc::clone)
            .ok_or(CompileError::MissingArgument {
                kind: ArgumentKind::Matcher,
                index,
            })
    }
}

/// Registered macro sources plus the cache of their compiled graphs.
pub(crate) struct MatcherCompiler {
    macros: Vec<MacroSource>,
    index: FxHashMap<MacroSignature, usize>,
    cache: RwLock<FxHashMap<CallKey, Arc<Matcher>>>,
}

impl MatcherCompiler {
    pub(crate) fn new(macros: Vec<MacroSource>, index: FxHashMap<MacroSignature, usize>) -> Self {
        MatcherCompiler {
            macros,
            index,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub(crate) fn lookup(&self, signature: &MacroSignature) -> Result<usize, CompileError> {
        self.index
            .get(signature)
            .copied()
            .ok_or_else(|| CompileError::UnknownMacro(signature.clone()))
    }

    /// Number of distinct graphs compiled so far.
    pub(crate) fn cached_graphs(&self) -> usize {
        self.cache.read().len()
    }

    /// The graph for `key`, compiling and caching it on first request.
    pub(crate) fn compile(&self, key: &CallKey) -> Result<Arc<Matcher>, CompileError> {
        if let Some(graph) = self.cache.read().get(key) {
            return Ok(Arc::clone(graph));
        }

        let source = self.macros.get(key.macro_id).ok_or_else(|| {
            CompileError::UnknownMacro(MacroSignature::new(
                format!("#{}", key.macro_id),
                key.token_arguments.len(),
                key.matcher_arguments.len(),
            ))
        })?;
        trace!(
            signature = %source.signature,
            token_arguments = key.token_arguments.len(),
            matcher_arguments = key.matcher_arguments.len(),
            "compiling matcher graph"
        );

        let bindings = Bindings {
            tokens: &key.token_arguments,
            matchers: &key.matcher_arguments,
        };
        let alternatives = source
            .patterns
            .iter()
            .enumerate()
            .map(|(alternative, pattern)| {
                let handler = HandlerRef {
                    macro_id: key.macro_id,
                    alternative,
                };
                Ok(Arc::new(Matcher::Handled(self.build(pattern, &bindings)?, handler)))
            })
            .collect::<Result<Vec<_>, CompileError>>()?;
        let graph = Arc::new(Matcher::Branch(alternatives));

        // Another thread may have compiled the same key meanwhile; keep theirs.
        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(key.clone()).or_insert(graph)))
    }

    /// Resolve a lazy call node, memoizing the callee in it.
    pub(crate) fn resolve(&self, call: &LazyCall) -> Result<Arc<Matcher>, CompileError> {
        if let Some(callee) = call.resolved() {
            return Ok(callee);
        }
        let callee = self.compile(&call.key)?;
        call.memoize(&callee);
        trace!(macro_id = call.key.macro_id, "resolved lazy call");
        Ok(callee)
    }

    fn build(&self, pattern: &Pattern, bindings: &Bindings<'_>) -> Result<Arc<Matcher>, CompileError> {
        ensure_sufficient_stack(|| {
            let matcher = match pattern {
                Pattern::Empty => Matcher::Empty,
                Pattern::Argument(index) => return bindings.matcher(*index),
                Pattern::Token { keyword, arguments } => {
                    Matcher::Token(TokenPredicate::build(keyword, &bindings.tokens(arguments)?)?)
                }
                Pattern::Call {
                    name,
                    token_arguments,
                    pattern_arguments,
                } => {
                    let signature =
                        MacroSignature::new(name, token_arguments.len(), pattern_arguments.len());
                    let matcher_arguments = pattern_arguments
                        .iter()
                        .map(|argument| self.build(argument, bindings))
                        .collect::<Result<Vec<_>, _>>()?;
                    Matcher::Call(LazyCall::new(CallKey {
                        macro_id: self.lookup(&signature)?,
                        token_arguments: bindings.tokens(token_arguments)?,
                        matcher_arguments,
                    }))
                }
                Pattern::Sequence(children) => Matcher::Sequence(self.build_all(children, bindings)?),
                Pattern::Branch(children) => Matcher::Branch(self.build_all(children, bindings)?),
                Pattern::Quantified(inner, quantifier) => {
                    Matcher::Quantified(self.build(inner, bindings)?, *quantifier)
                }
            };
            Ok(Arc::new(matcher))
        })
    }

    fn build_all(
        &self,
        patterns: &[Pattern],
        bindings: &Bindings<'_>,
    ) -> Result<Vec<Arc<Matcher>>, CompileError> {
        patterns
            .iter()
            .map(|pattern| self.build(pattern, bindings))
            .collect()
    }
}
