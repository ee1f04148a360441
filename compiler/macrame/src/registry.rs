//! The build phase: macro registration and the completion check.
//!
//! Each alternative's template is parsed and checked as it is registered,
//! so most grammar mistakes surface at the call that introduced them.
//! Calls to other macros may be registered in any order; only
//! [`MacroRegistry::check_completion`] requires every referenced
//! signature to exist, and turns the registry into a [`Parser`].

use std::collections::{BTreeMap, BTreeSet};

use macrame_lexer::{TokenKind, Tokenizer, TokenizerConfig};
use macrame_pattern::{Pattern, PatternParser, TemplateToken, TokenPredicate};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::compile::{MacroSource, MatcherCompiler};
use crate::handler::Handler;
use crate::{Alternative, ArgumentKind, MacroSignature, MissingMacro, Parser, RegistrationError};

struct MacroEntry<T, C> {
    signature: MacroSignature,
    patterns: Vec<Pattern>,
    handlers: Vec<Handler<T, C>>,
    /// Signatures this macro's templates call.
    calls: BTreeSet<MacroSignature>,
}

/// Collects macros until the grammar is complete.
pub struct MacroRegistry<T, C> {
    config: TokenizerConfig,
    templates: PatternParser,
    macros: Vec<MacroEntry<T, C>>,
    index: FxHashMap<MacroSignature, usize>,
}

impl<T, C> Default for MacroRegistry<T, C> {
    fn default() -> Self {
        MacroRegistry::new(TokenizerConfig::default())
    }
}

impl<T, C> MacroRegistry<T, C> {
    /// An empty registry whose parser will tokenize input with `config`.
    pub fn new(config: TokenizerConfig) -> Self {
        MacroRegistry {
            config,
            templates: PatternParser::new(),
            macros: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> TokenizerConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn contains(&self, signature: &MacroSignature) -> bool {
        self.index.contains_key(signature)
    }

    /// Register macro `name` taking `token_arguments` token arguments and
    /// `matcher_arguments` matcher arguments.
    ///
    /// Alternatives are tried in the order given.
    pub fn register_macro(
        &mut self,
        name: &str,
        token_arguments: usize,
        matcher_arguments: usize,
        alternatives: impl IntoIterator<Item = Alternative<T, C>>,
    ) -> Result<(), RegistrationError> {
        let signature = MacroSignature::new(name, token_arguments, matcher_arguments);
        if self.index.contains_key(&signature) {
            return Err(RegistrationError::Duplicate(signature));
        }

        let mut patterns = Vec::new();
        let mut handlers = Vec::new();
        let mut calls = BTreeSet::new();
        for (alternative, Alternative { pattern, handler }) in alternatives.into_iter().enumerate() {
            let parsed =
                self.templates
                    .parse(&pattern)
                    .map_err(|source| RegistrationError::Pattern {
                        signature: signature.clone(),
                        alternative,
                        source,
                    })?;
            Validator {
                signature: &signature,
                alternative,
            }
            .check(&parsed, &mut calls)?;
            patterns.push(parsed);
            handlers.push(handler);
        }
        if patterns.is_empty() {
            return Err(RegistrationError::NoAlternatives(signature));
        }

        debug!(
            signature = %signature,
            alternatives = patterns.len(),
            calls = calls.len(),
            "registered macro"
        );
        self.index.insert(signature.clone(), self.macros.len());
        self.macros.push(MacroEntry {
            signature,
            patterns,
            handlers,
            calls,
        });
        Ok(())
    }

    /// Verify that every called macro is registered and build the parser.
    ///
    /// On failure, every missing signature is reported together with the
    /// macros that call it.
    pub fn check_completion(self) -> Result<Parser<T, C>, RegistrationError> {
        let referenced = {
            let mut missing: BTreeMap<&MacroSignature, Vec<MacroSignature>> = BTreeMap::new();
            let mut referenced = BTreeSet::new();
            for entry in &self.macros {
                for call in &entry.calls {
                    referenced.insert(call);
                    if !self.index.contains_key(call) {
                        missing
                            .entry(call)
                            .or_default()
                            .push(entry.signature.clone());
                    }
                }
            }
            if !missing.is_empty() {
                let missing = missing
                    .into_iter()
                    .map(|(signature, requested_by)| MissingMacro {
                        signature: signature.clone(),
                        requested_by,
                    })
                    .collect();
                return Err(RegistrationError::Incomplete(missing));
            }
            referenced.len()
        };
        debug!(macros = self.macros.len(), referenced, "grammar complete");

        let mut sources = Vec::with_capacity(self.macros.len());
        let mut handlers = Vec::with_capacity(self.macros.len());
        for entry in self.macros {
            sources.push(MacroSource {
                signature: entry.signature,
                patterns: entry.patterns,
            });
            handlers.push(entry.handlers);
        }
        Ok(Parser::new(
            MatcherCompiler::new(sources, self.index),
            handlers,
            Tokenizer::new(self.config),
        ))
    }
}

/// Registration-time checks of one alternative.
struct Validator<'s> {
    signature: &'s MacroSignature,
    alternative: usize,
}

impl Validator<'_> {
    fn check(
        &self,
        pattern: &Pattern,
        calls: &mut BTreeSet<MacroSignature>,
    ) -> Result<(), RegistrationError> {
        let mut nodes = Vec::new();
        pattern.walk(&mut |node| nodes.push(node));
        for node in nodes {
            match node {
                Pattern::Argument(index) => self.index(ArgumentKind::Matcher, *index)?,
                Pattern::Token { keyword, arguments } => {
                    self.token_arguments(arguments)?;
                    // Fully literal slots can be built now.
                    if let Some(literals) = literal_arguments(arguments) {
                        TokenPredicate::build(keyword, &literals).map_err(|source| {
                            RegistrationError::Predicate {
                                signature: self.signature.clone(),
                                alternative: self.alternative,
                                source,
                            }
                        })?;
                    }
                }
                Pattern::Call {
                    name,
                    token_arguments,
                    pattern_arguments,
                } => {
                    self.token_arguments(token_arguments)?;
                    calls.insert(MacroSignature::new(
                        name,
                        token_arguments.len(),
                        pattern_arguments.len(),
                    ));
                }
                Pattern::Empty
                | Pattern::Sequence(_)
                | Pattern::Branch(_)
                | Pattern::Quantified(..) => {}
            }
        }
        Ok(())
    }

    fn token_arguments(&self, arguments: &[TemplateToken]) -> Result<(), RegistrationError> {
        for argument in arguments {
            if let TemplateToken::Argument(index) = argument {
                self.index(ArgumentKind::Token, *index)?;
            }
        }
        Ok(())
    }

    fn index(&self, kind: ArgumentKind, index: usize) -> Result<(), RegistrationError> {
        let declared = match kind {
            ArgumentKind::Token => self.signature.token_arguments,
            ArgumentKind::Matcher => self.signature.matcher_arguments,
        };
        if (1..=declared).contains(&index) {
            Ok(())
        } else {
            Err(RegistrationError::ArgumentOutOfRange {
                signature: self.signature.clone(),
                alternative: self.alternative,
                kind,
                index,
                declared,
            })
        }
    }
}

/// The arguments as concrete tokens, if none is bound to a macro argument.
fn literal_arguments(arguments: &[TemplateToken]) -> Option<Vec<Option<TokenKind>>> {
    arguments
        .iter()
        .map(|argument| match argument {
            TemplateToken::Literal(kind) => Some(kind.clone()),
            TemplateToken::Argument(_) => None,
        })
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
