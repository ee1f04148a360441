//! Compiled matcher graphs.
//!
//! A graph mirrors the [`Pattern`](macrame_pattern::Pattern) it was built
//! from, with every argument substituted. Macro calls stay unresolved
//! until an instance first needs them: a [`LazyCall`] holds the fully
//! concrete call key and memoizes the callee once it has been compiled,
//! so self- and mutually recursive macros compile in finite time.
//!
//! Graphs are immutable and compare structurally. The engine's cache
//! holds the only strong reference to each compiled macro graph; lazy
//! call nodes keep a weak one, and so recursive grammars form no
//! reference cycles.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, Weak};

use macrame_lexer::TokenKind;
use macrame_pattern::{PatternQuantifier, TokenPredicate};

/// Identifies the handler of one alternative of one macro.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct HandlerRef {
    pub(crate) macro_id: usize,
    pub(crate) alternative: usize,
}

/// An executable, immutable node of a matcher graph.
#[derive(Debug, Eq, PartialEq, Hash)]
pub enum Matcher {
    Empty,
    Token(TokenPredicate),
    Sequence(Vec<Arc<Matcher>>),
    Branch(Vec<Arc<Matcher>>),
    Quantified(Arc<Matcher>, PatternQuantifier),
    /// Applies a registered handler to the inner result.
    Handled(Arc<Matcher>, HandlerRef),
    Call(LazyCall),
}

/// Cache key of a compiled macro graph.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct CallKey {
    pub(crate) macro_id: usize,
    pub(crate) token_arguments: Vec<Option<TokenKind>>,
    pub(crate) matcher_arguments: Vec<Arc<Matcher>>,
}

/// A macro call resolved on first instantiation.
///
/// Equality and hashing use the call key only.
pub struct LazyCall {
    pub(crate) key: CallKey,
    resolved: OnceLock<Weak<Matcher>>,
}

impl LazyCall {
    pub(crate) fn new(key: CallKey) -> Self {
        LazyCall {
            key,
            resolved: OnceLock::new(),
        }
    }

    /// The memoized callee graph, if it is still alive.
    pub(crate) fn resolved(&self) -> Option<Arc<Matcher>> {
        self.resolved.get().and_then(Weak::upgrade)
    }

    pub(crate) fn memoize(&self, callee: &Arc<Matcher>) {
        // A concurrent resolver may have won; both hold the cached graph.
        let _ = self.resolved.set(Arc::downgrade(callee));
    }
}

impl PartialEq for LazyCall {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for LazyCall {}

impl Hash for LazyCall {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for LazyCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCall")
            .field("macro_id", &self.key.macro_id)
            .field("token_arguments", &self.key.token_arguments)
            .field("matcher_arguments", &self.key.matcher_arguments)
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}
