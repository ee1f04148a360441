//! Semantic actions attached to macro alternatives.

use std::fmt;
use std::sync::Arc;

use crate::{HandlerError, MatchResult};

/// Transforms the result of a matched alternative. `C` is the caller's
/// context, passed unchanged to every handler of a parse.
pub type Handler<T, C> =
    Arc<dyn Fn(MatchResult<T>, &C) -> Result<MatchResult<T>, HandlerError> + Send + Sync>;

/// One pattern alternative of a macro and the handler for its result.
pub struct Alternative<T, C> {
    pub(crate) pattern: String,
    pub(crate) handler: Handler<T, C>,
}

impl<T, C> Alternative<T, C> {
    pub fn new<F>(pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(MatchResult<T>, &C) -> Result<MatchResult<T>, HandlerError> + Send + Sync + 'static,
    {
        Alternative {
            pattern: pattern.into(),
            handler: Arc::new(handler),
        }
    }

    /// An alternative whose result is passed on untouched.
    pub fn passthrough(pattern: impl Into<String>) -> Self
    where
        T: 'static,
        C: 'static,
    {
        Alternative::new(pattern, |result, _| Ok(result))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl<T, C> Clone for Alternative<T, C> {
    fn clone(&self) -> Self {
        Alternative {
            pattern: self.pattern.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T, C> fmt::Debug for Alternative<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alternative")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}
