//! Match results and the handler-facing error type.

use std::ops::{Deref, DerefMut};

use macrame_lexer::Token;

/// A runtime failure raised by a handler (or by a result accessor a
/// handler called). Propagated out of `parse` unchanged.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError {
            message: message.into(),
        }
    }

    fn shape(expected: &str, found: &str) -> Self {
        HandlerError::new(format!("expected a {expected} result, found a {found} result"))
    }
}

/// Result tree of a successful match.
///
/// Token slots yield `Token`; sequences, repetitions and empty matches
/// yield `Compound`; handlers may replace any node with a `Value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchResult<T> {
    Compound(Children<T>),
    Value(T),
    Token(Token),
}

/// Children of a compound result.
///
/// Dropping flattens the subtree onto a work list, so a tree of any depth
/// is freed without recursing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Children<T>(Vec<MatchResult<T>>);

impl<T> Children<T> {
    pub fn into_vec(mut self) -> Vec<MatchResult<T>> {
        std::mem::take(&mut self.0)
    }
}

impl<T> From<Vec<MatchResult<T>>> for Children<T> {
    fn from(children: Vec<MatchResult<T>>) -> Self {
        Children(children)
    }
}

impl<T> FromIterator<MatchResult<T>> for Children<T> {
    fn from_iter<I: IntoIterator<Item = MatchResult<T>>>(iter: I) -> Self {
        Children(iter.into_iter().collect())
    }
}

impl<T> Deref for Children<T> {
    type Target = Vec<MatchResult<T>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Children<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> Drop for Children<T> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.0);
        while let Some(mut child) = pending.pop() {
            if let MatchResult::Compound(children) = &mut child {
                pending.append(&mut children.0);
            }
        }
    }
}

impl<T> MatchResult<T> {
    pub fn compound(children: Vec<MatchResult<T>>) -> Self {
        MatchResult::Compound(children.into())
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            MatchResult::Compound(_) => "compound",
            MatchResult::Value(_) => "value",
            MatchResult::Token(_) => "token",
        }
    }

    pub fn as_compound(&self) -> Result<&[MatchResult<T>], HandlerError> {
        match self {
            MatchResult::Compound(children) => Ok(children.as_slice()),
            other => Err(HandlerError::shape("compound", other.kind_name())),
        }
    }

    /// Child `index` of a compound result.
    pub fn get(&self, index: usize) -> Result<&MatchResult<T>, HandlerError> {
        let children = self.as_compound()?;
        children.get(index).ok_or_else(|| {
            HandlerError::new(format!(
                "compound result has {} children, no index {index}",
                children.len()
            ))
        })
    }

    pub fn as_value(&self) -> Result<&T, HandlerError> {
        match self {
            MatchResult::Value(value) => Ok(value),
            other => Err(HandlerError::shape("value", other.kind_name())),
        }
    }

    pub fn as_token(&self) -> Result<&Token, HandlerError> {
        match self {
            MatchResult::Token(token) => Ok(token),
            other => Err(HandlerError::shape("token", other.kind_name())),
        }
    }

    pub fn into_compound(self) -> Result<Vec<MatchResult<T>>, HandlerError> {
        match self {
            MatchResult::Compound(children) => Ok(children.into_vec()),
            other => Err(HandlerError::shape("compound", other.kind_name())),
        }
    }

    pub fn into_value(self) -> Result<T, HandlerError> {
        match self {
            MatchResult::Value(value) => Ok(value),
            other => Err(HandlerError::shape("value", other.kind_name())),
        }
    }
}
