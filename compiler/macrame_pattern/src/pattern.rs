//! Pattern AST.
//!
//! Produced by [`PatternParser`](crate::PatternParser) and consumed by the
//! matcher compiler. Argument indices are 1-based, as written in templates.

use std::fmt;

use macrame_lexer::TokenKind;

/// How a quantified element explores repetition counts on backtracking.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum QuantifierMode {
    /// Most repetitions first; backtracking drops from the tail.
    Greedy,
    /// Fewest repetitions first; backtracking adds one more.
    Reluctant,
    /// Most repetitions, never revisited.
    Possessive,
}

/// Repetition bounds `min..=max` and the mode used to explore them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PatternQuantifier {
    min: usize,
    max: usize,
    mode: QuantifierMode,
}

impl PatternQuantifier {
    /// Upper bound meaning "no limit".
    pub const UNBOUNDED: usize = usize::MAX;

    /// Exactly one occurrence, never backtracked.
    pub const SINGLE: PatternQuantifier = PatternQuantifier {
        min: 1,
        max: 1,
        mode: QuantifierMode::Possessive,
    };

    /// Returns `None` when `min > max`.
    pub const fn new(min: usize, max: usize, mode: QuantifierMode) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(PatternQuantifier { min, max, mode })
        }
    }

    #[inline]
    pub const fn min(self) -> usize {
        self.min
    }

    #[inline]
    pub const fn max(self) -> usize {
        self.max
    }

    #[inline]
    pub const fn mode(self) -> QuantifierMode {
        self.mode
    }

    #[inline]
    pub const fn is_single(self) -> bool {
        self.min == 1 && self.max == 1
    }

    /// `max == 0`: the element can never occur and is dropped.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.max == 0
    }

    #[inline]
    pub const fn contains(self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }
}

impl fmt::Display for PatternQuantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, 1) => write!(f, "?")?,
            (0, Self::UNBOUNDED) => write!(f, "*")?,
            (1, Self::UNBOUNDED) => write!(f, "+")?,
            (min, Self::UNBOUNDED) => write!(f, "#{{{min},}}")?,
            (min, max) if min == max => write!(f, "#{{{min}}}")?,
            (min, max) => write!(f, "#{{{min},{max}}}")?,
        }
        match self.mode {
            QuantifierMode::Greedy => Ok(()),
            QuantifierMode::Reluctant => write!(f, "?"),
            QuantifierMode::Possessive => write!(f, "+"),
        }
    }
}

/// A bracketed argument of a token slot or macro call.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TemplateToken {
    /// A concrete token, or `None` for the absent argument `[]`.
    Literal(Option<TokenKind>),
    /// `[%N]`: the enclosing macro's N-th token argument.
    Argument(usize),
}

impl fmt::Display for TemplateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateToken::Literal(None) => write!(f, "[]"),
            TemplateToken::Literal(Some(TokenKind::Symbol(c))) => write!(f, "[\\{c}]"),
            TemplateToken::Literal(Some(kind)) => write!(f, "[{kind}]"),
            TemplateToken::Argument(index) => write!(f, "[%{index}]"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Pattern {
    /// Matches the empty span.
    Empty,
    /// `$N`: the enclosing macro's N-th matcher argument.
    Argument(usize),
    /// `<keyword>[arg]...`: one token tested by a predicate.
    Token {
        keyword: String,
        arguments: Vec<TemplateToken>,
    },
    /// `\name[tokArg]...{patArg}...`
    Call {
        name: String,
        token_arguments: Vec<TemplateToken>,
        pattern_arguments: Vec<Pattern>,
    },
    Sequence(Vec<Pattern>),
    /// Ordered alternatives; the first that matches is committed to.
    Branch(Vec<Pattern>),
    Quantified(Box<Pattern>, PatternQuantifier),
}

impl Pattern {
    pub fn token(keyword: impl Into<String>, arguments: Vec<TemplateToken>) -> Self {
        Pattern::Token {
            keyword: keyword.into(),
            arguments,
        }
    }

    pub fn call(
        name: impl Into<String>,
        token_arguments: Vec<TemplateToken>,
        pattern_arguments: Vec<Pattern>,
    ) -> Self {
        Pattern::Call {
            name: name.into(),
            token_arguments,
            pattern_arguments,
        }
    }

    /// Visit this node and every descendant, parents before children.
    pub fn walk<'p>(&'p self, visit: &mut impl FnMut(&'p Pattern)) {
        visit(self);
        match self {
            Pattern::Empty | Pattern::Argument(_) | Pattern::Token { .. } => {}
            Pattern::Call {
                pattern_arguments: children,
                ..
            }
            | Pattern::Sequence(children)
            | Pattern::Branch(children) => {
                for child in children {
                    child.walk(visit);
                }
            }
            Pattern::Quantified(inner, _) => inner.walk(visit),
        }
    }

    fn fmt_atom(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Sequence(_) | Pattern::Branch(_) | Pattern::Quantified(..) => {
                write!(f, "({self})")
            }
            _ => write!(f, "{self}"),
        }
    }
}

/// Renders template syntax that parses back to an equal pattern.
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Empty => write!(f, "()"),
            Pattern::Argument(index) => write!(f, "${index}"),
            Pattern::Token { keyword, arguments } => {
                write!(f, "<{keyword}>")?;
                arguments.iter().try_for_each(|arg| write!(f, "{arg}"))
            }
            Pattern::Call {
                name,
                token_arguments,
                pattern_arguments,
            } => {
                write!(f, "\\{name}")?;
                token_arguments.iter().try_for_each(|arg| write!(f, "{arg}"))?;
                pattern_arguments
                    .iter()
                    .try_for_each(|arg| write!(f, "{{{arg}}}"))
            }
            Pattern::Sequence(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match child {
                        Pattern::Branch(_) | Pattern::Sequence(_) => write!(f, "({child})")?,
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
            Pattern::Branch(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    match child {
                        Pattern::Branch(_) => write!(f, "({child})")?,
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
            Pattern::Quantified(inner, quantifier) => {
                inner.fmt_atom(f)?;
                write!(f, "{quantifier}")
            }
        }
    }
}
