//! Resumable match attempts.
//!
//! An [`Instance`] is one live attempt to match a graph node at a fixed
//! start position. Creating it probes for the first match. While
//! [`Instance::end`] is `Some`, the instance is matching and its result
//! may be read; [`Instance::try_again`] moves it to the next distinct
//! match from the same start, or kills it for good. Composite nodes keep
//! the child instances they need to resume.
//!
//! Every step that recurses into children runs under
//! [`ensure_sufficient_stack`], including drop.

use std::sync::Arc;

use macrame_lexer::Token;
use macrame_pattern::{PatternQuantifier, QuantifierMode};
use macrame_stack::ensure_sufficient_stack;

use crate::compile::MatcherCompiler;
use crate::parser::HandlerTable;
use crate::{Children, CompileError, HandlerError, MatchResult, Matcher};

/// What an instance matches against.
pub(crate) struct Scope<'a> {
    pub(crate) compiler: &'a MatcherCompiler,
    pub(crate) tokens: &'a [Token],
}

/// Next move of a repetition when it is resumed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Step {
    /// Consider the current repetition list as a candidate, then extend it.
    Visit,
    /// Try one more repetition on top of the current list.
    Extend,
    /// Ask the newest repetition for its next match.
    Backtrack,
}

#[derive(Default)]
enum State {
    /// Empty and token nodes, which have at most one match.
    #[default]
    Leaf,
    /// Children matched so far, left to right.
    Sequence(Vec<Instance>),
    Branch {
        index: usize,
        current: Option<Box<Instance>>,
    },
    Repeat {
        reps: Vec<Instance>,
        resume: Step,
    },
    /// Handler and call nodes, which forward to one inner instance.
    Delegate(Box<Instance>),
}

pub(crate) struct Instance {
    node: Arc<Matcher>,
    start: usize,
    end: Option<usize>,
    state: State,
}

impl Instance {
    /// Instantiate `node` at `start` and probe for its first match.
    pub(crate) fn new(
        node: Arc<Matcher>,
        start: usize,
        scope: &Scope<'_>,
    ) -> Result<Self, CompileError> {
        ensure_sufficient_stack(|| {
            let mut instance = Instance {
                node: Arc::clone(&node),
                start,
                end: None,
                state: State::Leaf,
            };
            match &*node {
                Matcher::Empty => instance.end = Some(start),
                Matcher::Token(predicate) => {
                    let token = scope.tokens.get(start).map(|t| &t.kind);
                    if token.is_some() && predicate.matches(token) {
                        instance.end = Some(start + 1);
                    }
                }
                Matcher::Sequence(children) => match children.first() {
                    None => instance.end = Some(start),
                    Some(first) => {
                        let first = Instance::new(Arc::clone(first), start, scope)?;
                        instance.state = State::Sequence(vec![first]);
                        instance.settle_sequence(children, scope)?;
                    }
                },
                Matcher::Branch(alternatives) => {
                    instance.state = State::Branch {
                        index: 0,
                        current: None,
                    };
                    instance.probe_branch(alternatives, 0, scope)?;
                }
                Matcher::Quantified(inner, quantifier) => {
                    instance.state = State::Repeat {
                        reps: Vec::new(),
                        resume: Step::Visit,
                    };
                    let step = match quantifier.mode() {
                        QuantifierMode::Reluctant => Step::Visit,
                        QuantifierMode::Greedy | QuantifierMode::Possessive => Step::Extend,
                    };
                    instance.run_repeat(inner, *quantifier, step, scope)?;
                }
                Matcher::Handled(inner, _) => {
                    instance.delegate(Arc::clone(inner), scope)?;
                }
                Matcher::Call(call) => {
                    let callee = scope.compiler.resolve(call)?;
                    instance.delegate(callee, scope)?;
                }
            }
            Ok(instance)
        })
    }

    #[inline]
    pub(crate) fn end(&self) -> Option<usize> {
        self.end
    }

    #[inline]
    pub(crate) fn is_matching(&self) -> bool {
        self.end.is_some()
    }

    /// Advance to the next distinct match, or die. No effect once dead.
    pub(crate) fn try_again(&mut self, scope: &Scope<'_>) -> Result<(), CompileError> {
        if !self.is_matching() {
            return Ok(());
        }
        ensure_sufficient_stack(|| {
            let node = Arc::clone(&self.node);
            match &*node {
                Matcher::Empty | Matcher::Token(_) => self.end = None,
                Matcher::Sequence(children) => match &mut self.state {
                    State::Sequence(stack) => {
                        if let Some(last) = stack.last_mut() {
                            last.try_again(scope)?;
                        }
                        self.settle_sequence(children, scope)?;
                    }
                    _ => self.end = None,
                },
                Matcher::Branch(alternatives) => {
                    let State::Branch { index, current } = &mut self.state else {
                        self.end = None;
                        return Ok(());
                    };
                    let next = *index + 1;
                    if let Some(current) = current {
                        current.try_again(scope)?;
                        if current.is_matching() {
                            self.end = current.end;
                            return Ok(());
                        }
                    }
                    self.probe_branch(alternatives, next, scope)?;
                }
                Matcher::Quantified(inner, quantifier) => {
                    if quantifier.mode() == QuantifierMode::Possessive {
                        self.end = None;
                        return Ok(());
                    }
                    let State::Repeat { resume, .. } = &self.state else {
                        self.end = None;
                        return Ok(());
                    };
                    let step = *resume;
                    self.run_repeat(inner, *quantifier, step, scope)?;
                }
                Matcher::Handled(..) | Matcher::Call(_) => {
                    if let State::Delegate(inner) = &mut self.state {
                        inner.try_again(scope)?;
                        self.end = inner.end;
                    } else {
                        self.end = None;
                    }
                }
            }
            Ok(())
        })
    }

    // === Composite nodes ===

    /// Drive the child stack to a full match, or empty it.
    ///
    /// The top of the stack is either matching, in which case the next
    /// child starts at its end, or dead, in which case it is popped and
    /// the child before it is retried.
    fn settle_sequence(
        &mut self,
        children: &[Arc<Matcher>],
        scope: &Scope<'_>,
    ) -> Result<(), CompileError> {
        let State::Sequence(stack) = &mut self.state else {
            self.end = None;
            return Ok(());
        };
        loop {
            let Some(top_end) = stack.last().map(Instance::end) else {
                self.end = None;
                return Ok(());
            };
            match top_end {
                Some(end) if stack.len() == children.len() => {
                    self.end = Some(end);
                    return Ok(());
                }
                Some(end) => {
                    let next = Instance::new(Arc::clone(&children[stack.len()]), end, scope)?;
                    stack.push(next);
                }
                None => {
                    stack.pop();
                    if let Some(previous) = stack.last_mut() {
                        previous.try_again(scope)?;
                    }
                }
            }
        }
    }

    /// Commit to the first alternative from `from` onward that matches.
    fn probe_branch(
        &mut self,
        alternatives: &[Arc<Matcher>],
        from: usize,
        scope: &Scope<'_>,
    ) -> Result<(), CompileError> {
        for (index, alternative) in alternatives.iter().enumerate().skip(from) {
            let candidate = Instance::new(Arc::clone(alternative), self.start, scope)?;
            if candidate.is_matching() {
                self.end = candidate.end;
                self.state = State::Branch {
                    index,
                    current: Some(Box::new(candidate)),
                };
                return Ok(());
            }
        }
        self.end = None;
        self.state = State::Branch {
            index: alternatives.len(),
            current: None,
        };
        Ok(())
    }

    fn delegate(&mut self, target: Arc<Matcher>, scope: &Scope<'_>) -> Result<(), CompileError> {
        let inner = Instance::new(target, self.start, scope)?;
        self.end = inner.end;
        self.state = State::Delegate(Box::new(inner));
        Ok(())
    }

    /// Search repetition lists depth-first until one is accepted.
    ///
    /// Greedy instances start with `Extend` and resume with `Backtrack`,
    /// so a list is accepted only once it cannot grow: longest first.
    /// Reluctant instances start with `Visit` and resume with `Extend`,
    /// so a list is accepted before it grows: shortest first.
    ///
    /// A repetition that matched nothing is never extended once `min` is
    /// reached, which keeps `(x?)*` finite.
    fn run_repeat(
        &mut self,
        inner: &Arc<Matcher>,
        quantifier: PatternQuantifier,
        mut step: Step,
        scope: &Scope<'_>,
    ) -> Result<(), CompileError> {
        let reluctant = quantifier.mode() == QuantifierMode::Reluctant;
        let start = self.start;
        let State::Repeat { reps, resume } = &mut self.state else {
            self.end = None;
            return Ok(());
        };
        loop {
            match step {
                Step::Visit => {
                    if reluctant && quantifier.contains(reps.len()) {
                        self.end = Some(reps.last().and_then(|r| r.end).unwrap_or(start));
                        *resume = Step::Extend;
                        return Ok(());
                    }
                    step = Step::Extend;
                }
                Step::Extend => {
                    let at = reps.last().and_then(|r| r.end).unwrap_or(start);
                    let stalled = reps
                        .last()
                        .is_some_and(|r| r.end == Some(r.start) && reps.len() >= quantifier.min());
                    let grown = if reps.len() < quantifier.max() && !stalled {
                        let rep = Instance::new(Arc::clone(inner), at, scope)?;
                        if rep.is_matching() {
                            reps.push(rep);
                            true
                        } else {
                            false
                        }
                    } else {
                        false
                    };
                    step = match (grown, reluctant) {
                        (true, true) => Step::Visit,
                        (true, false) => Step::Extend,
                        (false, true) => Step::Backtrack,
                        (false, false) => {
                            if quantifier.contains(reps.len()) {
                                self.end = Some(at);
                                *resume = Step::Backtrack;
                                return Ok(());
                            }
                            Step::Backtrack
                        }
                    };
                }
                Step::Backtrack => {
                    let Some(last) = reps.last_mut() else {
                        self.end = None;
                        return Ok(());
                    };
                    last.try_again(scope)?;
                    if last.is_matching() {
                        step = if reluctant { Step::Visit } else { Step::Extend };
                        continue;
                    }
                    reps.pop();
                    // A greedy list is accepted once everything above it is exhausted.
                    if !reluctant && quantifier.contains(reps.len()) {
                        self.end = Some(reps.last().and_then(|r| r.end).unwrap_or(start));
                        *resume = Step::Backtrack;
                        return Ok(());
                    }
                }
            }
        }
    }

    // === Results ===

    /// Build the result tree of a matching instance, applying handlers
    /// bottom-up.
    pub(crate) fn result<T, C>(
        &self,
        scope: &Scope<'_>,
        handlers: &HandlerTable<T, C>,
        context: &C,
    ) -> Result<MatchResult<T>, HandlerError> {
        ensure_sufficient_stack(|| match (&*self.node, &self.state) {
            (Matcher::Token(_), _) => scope
                .tokens
                .get(self.start)
                .cloned()
                .map(MatchResult::Token)
                .ok_or_else(|| HandlerError::new("token result read past the end of input")),
            (_, State::Sequence(children)) | (_, State::Repeat { reps: children, .. }) => children
                .iter()
                .map(|child| child.result(scope, handlers, context))
                .collect::<Result<Children<_>, _>>()
                .map(MatchResult::Compound),
            (_, State::Branch { current: Some(current), .. }) => {
                current.result(scope, handlers, context)
            }
            (Matcher::Handled(_, handler), State::Delegate(inner)) => {
                let handler = handlers
                    .get(handler.macro_id)
                    .and_then(|alternatives| alternatives.get(handler.alternative))
                    .ok_or_else(|| HandlerError::new("no handler registered for alternative"))?;
                handler(inner.result(scope, handlers, context)?, context)
            }
            (_, State::Delegate(inner)) => inner.result(scope, handlers, context),
            _ => Ok(MatchResult::compound(Vec::new())),
        })
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        let state = std::mem::take(&mut self.state);
        ensure_sufficient_stack(move || drop(state));
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
