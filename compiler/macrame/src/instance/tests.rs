use macrame_lexer::{Tokenizer, TokenizerConfig};
use macrame_pattern::PatternParser;
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

use super::*;
use crate::compile::MacroSource;
use crate::matcher::CallKey;
use crate::{Alternative, MacroSignature};

fn compiler(macros: &[(&str, &str)]) -> MatcherCompiler {
    let parser = PatternParser::new();
    let mut sources = Vec::new();
    let mut index = FxHashMap::default();
    for (id, (name, pattern)) in macros.iter().enumerate() {
        let signature = MacroSignature::new(*name, 0, 0);
        index.insert(signature.clone(), id);
        sources.push(MacroSource {
            signature,
            patterns: vec![parser.parse(pattern).unwrap()],
        });
    }
    MatcherCompiler::new(sources, index)
}

fn tokens(input: &str) -> Vec<Token> {
    Tokenizer::new(TokenizerConfig::default().with_whitespaces(false))
        .tokenize(input)
        .unwrap()
}

fn entry(compiler: &MatcherCompiler) -> Arc<Matcher> {
    compiler
        .compile(&CallKey {
            macro_id: 0,
            token_arguments: vec![],
            matcher_arguments: vec![],
        })
        .unwrap()
}

/// Every end position the first macro produces from position 0, in order.
fn ends_of(compiler: &MatcherCompiler, input: &str) -> Vec<usize> {
    let tokens = tokens(input);
    let scope = Scope {
        compiler,
        tokens: &tokens,
    };
    let mut instance = Instance::new(entry(compiler), 0, &scope).unwrap();
    let mut ends = Vec::new();
    while let Some(end) = instance.end() {
        ends.push(end);
        instance.try_again(&scope).unwrap();
    }
    ends
}

fn ends(pattern: &str, input: &str) -> Vec<usize> {
    ends_of(&compiler(&[("m", pattern)]), input)
}

fn passthrough() -> HandlerTable<(), ()> {
    vec![vec![Alternative::passthrough("").handler]]
}

// === Leaves ===

#[test]
fn token_matches_once() {
    assert_eq!(ends("<label>", "a"), vec![1]);
    assert_eq!(ends("<label>", "1"), Vec::<usize>::new());
}

#[test]
fn token_past_end_never_matches() {
    assert_eq!(ends("<label>", ""), Vec::<usize>::new());
    assert_eq!(ends("<label> <label>", "a"), Vec::<usize>::new());
}

#[test]
fn empty_matches_once() {
    assert_eq!(ends("", "a b"), vec![0]);
}

// === Sequences and branches ===

#[test]
fn sequence_backtracks_into_earlier_children() {
    assert_eq!(ends("<label>* <label>", "a b"), vec![2, 1]);
}

#[test]
fn branch_keeps_declared_order() {
    assert_eq!(ends("(<label> | <label> <label>)", "a b"), vec![1, 2]);
    assert_eq!(ends("(<label> <label> | <label>)", "a b"), vec![2, 1]);
}

#[test]
fn branch_exhausts_current_alternative_first() {
    assert_eq!(ends("(<label>* | <label>)", "a b"), vec![2, 1, 0, 1]);
}

// === Quantifiers ===

#[test]
fn greedy_tries_longest_first() {
    assert_eq!(ends("<label>*", "a b c"), vec![3, 2, 1, 0]);
}

#[test]
fn reluctant_tries_shortest_first() {
    assert_eq!(ends("<label>*?", "a b c"), vec![0, 1, 2, 3]);
}

#[test]
fn possessive_never_gives_back() {
    assert_eq!(ends("<label>*+", "a b c"), vec![3]);
    assert_eq!(ends("<label>*+ <label>", "a b c"), Vec::<usize>::new());
}

#[test]
fn greedy_respects_bounds() {
    assert_eq!(ends("<label>#{1,2}", "a b c"), vec![2, 1]);
    assert_eq!(ends("<label>+", ""), Vec::<usize>::new());
}

#[test]
fn reluctant_starts_at_min() {
    assert_eq!(ends("<label>#{2,}?", "a b c"), vec![2, 3]);
    assert_eq!(ends("<label>#{2,}?", "a"), Vec::<usize>::new());
}

#[test]
fn zero_width_repetition_terminates() {
    assert_eq!(ends("(<label>?)*", ""), vec![0, 0]);
    assert_eq!(ends("(<label>?)*", "a"), vec![1, 1, 0, 0]);
}

// === Calls ===

#[test]
fn recursive_call_resolves_lazily() {
    let compiler = compiler(&[("list", r"<number> (<symbol>[,] \list)?")]);
    assert_eq!(ends_of(&compiler, "1,2,3"), vec![5, 3, 1]);
    assert_eq!(compiler.cached_graphs(), 1);
}

#[test]
fn mutual_recursion_compiles_each_macro_once() {
    let compiler = compiler(&[
        ("even", r"(<label> \odd)?"),
        ("odd", r"<label> \even"),
    ]);
    assert_eq!(ends_of(&compiler, "a b c d"), vec![4, 2, 0]);
    assert_eq!(compiler.cached_graphs(), 2);
}

#[test]
fn deep_recursion_does_not_overflow() {
    let compiler = compiler(&[("list", r"<number> (<symbol>[,] \list)?")]);
    let input = vec!["1"; 5_000].join(",");
    let tokens = tokens(&input);
    let scope = Scope {
        compiler: &compiler,
        tokens: &tokens,
    };
    let instance = Instance::new(entry(&compiler), 0, &scope).unwrap();
    assert_eq!(instance.end(), Some(tokens.len()));
}

// === Results ===

#[test]
fn sequence_result_holds_tokens() {
    let compiler = compiler(&[("m", "<label> <number>")]);
    let tokens = tokens("x 1");
    let scope = Scope {
        compiler: &compiler,
        tokens: &tokens,
    };
    let instance = Instance::new(entry(&compiler), 0, &scope).unwrap();
    let result = instance.result(&scope, &passthrough(), &()).unwrap();
    assert_eq!(
        result,
        MatchResult::compound(vec![
            MatchResult::Token(tokens[0].clone()),
            MatchResult::Token(tokens[1].clone()),
        ])
    );
}

#[test]
fn repetition_result_has_one_child_per_repetition() {
    let compiler = compiler(&[("m", "<label>*")]);
    let tokens = tokens("a b c");
    let scope = Scope {
        compiler: &compiler,
        tokens: &tokens,
    };
    let mut instance = Instance::new(entry(&compiler), 0, &scope).unwrap();
    let handlers = passthrough();
    let first = instance.result(&scope, &handlers, &()).unwrap();
    assert_eq!(first.as_compound().unwrap().len(), 3);
    assert_eq!(instance.result(&scope, &handlers, &()).unwrap(), first);

    instance.try_again(&scope).unwrap();
    let second = instance.result(&scope, &handlers, &()).unwrap();
    assert_eq!(second.as_compound().unwrap().len(), 2);
}

#[test]
fn empty_result_is_empty_compound() {
    let compiler = compiler(&[("m", "")]);
    let scope = Scope {
        compiler: &compiler,
        tokens: &[],
    };
    let instance = Instance::new(entry(&compiler), 0, &scope).unwrap();
    assert_eq!(
        instance.result(&scope, &passthrough(), &()).unwrap(),
        MatchResult::compound(vec![])
    );
}

#[test]
fn handler_replaces_result() {
    let compiler = compiler(&[("m", "<label>*")]);
    let tokens = tokens("a b");
    let scope = Scope {
        compiler: &compiler,
        tokens: &tokens,
    };
    let count: Alternative<usize, ()> = Alternative::new("", |result, _| {
        Ok(MatchResult::Value(result.as_compound()?.len()))
    });
    let handlers = vec![vec![count.handler]];
    let instance = Instance::new(entry(&compiler), 0, &scope).unwrap();
    assert_eq!(
        instance.result(&scope, &handlers, &()).unwrap(),
        MatchResult::Value(2)
    );
}
