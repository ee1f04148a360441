#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Backtracking discipline observed through whole parses.

use std::sync::Arc;
use std::thread;

use macrame::{
    Alternative, CompileError, HandlerError, MacroRegistry, MacroSignature, MatchResult, Matcher,
    ParseError, Parser, PredicateError, TokenKind, TokenPredicate, TokenizeErrorKind,
    TokenizerConfig,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

type Registry = MacroRegistry<usize, ()>;

fn registry() -> Registry {
    MacroRegistry::new(TokenizerConfig::default().with_whitespaces(false))
}

/// Replaces a compound result with its child count.
fn count(pattern: &str) -> Alternative<usize, ()> {
    Alternative::new(pattern, |result, _| {
        Ok(MatchResult::Value(result.as_compound()?.len()))
    })
}

/// Reports the length of the compound result in position 0.
fn head_count(pattern: &str) -> Alternative<usize, ()> {
    Alternative::new(pattern, |result, _| {
        Ok(MatchResult::Value(result.get(0)?.as_compound()?.len()))
    })
}

/// Reports which alternative matched.
fn tagged(pattern: &str, tag: usize) -> Alternative<usize, ()> {
    Alternative::new(pattern, move |_, _| Ok(MatchResult::Value(tag)))
}

fn single(pattern: Alternative<usize, ()>) -> Parser<usize, ()> {
    let mut registry = registry();
    registry.register_macro("m", 0, 0, [pattern]).unwrap();
    registry.check_completion().unwrap()
}

fn value(parser: &Parser<usize, ()>, text: &str) -> Option<usize> {
    parser
        .parse(text, "m", &())
        .unwrap()
        .map(|result| result.into_value().unwrap())
}

fn labels(n: usize) -> String {
    vec!["a"; n].join(" ")
}

// === Quantifier modes ===

proptest! {
    #[test]
    fn greedy_takes_most_and_reluctant_takes_least(
        n in 0usize..10,
        min in 0usize..4,
        extra in 1usize..4,
    ) {
        let max = min + extra;
        let greedy = single(head_count(&format!("<label>#{{{min},{max}}} <label>*")));
        let reluctant = single(head_count(&format!("<label>#{{{min},{max}}}? <label>*")));
        let input = labels(n);
        if n < min {
            prop_assert_eq!(value(&greedy, &input), None);
            prop_assert_eq!(value(&reluctant, &input), None);
        } else {
            prop_assert_eq!(value(&greedy, &input), Some(n.min(max)));
            prop_assert_eq!(value(&reluctant, &input), Some(min));
        }
    }
}

#[test]
fn possessive_does_not_give_back() {
    let greedy = single(count("<label>* <label>"));
    let possessive = single(count("<label>*+ <label>"));
    assert_eq!(value(&greedy, "a b c"), Some(2));
    assert_eq!(value(&possessive, "a b c"), None);
}

#[test]
fn possessive_still_matches_exact_fit() {
    let parser = single(head_count("<label>*+ <number>"));
    assert_eq!(value(&parser, "a b 1"), Some(2));
}

#[test]
fn reluctant_middle_is_widened_until_the_tail_fits() {
    let parser = single(head_count("<label>*? <number>"));
    assert_eq!(value(&parser, "a b c 1"), Some(3));
}

// === Full consumption ===

#[test]
fn partial_matches_are_rejected() {
    let parser = single(count("<label>?"));
    assert_eq!(value(&parser, ""), Some(0));
    assert_eq!(value(&parser, "a"), Some(1));
    assert_eq!(value(&parser, "a b"), None);
}

#[test]
fn later_alternative_is_used_when_earlier_ones_fall_short() {
    let mut registry = registry();
    registry
        .register_macro(
            "m",
            0,
            0,
            [
                tagged("<label>", 0),
                tagged("<label> <label>", 1),
                tagged("<label> <label> <label>", 2),
            ],
        )
        .unwrap();
    let parser = registry.check_completion().unwrap();
    assert_eq!(value(&parser, "a"), Some(0));
    assert_eq!(value(&parser, "a b"), Some(1));
    assert_eq!(value(&parser, "a b c"), Some(2));
    assert_eq!(value(&parser, "a b c d"), None);
}

#[test]
fn first_complete_alternative_wins() {
    let mut registry = registry();
    registry
        .register_macro("m", 0, 0, [tagged("<label>*", 0), tagged("<label> <label>", 1)])
        .unwrap();
    let parser = registry.check_completion().unwrap();
    assert_eq!(value(&parser, "a b"), Some(0));
}

#[test]
fn whitespace_tokens_are_matched_when_kept() {
    let mut registry: Registry = MacroRegistry::default();
    registry
        .register_macro("m", 0, 0, [count("<label> <whitespace> <label>")])
        .unwrap();
    let parser = registry.check_completion().unwrap();
    assert_eq!(value(&parser, "a b"), Some(3));
    assert_eq!(value(&parser, "ab"), None);
}

// === Arguments and calls ===

fn separated_list() -> Parser<usize, ()> {
    let mut registry = registry();
    registry
        .register_macro(
            "list",
            1,
            1,
            [Alternative::new("$1 (<symbol>[%1] $1)*", |result, _| {
                Ok(MatchResult::Value(result.get(1)?.as_compound()?.len() + 1))
            })],
        )
        .unwrap();
    registry
        .register_macro(
            "m",
            0,
            0,
            [
                Alternative::passthrough(r"\list[,]{<number>}"),
                Alternative::passthrough(r"\list[;]{<label>}"),
            ],
        )
        .unwrap();
    registry.check_completion().unwrap()
}

#[test]
fn call_arguments_specialize_the_callee() {
    let parser = separated_list();
    assert_eq!(value(&parser, "1,2,3"), Some(3));
    assert_eq!(value(&parser, "a;b"), Some(2));
    assert_eq!(value(&parser, "1;2"), None);
    assert_eq!(value(&parser, "7"), Some(1));
}

#[test]
fn compile_is_cached_per_argument_list() {
    let parser = separated_list();
    let number = Arc::new(Matcher::Token(TokenPredicate::Number));
    let comma = [Some(TokenKind::Symbol(','))];

    let first = parser.compile("list", &comma, &[Arc::clone(&number)]).unwrap();
    let second = parser.compile("list", &comma, &[Arc::clone(&number)]).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let semicolon = parser
        .compile("list", &[Some(TokenKind::Symbol(';'))], &[number])
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &semicolon));
}

#[test]
fn repeated_parses_reuse_graphs_and_agree() {
    let parser = separated_list();
    let first = parser.parse("1,2,3", "m", &()).unwrap();
    let compiled = parser.cached_graphs();
    let second = parser.parse("1,2,3", "m", &()).unwrap();
    assert_eq!(first, second);
    assert_eq!(parser.cached_graphs(), compiled);
}

#[test]
fn recursive_grammar_parses_nested_input() {
    let mut registry = registry();
    registry
        .register_macro(
            "m",
            0,
            0,
            [
                Alternative::new(
                    r"<symbol>[(] \m <symbol>[)]",
                    |result: MatchResult<usize>, _: &()| {
                        Ok(MatchResult::Value(result.get(1)?.as_value()? + 1))
                    },
                ),
                tagged("", 0),
            ],
        )
        .unwrap();
    let parser = registry.check_completion().unwrap();
    let depth = 500;
    let text = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(value(&parser, &text), Some(depth));
    assert_eq!(value(&parser, "(()"), None);
    assert_eq!(parser.cached_graphs(), 1);
}

#[test]
fn deep_passthrough_results_drop_cleanly() {
    let mut registry = registry();
    registry
        .register_macro(
            "m",
            0,
            0,
            [
                Alternative::passthrough(r"<symbol>[(] \m <symbol>[)]"),
                Alternative::passthrough(""),
            ],
        )
        .unwrap();
    let parser = registry.check_completion().unwrap();
    let depth = 20_000;
    let text = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
    let result = parser.parse(&text, "m", &()).unwrap().unwrap();
    assert_eq!(result.as_compound().unwrap().len(), 3);
    assert_eq!(result.get(1).unwrap().as_compound().unwrap().len(), 3);
    drop(result);
}

// === Errors ===

#[test]
fn handler_errors_propagate() {
    let mut registry = registry();
    registry
        .register_macro(
            "m",
            0,
            0,
            [Alternative::new("<label>", |_, _| {
                Err(HandlerError::new("rejected"))
            })],
        )
        .unwrap();
    let parser: Parser<usize, ()> = registry.check_completion().unwrap();
    assert_eq!(
        parser.parse("a", "m", &()),
        Err(ParseError::Handler(HandlerError::new("rejected")))
    );
    assert_eq!(parser.parse("1", "m", &()), Ok(None));
}

#[test]
fn unknown_entry_is_a_compile_error() {
    let parser = single(count("<label>"));
    assert_eq!(
        parser.parse("a", "missing", &()),
        Err(ParseError::Compile(CompileError::UnknownMacro(
            MacroSignature::new("missing", 0, 0)
        )))
    );
}

#[test]
fn bound_predicate_failure_surfaces_on_parse() {
    let mut registry = registry();
    registry
        .register_macro("num", 1, 0, [count("<number>[%1]")])
        .unwrap();
    registry
        .register_macro("m", 0, 0, [Alternative::passthrough(r"\num[huge]")])
        .unwrap();
    let parser = registry.check_completion().unwrap();
    assert!(matches!(
        parser.parse("1", "m", &()),
        Err(ParseError::Compile(CompileError::Predicate(
            PredicateError::NoMatchingOverload { .. }
        )))
    ));
}

#[test]
fn tokenize_errors_surface_on_parse() {
    let parser = single(count("<label>"));
    let Err(ParseError::Tokenize(err)) = parser.parse("a `", "m", &()) else {
        panic!("expected a tokenize error");
    };
    assert_eq!(err.kind, TokenizeErrorKind::InvalidSymbol('`'));
    assert_eq!(err.position(), 2);
}

// === Concurrency ===

#[test]
fn concurrent_parses_share_one_parser() {
    let parser = separated_list();
    let inputs = ["1,2,3", "a;b;c;d", "4", "x;y", "1;2"];
    let expected = [Some(3), Some(4), Some(1), Some(2), None];

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    inputs
                        .iter()
                        .map(|input| value(&parser, input))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
