use macrame_pattern::{PatternError, PredicateError, SyntaxErrorKind};
use pretty_assertions::assert_eq;

use super::*;

type Registry = MacroRegistry<(), ()>;

fn alternatives(patterns: &[&str]) -> Vec<Alternative<(), ()>> {
    patterns.iter().map(|p| Alternative::passthrough(*p)).collect()
}

fn register(
    registry: &mut Registry,
    name: &str,
    tokens: usize,
    matchers: usize,
    patterns: &[&str],
) -> Result<(), RegistrationError> {
    registry.register_macro(name, tokens, matchers, alternatives(patterns))
}

// === Registration ===

#[test]
fn registers_by_full_signature() {
    let mut registry = Registry::default();
    register(&mut registry, "list", 0, 0, &["<label>*"]).unwrap();
    register(&mut registry, "list", 1, 0, &["<label> (<symbol>[%1] <label>)*"]).unwrap();
    assert_eq!(registry.len(), 2);
    assert!(registry.contains(&MacroSignature::new("list", 1, 0)));
    assert!(!registry.contains(&MacroSignature::new("list", 0, 1)));
}

#[test]
fn duplicate_signature() {
    let mut registry = Registry::default();
    register(&mut registry, "m", 0, 0, &["<label>"]).unwrap();
    assert_eq!(
        register(&mut registry, "m", 0, 0, &["<number>"]),
        Err(RegistrationError::Duplicate(MacroSignature::new("m", 0, 0)))
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn no_alternatives() {
    let mut registry = Registry::default();
    assert_eq!(
        register(&mut registry, "m", 0, 0, &[]),
        Err(RegistrationError::NoAlternatives(MacroSignature::new("m", 0, 0)))
    );
    assert!(registry.is_empty());
}

#[test]
fn pattern_error_names_alternative() {
    let mut registry = Registry::default();
    let err = register(&mut registry, "m", 0, 0, &["<label>", "<label"]).unwrap_err();
    match err {
        RegistrationError::Pattern {
            signature,
            alternative,
            source: PatternError::Syntax { .. },
        } => {
            assert_eq!(signature, MacroSignature::new("m", 0, 0));
            assert_eq!(alternative, 1);
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
    assert!(registry.is_empty());
}

#[test]
fn trailing_group_close_is_rejected() {
    let mut registry = Registry::default();
    let err = register(&mut registry, "m", 0, 0, &["<label> )"]).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Pattern {
            source: PatternError::Syntax {
                kind: SyntaxErrorKind::TrailingInput,
                ..
            },
            ..
        }
    ));
}

// === Argument indices ===

#[test]
fn matcher_argument_out_of_range() {
    let mut registry = Registry::default();
    assert_eq!(
        register(&mut registry, "m", 0, 1, &["$1 $2"]),
        Err(RegistrationError::ArgumentOutOfRange {
            signature: MacroSignature::new("m", 0, 1),
            alternative: 0,
            kind: ArgumentKind::Matcher,
            index: 2,
            declared: 1,
        })
    );
}

#[test]
fn token_argument_out_of_range() {
    let mut registry = Registry::default();
    assert_eq!(
        register(&mut registry, "m", 0, 0, &["<symbol>[%1]"]),
        Err(RegistrationError::ArgumentOutOfRange {
            signature: MacroSignature::new("m", 0, 0),
            alternative: 0,
            kind: ArgumentKind::Token,
            index: 1,
            declared: 0,
        })
    );
}

#[test]
fn call_arguments_are_checked() {
    let mut registry = Registry::default();
    let err = register(&mut registry, "m", 1, 0, &[r"\other[%1][%3]"]).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::ArgumentOutOfRange {
            kind: ArgumentKind::Token,
            index: 3,
            ..
        }
    ));

    let err = register(&mut registry, "m", 1, 0, &[r"\other{$1}"]).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::ArgumentOutOfRange {
            kind: ArgumentKind::Matcher,
            index: 1,
            declared: 0,
            ..
        }
    ));
}

// === Predicates ===

#[test]
fn unknown_keyword_fails_fast() {
    let mut registry = Registry::default();
    assert_eq!(
        register(&mut registry, "m", 0, 0, &["<bogus>"]),
        Err(RegistrationError::Predicate {
            signature: MacroSignature::new("m", 0, 0),
            alternative: 0,
            source: PredicateError::UnknownKeyword("bogus".to_owned()),
        })
    );
}

#[test]
fn literal_arguments_are_validated() {
    let mut registry = Registry::default();
    let err = register(&mut registry, "m", 0, 0, &["<number>[huge]"]).unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Predicate {
            source: PredicateError::NoMatchingOverload { .. },
            ..
        }
    ));
}

#[test]
fn bound_arguments_are_validated_on_compile() {
    let mut registry = Registry::default();
    register(&mut registry, "m", 1, 0, &["<number>[%1]"]).unwrap();
    let parser = registry.check_completion().unwrap();
    let err = parser
        .compile("m", &[Some(TokenKind::label("huge"))], &[])
        .unwrap_err();
    assert!(matches!(
        err,
        crate::CompileError::Predicate(PredicateError::NoMatchingOverload { .. })
    ));
}

// === Completion ===

#[test]
fn callees_may_be_registered_later() {
    let mut registry = Registry::default();
    register(&mut registry, "outer", 0, 0, &[r"\inner <symbol>[,] \inner"]).unwrap();
    register(&mut registry, "inner", 0, 0, &["<label>"]).unwrap();
    let parser = registry.check_completion().unwrap();
    assert!(parser.parse("a,b", "outer", &()).unwrap().is_some());
}

#[test]
fn incomplete_lists_every_missing_signature() {
    let mut registry = Registry::default();
    register(&mut registry, "a", 0, 0, &[r"\missing"]).unwrap();
    register(&mut registry, "b", 0, 0, &[r"\missing", r"\other{<label>} \a"]).unwrap();
    let Err(err) = registry.check_completion() else {
        panic!("expected an incomplete grammar");
    };
    assert_eq!(
        err,
        RegistrationError::Incomplete(vec![
            MissingMacro {
                signature: MacroSignature::new("missing", 0, 0),
                requested_by: vec![
                    MacroSignature::new("a", 0, 0),
                    MacroSignature::new("b", 0, 0),
                ],
            },
            MissingMacro {
                signature: MacroSignature::new("other", 0, 1),
                requested_by: vec![MacroSignature::new("b", 0, 0)],
            },
        ])
    );
    assert_eq!(
        err.to_string(),
        "unregistered macros are referenced:\n  \\missing[0]{0} (requested by \\a[0]{0}, \\b[0]{0})\
         \n  \\other[0]{1} (requested by \\b[0]{0})"
    );
}

#[test]
fn nested_call_arguments_are_collected() {
    let mut registry = Registry::default();
    register(&mut registry, "m", 0, 0, &[r"\wrap{\inner}"]).unwrap();
    register(&mut registry, "wrap", 0, 1, &["$1"]).unwrap();
    let Err(RegistrationError::Incomplete(missing)) = registry.check_completion() else {
        panic!("expected an incomplete grammar");
    };
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].signature, MacroSignature::new("inner", 0, 0));
}

#[test]
fn parser_keeps_tokenizer_config() {
    let config = TokenizerConfig::default().with_decimal_numbers(false);
    let registry: Registry = MacroRegistry::new(config);
    assert_eq!(registry.config(), config);
    let parser = registry.check_completion().unwrap();
    assert_eq!(parser.tokenizer_config(), config);
}
