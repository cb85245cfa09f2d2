//! Property-based tests across the lexer, parser, validator and printer
//!
//! Generated scripts are built from well-formed pieces, each paired with the
//! number of terminal nodes it should parse into.

use proptest::prelude::*;

use crate::lexer::tokenize;
use crate::parser::parse;
use crate::printer::to_msl;
use crate::token::TokenKind;
use crate::validate::validate_brackets;
use crate::visit::Stats;

/// Single literal, optionally with timing suffixes
fn literal_strategy() -> impl Strategy<Value = (String, usize)> {
    let literal = prop_oneof![
        "[a-z][a-z0-9_]{0,6}",
        "\\$[a-z][a-z0-9_]{0,6}",
        "[1-9][0-9]{0,3}",
        "@\\([0-9]{1,4},[0-9]{1,4}\\)",
        "wheel_(up|down)",
        "wheel_(up|down)[+-][1-9]",
    ];
    let suffix = prop_oneof![
        Just(String::new()),
        "\\([0-9]{1,4}\\)",
        "\\[[0-9]{1,4}\\]",
        "<[0-9]{1,4}>",
        "\\([0-9]{1,3}\\)\\[[0-9]{1,3}\\]<[0-9]{1,3}>",
    ];

    (literal, suffix).prop_map(|(literal, suffix)| {
        // Variables take no suffixes
        if literal.starts_with('$') {
            (literal, 1)
        } else {
            (format!("{literal}{suffix}"), 1)
        }
    })
}

/// Valid scripts of bounded depth
fn script_strategy() -> impl Strategy<Value = (String, usize)> {
    literal_strategy().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (
                prop::collection::vec(inner.clone(), 2..4),
                prop_oneof![Just(", "), Just(" + "), Just(" | "), Just(" > ")],
            )
                .prop_map(|(parts, separator)| {
                    let count: usize = parts.iter().map(|(_, n)| n).sum();
                    let text = parts
                        .into_iter()
                        .map(|(text, _)| text)
                        .collect::<Vec<_>>()
                        .join(separator);
                    (text, count)
                }),
            inner.clone().prop_map(|(text, n)| (format!("({text})"), n)),
            inner.clone().prop_map(|(text, n)| (format!("~({text})"), n)),
            (inner.clone(), 1u32..20)
                .prop_map(|((text, n), count)| (format!("({text})*{count}"), n)),
            (inner.clone(), 1u32..20, 0u32..500)
                .prop_map(|((text, n), count, interval)| {
                    (format!("({text})*{count}{{{interval}}}"), n)
                }),
            (inner.clone(), 0u32..500)
                .prop_map(|((text, n), interval)| (format!("({text})&{interval}"), n)),
            (inner, 0u32..500).prop_map(|((text, n), ms)| (format!("({text})({ms})"), n)),
        ]
    })
}

proptest! {
    #[test]
    fn test_tokenize_is_total(text in "\\PC{0,60}") {
        let tokens = tokenize(&text);
        prop_assert!(!tokens.is_empty());
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        prop_assert_eq!(tokens.iter().filter(|t| t.is_eof()).count(), 1);
        prop_assert!(tokens.windows(2).all(|pair| pair[0].offset <= pair[1].offset));
        prop_assert!(
            tokens
                .iter()
                .filter(|t| t.kind == TokenKind::Unknown)
                .all(|t| t.text.chars().count() == 1)
        );
    }

    #[test]
    fn test_oversized_mouse_coord_lexes_rest(x in 2_147_483_648u64..99_999_999_999, y in 0u32..5000) {
        let text = format!("@({x},{y})");
        let tokens = tokenize(&text);
        prop_assert_eq!(tokens[0].kind, TokenKind::Unknown);
        prop_assert_eq!(tokens[0].text.as_str(), "@");
        prop_assert_eq!(tokens[1].kind, TokenKind::LParen);
        prop_assert_eq!(tokens.last().map(|t| t.offset), Some(text.len()));
    }

    #[test]
    fn test_arbitrary_input_never_panics(text in "[a-z0-9 ,+|~*&()\\[\\]{}<>@$#\\n.-]{0,40}") {
        let tokens = tokenize(&text);
        let _ = validate_brackets(&tokens);
        let _ = parse(&text);
    }

    #[test]
    fn test_generated_scripts_parse((script, terminals) in script_strategy()) {
        let node = parse(&script);
        prop_assert!(node.is_ok(), "failed to parse {:?}: {:?}", script, node);
        if let Ok(node) = node {
            prop_assert_eq!(Stats::collect(&node).terminal_nodes, terminals);
        }
        prop_assert!(validate_brackets(&tokenize(&script)).is_empty());
    }

    #[test]
    fn test_printed_tree_reparses_to_same_shape((script, _) in script_strategy()) {
        if let Ok(node) = parse(&script) {
            let printed = to_msl(&node);
            let reparsed = parse(&printed);
            prop_assert!(reparsed.is_ok(), "{:?} printed as {:?}", script, printed);
            if let Ok(reparsed) = reparsed {
                prop_assert!(node.same_shape(&reparsed), "{:?} printed as {:?}", script, printed);
            }
        }
    }
}
