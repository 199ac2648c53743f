/// Property-based tests for the filter parser.
///
/// Uses the `proptest` crate to generate random condition lists, render them
/// into filter strings and check that parsing recovers every condition, in
/// order, with the right AND/OR links. Also throws arbitrary strings at the
/// parser to check that it never panics and that error context is always
/// consistent with the reported position.
///
/// Strategies generate:
/// - Names with 1-3 dotted segments (including non-ASCII letters)
/// - Values: empty, plain, with whitespace, quotes, backslashes, unicode
/// - Separators with random whitespace runs on both sides
use listfilter::{Parser, Separator};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Clause {
    parts: Vec<String>,
    op: &'static str,
    value: String,
}

// ============================================================================
// Strategies
// ============================================================================

fn arb_segment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z][a-zA-Z0-9_]{0,8}",
        1 => "[äöüéßλж][a-zäöü0-9_]{0,4}",
    ]
}

fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z0-9_.:=-]{1,12}",
        "[a-z ]{1,12}",
        "[a-z\"\\\\ ]{1,12}",
        "[a-z\t\n\\\\]{1,8}",
        Just("AND".to_string()),
        Just("\"quoted\"".to_string()),
        Just("caf\u{00e9} \u{4f60}\u{597d}".to_string()),
    ]
}

fn arb_clause() -> impl Strategy<Value = Clause> {
    (
        prop::collection::vec(arb_segment(), 1..=3),
        prop_oneof![Just("="), Just("!=")],
        arb_value(),
    )
        .prop_map(|(parts, op, value)| Clause { parts, op, value })
}

fn arb_separator() -> impl Strategy<Value = Separator> {
    prop_oneof![Just(Separator::And), Just(Separator::Or)]
}

fn arb_whitespace() -> impl Strategy<Value = String> {
    "[ \t\n]{1,3}"
}

/// A list of clauses plus the separator (and surrounding whitespace) that
/// follows each one except the last.
fn arb_filter() -> impl Strategy<Value = (Vec<Clause>, Vec<(String, Separator, String)>)> {
    prop::collection::vec(arb_clause(), 1..6).prop_flat_map(|clauses| {
        let n = clauses.len() - 1;
        (
            Just(clauses),
            prop::collection::vec((arb_whitespace(), arb_separator(), arb_whitespace()), n),
        )
    })
}

// ============================================================================
// Rendering
// ============================================================================

fn render_value(value: &str) -> String {
    if value.starts_with('"') || value.chars().any(char::is_whitespace) {
        let mut out = String::from("\"");
        for c in value.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
        out
    } else {
        value.to_string()
    }
}

fn render(clauses: &[Clause], separators: &[(String, Separator, String)]) -> String {
    let mut out = String::new();
    for (i, clause) in clauses.iter().enumerate() {
        out.push_str(&clause.parts.join("."));
        out.push_str(clause.op);
        out.push_str(&render_value(&clause.value));
        if let Some((before, separator, after)) = separators.get(i) {
            out.push_str(before);
            out.push_str(separator.as_str());
            out.push_str(after);
        }
    }
    out
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn parse_recovers_every_condition((clauses, separators) in arb_filter()) {
        let input = render(&clauses, &separators);
        let filter = Parser::default().parse(&input).unwrap();

        let parsed: Vec<_> = filter.conditions().collect();
        prop_assert_eq!(parsed.len(), clauses.len());
        for (i, (c, clause)) in parsed.iter().zip(&clauses).enumerate() {
            prop_assert_eq!(c.key_parts(), clause.parts.as_slice());
            prop_assert_eq!(c.key(), clause.parts.join("."));
            prop_assert_eq!(c.op(), clause.op);
            prop_assert_eq!(c.string_value(), clause.value.as_str());
            prop_assert_eq!(c.separator(), separators.get(i).map(|(_, s, _)| *s));
        }
    }

    #[test]
    fn index_and_chain_hold_the_same_conditions((clauses, separators) in arb_filter()) {
        let input = render(&clauses, &separators);
        let filter = Parser::default().parse(&input).unwrap();

        let mut from_index: Vec<usize> = filter.values().map(|c| c.index()).collect();
        from_index.sort_unstable();
        let from_chain: Vec<usize> = filter.conditions().map(|c| c.index()).collect();
        prop_assert_eq!(from_index, from_chain);

        for key in filter.keys() {
            for c in filter.get(key).unwrap() {
                prop_assert_eq!(c.key(), key);
            }
        }
    }

    #[test]
    fn display_roundtrips((clauses, separators) in arb_filter()) {
        let input = render(&clauses, &separators);
        let filter = Parser::default().parse(&input).unwrap();
        let reparsed = Parser::default().parse(&filter.to_string()).unwrap();
        prop_assert_eq!(reparsed, filter);
    }

    #[test]
    fn strict_render_roundtrips((clauses, separators) in arb_filter()) {
        let input = render(&clauses, &separators);
        let filter = Parser::default().parse(&input).unwrap();
        let strict = Parser::builder().reject_operators_in_values().build().unwrap();
        let rendered = strict.render(&filter).to_string();
        prop_assert_eq!(strict.parse(&rendered).unwrap(), filter);
    }

    #[test]
    fn arbitrary_input_never_panics(input in "\\PC{0,40}") {
        let parser = Parser::builder()
            .operators(["=", "!=", "<", "<=", ":"])
            .reject_operators_in_values()
            .build()
            .unwrap();
        if let Err(err) = parser.parse(&input) {
            prop_assert!(input.is_char_boundary(err.position()));
            prop_assert_eq!(&input[err.position()..], err.unparsable());
        }
    }

    #[test]
    fn arbitrary_filter_like_input_reports_consistent_errors(
        input in "[a-z0-9 .=!\"\\\\]{0,30}( (AND|OR|XOR) [a-z0-9 .=!\"\\\\]{0,30}){0,2}"
    ) {
        match Parser::default().parse(&input) {
            Ok(filter) => {
                prop_assert_eq!(filter.is_empty(), input.is_empty());
            }
            Err(err) => {
                prop_assert!(err.position() <= input.len());
                prop_assert_eq!(&input[err.position()..], err.unparsable());
            }
        }
    }
}
