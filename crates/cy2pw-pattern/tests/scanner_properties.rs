//! Property tests for the delimiter-aware scanner

use cy2pw_pattern::balance::DelimiterBalance;
use cy2pw_pattern::scan::{find_matching_close, replace_identifier, split_top_level};
use cy2pw_pattern::{extract_all, Pattern};
use proptest::prelude::*;

/// Balanced bracket expressions over a small alphabet
fn balanced() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("a".to_string()),
        Just("1".to_string()),
        Just("'x'".to_string()),
        Just("b, c".to_string()),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| format!("({s})")),
            inner.clone().prop_map(|s| format!("[{s}]")),
            inner.clone().prop_map(|s| format!("{{ {s} }}")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{a}, {b}")),
        ]
    })
}

proptest! {
    #[test]
    fn wrapped_balanced_text_closes_at_end(inner in balanced()) {
        let text = format!("({inner})");
        prop_assert_eq!(find_matching_close(&text, 0), Some(text.len() - 1));
        prop_assert!(DelimiterBalance::of(&text).is_balanced());
    }

    #[test]
    fn truncated_text_never_closes(inner in balanced()) {
        let text = format!("({inner}");
        prop_assert_eq!(find_matching_close(&text, 0), None);
    }

    #[test]
    fn split_pieces_are_balanced(inner in balanced()) {
        for piece in split_top_level(&inner, b',') {
            prop_assert!(DelimiterBalance::of(piece).is_balanced());
        }
    }

    #[test]
    fn replacing_absent_identifier_is_identity(text in "[a-z (){};,.']{0,40}") {
        prop_assert_eq!(replace_identifier(&text, "zzz_absent", "y"), text);
    }

    #[test]
    fn extracted_spans_match_raw_text(selector in "[a-z#.]{1,8}", wait in 1u32..5000) {
        let source = format!(
            "it('t', () => {{\n  cy.get('{selector}').click();\n  cy.wait({wait});\n}});\n"
        );
        let patterns = extract_all(&source);
        prop_assert_eq!(patterns.len(), 2);
        for pattern in &patterns {
            prop_assert_eq!(&source[pattern.span()], pattern.raw_text());
        }
        prop_assert!(patterns.iter().all(|p: &Pattern| p.raw_text().ends_with(';')));
    }
}
