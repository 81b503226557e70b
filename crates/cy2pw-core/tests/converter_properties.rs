//! Properties of file-level conversion

use cy2pw_core::{ComplexPatternConverter, ConvertConfig};
use cy2pw_pattern::{extract, DelimiterBalance, Family};
use cy2pw_test_utils::{
    assert_awaited, assert_no_cypress, CHAINED_CALLBACKS, INTERCEPT_AND_WAIT, LOGIN_SPEC,
    SIMPLE_CALLBACK, UNRESOLVED_ALIAS,
};
use proptest::prelude::*;
use pretty_assertions::assert_eq;

fn converter() -> ComplexPatternConverter {
    ComplexPatternConverter::new(ConvertConfig::default().with_syntax_check(false))
}

proptest! {
    #[test]
    fn simple_callbacks_leave_no_cypress(
        selector in "[a-z][a-z0-9-]{0,8}",
        prefix in prop::sample::select(vec!["#", ".", ""]),
        assertion in prop::sample::select(vec!["be.visible", "exist", "be.checked", "be.disabled"]),
    ) {
        let source = format!("cy.get('{prefix}{selector}').then(($el) => {{\n  expect($el).to.{assertion};\n}});\n");
        let result = converter().convert(&source, "gen.cy.ts");
        assert_no_cypress(&result.converted_code);
        assert_awaited(&result.converted_code, "page");
        prop_assert!(result.conversion_succeeded);
    }

    #[test]
    fn valid_results_balance(path in "/[a-z]{1,6}", alias in "[a-z]{1,6}", ms in 1u32..5000) {
        let source = format!(
            "it('x', () => {{\n  cy.intercept('{path}').as('{alias}');\n  cy.wait({ms});\n  cy.wait('@{alias}').then((i) => {{\n    expect(i.response.body).to.exist;\n  }});\n}});\n"
        );
        let result = converter().convert(&source, "gen.cy.ts");
        if result.is_valid {
            prop_assert!(DelimiterBalance::of(&result.converted_code).is_balanced());
        }
    }

    #[test]
    fn arbitrary_text_never_escapes_convert(
        before in "\\PC{0,40}",
        after in "\\PC{0,40}",
    ) {
        let source = format!("{before}\ncy.visit('/');\n{after}");
        let result = converter().convert(&source, "noise.cy.ts");
        if result.error.is_some() {
            prop_assert!(!result.conversion_succeeded);
            prop_assert_eq!(&result.converted_code, &source);
        }
    }
}

#[test]
fn non_ascii_identifiers_convert() {
    let result = converter().convert("const x = 名前\ncy.visit('/');\n", "名前.cy.ts");
    assert_eq!(result.error, None);
    assert!(result.converted_code.ends_with("const x = 名前\nawait page.goto('/');\n"));

    let result = converter().convert("it('ログイン', () => cy.get('#ß').click());\n", "a.cy.ts");
    assert_eq!(result.error, None);
    assert!(result.converted_code.contains("await page.locator('#ß').click();"));
}

#[test]
fn converting_converted_output_changes_nothing() {
    let converter = converter();
    for source in [LOGIN_SPEC, INTERCEPT_AND_WAIT, SIMPLE_CALLBACK, CHAINED_CALLBACKS] {
        let once = converter.convert(source, "a.cy.ts");
        assert!(extract(&once.converted_code, Family::Callback).is_empty());
        assert!(extract(&once.converted_code, Family::WaitIntercept).is_empty());

        let twice = converter.convert(&once.converted_code, "a.cy.ts");
        assert_eq!(twice.summary.total_patterns, 0);
        assert_eq!(twice.converted_code, once.converted_code);
    }
}

#[test]
fn aliases_do_not_leak_between_files() {
    let converter = converter();
    let first = converter.convert("cy.intercept('/api/users').as('users');\ncy.wait('@users');\n", "a.cy.ts");
    assert!(first.notes.iter().all(|n| !n.starts_with("Unresolved aliases")));

    let second = converter.convert("cy.wait('@users');\n", "b.cy.ts");
    assert!(second.notes.iter().any(|n| n == "Unresolved aliases: @users"));
    assert!(second.detailed_results[0].requires_manual_review());
}

#[test]
fn fixtures_cover_every_family() {
    let result = converter().convert(UNRESOLVED_ALIAS, "a.cy.ts");
    assert!(result.is_valid);
    let login = converter().convert(LOGIN_SPEC, "login.cy.ts");
    assert!(login.summary.by_kind.len() >= 3);
}

#[test]
fn converter_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ComplexPatternConverter>();

    let converter = converter();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let converter = &converter;
                s.spawn(move || converter.convert(&format!("cy.visit('/{i}');\n"), "t.cy.ts"))
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.join().unwrap();
            assert!(result.converted_code.contains(&format!("await page.goto('/{i}');")));
        }
    });
}
