//! Properties of the wait/intercept and callback transformers

use cy2pw_pattern::{extract, Family, PatternKind};
use cy2pw_symbol::FileScope;
use cy2pw_transform::{
    splice, CallbackTransformer, CustomCommandHandler, DefaultCommandHandler, Replacement,
    WaitInterceptTransformer, MANUAL_REVIEW,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn alias_waits_match_the_bound_url(
        alias in "[a-z][a-zA-Z0-9]{0,10}",
        path in "/[a-z]{1,8}(/[a-z]{1,8}){0,2}",
        wait_first in any::<bool>(),
    ) {
        let intercept = format!("cy.intercept('GET', '{path}').as('{alias}');");
        let wait = format!("cy.wait('@{alias}');");
        let source = if wait_first {
            format!("{wait}\n{intercept}")
        } else {
            format!("{intercept}\n{wait}")
        };

        let mut scope = FileScope::new(&source);
        let transformer = WaitInterceptTransformer::default();
        let patterns = extract(&source, Family::WaitIntercept);
        let wait = patterns.iter().find(|p| p.kind() == PatternKind::Wait).unwrap();
        let unit = transformer.transform(wait, &mut scope);

        let expected = format!("response.url().includes('{path}')");
        prop_assert!(unit.rewritten_text().contains(&expected));
        prop_assert!(unit.conversion_succeeded());
    }

    #[test]
    fn unresolved_aliases_stay_balanced(alias in "[a-z][a-zA-Z0-9_]{0,10}") {
        let source = format!("cy.wait('@{alias}').then((interception) => {{\n  expect(interception.response.body).to.exist;\n}});");
        let mut scope = FileScope::new(&source);
        let pattern = &extract(&source, Family::WaitIntercept)[0];
        let unit = WaitInterceptTransformer::default().transform(pattern, &mut scope);
        prop_assert!(unit.is_structurally_valid());
        prop_assert!(unit.requires_manual_review());
    }

    #[test]
    fn unconvertible_callbacks_keep_the_original(selector in "[a-z#.]{1,8}", handler in "[a-z]{1,8}") {
        let source = format!("cy.get('{selector}').then({handler});");
        let mut scope = FileScope::new(&source);
        let pattern = &extract(&source, Family::Callback)[0];
        let unit = CallbackTransformer::default().transform(pattern, &mut scope);
        prop_assert!(!unit.conversion_succeeded());
        prop_assert!(unit.rewritten_text().contains(MANUAL_REVIEW));
        prop_assert!(unit.rewritten_text().contains(&source));
    }
}

#[test]
fn splicing_a_whole_file() {
    let source = "\
describe('users', () => {
  it('lists users', () => {
    cy.intercept('GET', '/api/users', { statusCode: 200, body: [] }).as('users');
    cy.visit('/users');
    cy.wait('@users');
    cy.get('.row').then(($rows) => {
      expect($rows).to.have.length(0);
    });
  });
});";
    let mut scope = FileScope::new(source);
    let mut units = Vec::new();
    for pattern in extract(source, Family::Callback) {
        units.push(CallbackTransformer::default().transform(&pattern, &mut scope));
    }
    for pattern in extract(source, Family::WaitIntercept) {
        units.push(WaitInterceptTransformer::default().transform(&pattern, &mut scope));
    }
    let handler = DefaultCommandHandler::default();
    for pattern in extract(source, Family::CustomCommand) {
        units.push(handler.convert_custom_command(&pattern, &mut scope));
    }
    let replacements: Vec<Replacement> = units.iter().map(Replacement::from_unit).collect();
    let output = splice(source, &replacements).unwrap();

    assert_eq!(
        output,
        "\
describe('users', () => {
  it('lists users', () => {
    await page.route('**/api/users', async (route) => {
      if (route.request().method() !== 'GET') return route.fallback();
      await route.fulfill({
        status: 200,
        contentType: 'application/json',
        body: JSON.stringify([]),
      });
    });
    await page.goto('/users');
    await page.waitForResponse((response) => response.url().includes('/api/users') && response.request().method() === 'GET');
    const rows = page.locator('.row');
    await expect(rows).toHaveCount(0);
  });
});"
    );
    assert!(units.iter().all(|u| u.conversion_succeeded()));
}
