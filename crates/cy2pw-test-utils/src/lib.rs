//! Testing utilities for the cy2pw workspace
//!
//! Shared Cypress fixture sources and assertions on converted output.

#![allow(missing_docs)]

use cy2pw_pattern::chain::anchors;
use cy2pw_pattern::scan::RegionMap;
use cy2pw_pattern::{malformed_markers, DelimiterBalance};

/// Interception with an inline response, awaited with a status check
pub const INTERCEPT_AND_WAIT: &str = "cy.intercept('GET','/api/users',{statusCode:200,body:{ok:true}}).as('getUsers'); cy.wait('@getUsers').then(interception => { expect(interception.response.statusCode).to.equal(200); });";

/// Flat callback on a locator
pub const SIMPLE_CALLBACK: &str = "cy.get('#submit').then($el => { expect($el).to.be.visible; })";

/// Two callbacks chained on one base command
pub const CHAINED_CALLBACKS: &str =
    "cy.get('.item').then(($a) => { expect($a).to.exist; }).then(($b) => { expect($b).to.be.visible; });";

/// Wait on an alias no interception declares
pub const UNRESOLVED_ALIAS: &str = "cy.visit('/');\ncy.wait('@missing');\n";

/// A complete spec file touching every pattern family
pub const LOGIN_SPEC: &str = "\
/// <reference types=\"cypress\" />

describe('login', () => {
  beforeEach(() => {
    cy.intercept('POST', '/api/login', { statusCode: 200, body: { token: 'abc' } }).as('login');
    cy.visit('/login');
  });

  it('signs in', () => {
    cy.get('#user').type('ada');
    cy.get('#password').type('secret{enter}');
    cy.wait('@login').its('response.statusCode').should('eq', 200);
    cy.get('.welcome').then(($welcome) => {
      expect($welcome).to.be.visible;
    });
  });
});
";

/// Number of `cy` command chains left in code regions of `code`
#[must_use]
pub fn cypress_calls(code: &str) -> usize {
    anchors(code, &RegionMap::new(code)).len()
}

/// Panic unless no `cy` command chain is left outside comments and strings
pub fn assert_no_cypress(code: &str) {
    assert_eq!(cypress_calls(code), 0, "cypress commands left in:\n{code}");
}

/// Panic unless delimiters balance and no malformed marker is present
pub fn assert_well_formed(code: &str) {
    let balance = DelimiterBalance::of(code);
    assert!(
        balance.is_balanced(),
        "unbalanced delimiters {:?} in:\n{code}",
        balance.mismatches()
    );
    let markers = malformed_markers(code);
    assert!(markers.is_empty(), "malformed markers {markers:?} in:\n{code}");
}

/// Panic when a line of `code` starts an assertion or page call without `await`
pub fn assert_awaited(code: &str, page: &str) {
    for line in code.lines().map(str::trim) {
        if line.starts_with("expect(") || line.starts_with(&format!("{page}.")) {
            panic!("line is not awaited: {line}");
        }
    }
}
