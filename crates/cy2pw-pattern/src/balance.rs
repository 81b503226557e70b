//! Raw delimiter balance and malformed-output markers

use serde::Serialize;

/// Textual markers that only appear when a rewrite went wrong
pub const MALFORMED_MARKERS: &[&str] = &[
    "await await",
    "async async",
    "await const",
    "await let",
    "await return",
    "=> =>",
    ";;;",
];

/// Raw counts of each delimiter pair
///
/// Counting is textual; brackets inside strings and comments count too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelimiterBalance {
    /// `(` count
    pub open_paren: usize,
    /// `)` count
    pub close_paren: usize,
    /// `[` count
    pub open_bracket: usize,
    /// `]` count
    pub close_bracket: usize,
    /// `{` count
    pub open_brace: usize,
    /// `}` count
    pub close_brace: usize,
}

impl DelimiterBalance {
    /// Count delimiters in `text`
    #[must_use]
    pub fn of(text: &str) -> Self {
        let mut balance = Self::default();
        for b in text.bytes() {
            match b {
                b'(' => balance.open_paren += 1,
                b')' => balance.close_paren += 1,
                b'[' => balance.open_bracket += 1,
                b']' => balance.close_bracket += 1,
                b'{' => balance.open_brace += 1,
                b'}' => balance.close_brace += 1,
                _ => {}
            }
        }
        balance
    }

    /// Whether every pair has equal open and close counts
    #[inline]
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.open_paren == self.close_paren
            && self.open_bracket == self.close_bracket
            && self.open_brace == self.close_brace
    }

    /// Pairs whose counts differ, as `("()", opens, closes)`
    #[must_use]
    pub fn mismatches(&self) -> Vec<(&'static str, usize, usize)> {
        [
            ("()", self.open_paren, self.close_paren),
            ("[]", self.open_bracket, self.close_bracket),
            ("{}", self.open_brace, self.close_brace),
        ]
        .into_iter()
        .filter(|(_, open, close)| open != close)
        .collect()
    }
}

/// Malformed markers present in `text`, in table order
#[must_use]
pub fn malformed_markers(text: &str) -> Vec<&'static str> {
    MALFORMED_MARKERS
        .iter()
        .copied()
        .filter(|marker| text.contains(marker))
        .collect()
}

/// Balanced and free of malformed markers
#[must_use]
pub fn is_structurally_valid(text: &str) -> bool {
    DelimiterBalance::of(text).is_balanced() && malformed_markers(text).is_empty()
}
