// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! Physical line handling: unfolding on input, folding on output, and
//! splitting a content line into name, parameters, and value.

/// Maximum length of a physical line before folding (RFC 5545 Section 3.1).
const FOLD_AT: usize = 75;

/// Content characters per continuation line, after the leading space.
const FOLD_CONTINUATION: usize = 74;

/// Removes line folding so each logical property occupies a single line.
///
/// Accepts CRLF or bare LF line breaks; a break followed immediately by a
/// single space or tab is a fold marker and is removed entirely.
#[must_use]
pub fn unfold(text: &str) -> String {
    text.replace("\r\n ", "")
        .replace("\r\n\t", "")
        .replace("\n ", "")
        .replace("\n\t", "")
}

/// Folds a logical line into physical lines joined with CRLF.
///
/// Lines of 75 characters or fewer pass through unchanged. Longer lines keep
/// the first 75 characters as-is; every continuation carries one leading space
/// and at most 74 further characters.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.chars().count() <= FOLD_AT {
        return line.to_string();
    }

    let mut chars = line.chars();
    let mut folded: String = chars.by_ref().take(FOLD_AT).collect();
    loop {
        let chunk: String = chars.by_ref().take(FOLD_CONTINUATION).collect();
        if chunk.is_empty() {
            break;
        }
        folded.push_str("\r\n ");
        folded.push_str(&chunk);
    }
    folded
}

/// A logical content line split into its name, raw parameter string, and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLine<'a> {
    /// Property name, the substring before the first `;` or `:`.
    pub name: &'a str,

    /// Raw parameter string between the name and the value separator,
    /// empty when the property carries no parameters.
    pub params: &'a str,

    /// Property value, everything after the first `:`.
    pub value: &'a str,
}

impl<'a> ContentLine<'a> {
    /// Splits a logical line. Returns `None` when no `:` separator is found;
    /// such lines are malformed and callers skip them.
    #[must_use]
    pub fn split(line: &'a str) -> Option<Self> {
        let (head, value) = line.split_once(':')?;
        let (name, params) = match head.split_once(';') {
            Some((name, params)) => (name, params),
            None => (head, ""),
        };
        Some(Self {
            name,
            params,
            value,
        })
    }

    /// Whether the parameter string carries the literal `VALUE=DATE` marker.
    #[must_use]
    pub fn is_date_value(&self) -> bool {
        self.params.contains("VALUE=DATE")
    }

    /// The `TZID` parameter value, if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&'a str> {
        let rest = self
            .params
            .split(';')
            .find_map(|p| p.strip_prefix("TZID="))?;
        Some(rest)
    }
}
