// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! Text escaping for iCalendar TEXT values (RFC 5545 Section 3.3.11).

/// Escapes a TEXT value for serialization.
///
/// Substitutions run in a fixed order, backslash first, so that characters
/// introduced by later substitutions are not escaped twice:
/// `\` -> `\\`, `;` -> `\;`, `,` -> `\,`, newline -> `\n`.
#[must_use]
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Reverses [`escape_text`], applying the four substitutions in inverse order.
#[must_use]
pub fn unescape_text(text: &str) -> String {
    text.replace("\\n", "\n")
        .replace("\\N", "\n")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\\\", "\\")
}
