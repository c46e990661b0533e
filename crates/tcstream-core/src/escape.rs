//! Escaping rules for TeamCity service-message values.
//!
//! Reserved characters are written as a two-character sequence starting with
//! `|`:
//!
//! | raw  | escaped |
//! |------|---------|
//! | `\|` | `\|\|`  |
//! | `'`  | `\|'`   |
//! | `\n` | `\|n`   |
//! | `\r` | `\|r`   |
//! | `]`  | `\|]`   |
//! | `[`  | `\|[`   |

use serde_json::Value;

/// Stand-in for an escaped single quote while a payload is split with shell rules.
pub const SINGLE_QUOTE_PLACEHOLDER: &str = "%%%SINGLE_QUOTE%%%";

const ESCAPE_CHAR: char = '|';

/// Escape every reserved character in `value`.
///
/// The pipe is handled like any other reserved character in a single pass,
/// so sequences introduced by escaping are never escaped again.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());

    for c in value.chars() {
        match escaped_form(c) {
            Some(code) => {
                out.push(ESCAPE_CHAR);
                out.push(code);
            }
            None => out.push(c),
        }
    }

    out
}

/// Reverse [`escape`].
///
/// Unknown sequences and a dangling trailing `|` are kept verbatim.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != ESCAPE_CHAR {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some(code) => match raw_form(code) {
                Some(raw) => out.push(raw),
                None => {
                    out.push(ESCAPE_CHAR);
                    out.push(code);
                }
            },
            None => out.push(ESCAPE_CHAR),
        }
    }

    out
}

/// Escape a JSON value; anything but a string passes through unchanged.
pub fn escape_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape(&s)),
        other => other,
    }
}

/// Unescape a JSON value; anything but a string passes through unchanged.
pub fn unescape_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(unescape(&s)),
        other => other,
    }
}

/// Hide escaped single quotes (`|'`) behind [`SINGLE_QUOTE_PLACEHOLDER`].
///
/// A payload treated this way can be split with shell quoting rules while
/// its values stay wrapped in single quotes. Other escape sequences,
/// including `||`, are left for [`unescape`].
pub fn escape_single_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != ESCAPE_CHAR {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('\'') => out.push_str(SINGLE_QUOTE_PLACEHOLDER),
            Some(code) => {
                out.push(ESCAPE_CHAR);
                out.push(code);
            }
            None => out.push(ESCAPE_CHAR),
        }
    }

    out
}

/// Turn every [`SINGLE_QUOTE_PLACEHOLDER`] back into a bare `'`.
pub fn unescape_single_quote(value: &str) -> String {
    value.replace(SINGLE_QUOTE_PLACEHOLDER, "'")
}

fn escaped_form(c: char) -> Option<char> {
    match c {
        '|' => Some('|'),
        '\'' => Some('\''),
        '\n' => Some('n'),
        '\r' => Some('r'),
        ']' => Some(']'),
        '[' => Some('['),
        _ => None,
    }
}

fn raw_form(code: char) -> Option<char> {
    match code {
        '|' => Some('|'),
        '\'' => Some('\''),
        'n' => Some('\n'),
        'r' => Some('\r'),
        ']' => Some(']'),
        '[' => Some('['),
        _ => None,
    }
}
