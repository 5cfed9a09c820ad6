//! Legacy pattern dialect
//!
//! Connector filters are written in an old grep-like dialect. `translate`
//! rewrites them into the syntax of the `regex` crate:
//!
//! - a pattern made of a single `.` means "any non-empty text"
//! - `(`, `)`, `|`, `{` and `}` are literals
//! - inside `[...]` a backslash is a literal backslash
//! - outside a range, `\<` and `\>` are word boundaries, a backslash before
//!   one of `^$.*+?[]\` keeps escaping it, and any other `\x` is just `x`

use regex::{Regex, RegexBuilder};

use hs_error::{Result, SentryError};

/// Characters whose backslash escape is kept as is outside of a range
const ESCAPABLE: &str = "^$.*+?[]\\";

/// Translate a legacy pattern into a regular expression.
///
/// An empty input gives an empty string, which callers treat as "no filter".
pub fn translate(pattern: &str) -> String {
    if pattern.is_empty() {
        return String::new();
    }
    if pattern == "." {
        return ".+".to_string();
    }

    let chars: Vec<char> = pattern.chars().collect();
    let mut regex = String::with_capacity(pattern.len() + 8);
    let mut in_range = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if i + 1 < chars.len() => {
                if in_range {
                    // The next character is handled on its own
                    regex.push_str("\\\\");
                } else {
                    let next = chars[i + 1];
                    match next {
                        '<' | '>' => regex.push_str("\\b"),
                        n if ESCAPABLE.contains(n) => {
                            regex.push('\\');
                            regex.push(n);
                        }
                        n => regex.push(n),
                    }
                    i += 1;
                }
            }
            // Dangling backslash
            '\\' => regex.push_str("\\\\"),
            '(' | ')' | '|' | '{' | '}' => {
                regex.push('\\');
                regex.push(c);
            }
            '[' => {
                in_range = true;
                regex.push(c);
            }
            ']' => {
                in_range = false;
                regex.push(c);
            }
            _ => regex.push(c),
        }
        i += 1;
    }

    regex
}

/// Translate and compile a legacy pattern, case-insensitively.
///
/// Returns `None` for an empty pattern.
pub fn compile(pattern: &str) -> Result<Option<Regex>> {
    let translated = translate(pattern);
    if translated.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&translated)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| SentryError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
