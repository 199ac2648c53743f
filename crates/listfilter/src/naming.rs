//! Best-effort snake_case / camelCase rewriting of name segments.
//!
//! Both functions work on a single segment (no dots) and never fail; they are
//! character mappings, not validators.

use crate::options::NameCase;

/// Apply the configured casing to one name segment.
pub(crate) fn apply(case: NameCase, name: &str) -> String {
    match case {
        NameCase::Unchanged => name.to_string(),
        NameCase::SnakeCase => snake_case(name),
        NameCase::CamelCase => camel_case(name),
    }
}

/// Convert a name to snake_case.
///
/// Each uppercase letter is lower-cased and prefixed with `_`, unless it is
/// the first character, directly follows another uppercase letter, or
/// directly follows an `_`.
///
/// ```
/// use listfilter::naming::snake_case;
///
/// assert_eq!(snake_case("fooBar"), "foo_bar");
/// assert_eq!(snake_case("HTTPStatus"), "httpstatus");
/// assert_eq!(snake_case("mo_O"), "mo_o");
/// ```
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    // Start as if preceded by an underscore so a leading capital gets no prefix.
    let mut after_break = true;
    for c in name.chars() {
        if c.is_uppercase() {
            if !after_break {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            after_break = true;
        } else {
            out.push(c);
            after_break = c == '_';
        }
    }
    out
}

/// Convert a name to camelCase.
///
/// Every `_` is dropped and the character after it upper-cased. Uppercase
/// runs elsewhere are lowered after their first letter, and the first
/// character is always lowered.
///
/// ```
/// use listfilter::naming::camel_case;
///
/// assert_eq!(camel_case("foo_bar"), "fooBar");
/// assert_eq!(camel_case("Bla_vla"), "blaVla");
/// assert_eq!(camel_case("fooBAR"), "fooBar");
/// ```
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut after_underscore = false;
    // Whether the previous emitted letter was uppercase; true at the start so
    // the first character is lowered.
    let mut after_upper = true;
    for c in name.chars() {
        if c == '_' {
            after_underscore = true;
            after_upper = false;
            continue;
        }
        if after_underscore {
            out.extend(c.to_uppercase());
            after_underscore = false;
            after_upper = true;
            continue;
        }
        if after_upper {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        after_upper = c.is_uppercase();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_is_identity() {
        assert_eq!(apply(NameCase::Unchanged, "fooBar_baz"), "fooBar_baz");
    }

    #[test]
    fn snake_case_leading_capital_gets_no_underscore() {
        assert_eq!(snake_case("FooBar"), "foo_bar");
    }

    #[test]
    fn snake_case_keeps_existing_underscores() {
        assert_eq!(snake_case("foo_Bar"), "foo_bar");
        assert_eq!(snake_case("bla_vla"), "bla_vla");
    }

    #[test]
    fn snake_case_handles_non_ascii_capitals() {
        assert_eq!(snake_case("caféÉclair"), "café_éclair");
    }

    #[test]
    fn camel_case_lowers_first_character() {
        assert_eq!(camel_case("Foo"), "foo");
        assert_eq!(camel_case("FOO"), "foo");
    }

    #[test]
    fn camel_case_trailing_underscore_is_dropped() {
        assert_eq!(camel_case("foo_"), "foo");
    }

    #[test]
    fn camel_case_digits_after_underscore() {
        assert_eq!(camel_case("page_2_size"), "page2Size");
    }
}
