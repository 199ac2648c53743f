//! A single `key operator value` clause and its link to the next clause.
//!
//! Conditions are stored in an arena owned by [`Filter`]; the successor is an
//! index into that arena tagged with the separator that joined the two. Walking
//! the chain goes through [`ConditionRef`], a borrowed handle that knows which
//! filter it belongs to.

use crate::error::ValueError;
use crate::filter::Filter;
use crate::options::DEFAULT_OPERATORS;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// Character joining the segments of a full name.
pub const NAME_SEPARATOR: char = '.';

/// The token joining two conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Separator {
    And,
    Or,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::And => "AND",
            Separator::Or => "OR",
        }
    }

    pub(crate) fn from_token(token: &str) -> Option<Self> {
        match token {
            "AND" => Some(Separator::And),
            "OR" => Some(Separator::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successor of a condition within its filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) separator: Separator,
    pub(crate) index: usize,
}

/// One parsed clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    key: String,
    key_parts: Vec<String>,
    op: String,
    value: String,
    pub(crate) next: Option<Link>,
}

impl Condition {
    /// Build a free-standing condition from its name segments. The key is the
    /// segments joined with `.`; segments are taken as given.
    ///
    /// ```
    /// use listfilter::Condition;
    ///
    /// let c = Condition::new(["foo", "bar"], "=", "bla");
    /// assert_eq!(c.key(), "foo.bar");
    /// assert_eq!(c.key_parts(), ["foo", "bar"]);
    /// ```
    pub fn new<I, S>(key_parts: I, op: impl Into<String>, value: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_parts(
            key_parts.into_iter().map(Into::into).collect(),
            op.into(),
            value.into(),
        )
    }

    pub(crate) fn from_parts(key_parts: Vec<String>, op: String, value: String) -> Self {
        let key = key_parts.join(&NAME_SEPARATOR.to_string());
        Self {
            key,
            key_parts,
            op,
            value,
            next: None,
        }
    }

    /// The full dotted name, e.g. `"foo.bar"`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The name segments. Never empty for parsed conditions.
    pub fn key_parts(&self) -> &[String] {
        &self.key_parts
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    /// The raw value, unquoted and unescaped. May be empty.
    pub fn string_value(&self) -> &str {
        &self.value
    }

    pub fn int_value(&self) -> Result<i64, ValueError> {
        self.value
            .parse()
            .map_err(|_| ValueError::NotAnInteger(self.value.clone()))
    }

    /// Strict boolean: `true` or `false`, case-insensitive.
    pub fn bool_value(&self) -> Result<bool, ValueError> {
        if self.value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if self.value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ValueError::NotABoolean(self.value.clone()))
        }
    }

    /// Decimal or hexadecimal (`0x1.8p3`) floating point.
    pub fn float_value(&self) -> Result<f64, ValueError> {
        self.value
            .parse()
            .ok()
            .or_else(|| parse_hex_float(&self.value))
            .ok_or_else(|| ValueError::NotAFloat(self.value.clone()))
    }

    /// The separator joining this condition to its successor, if any.
    pub fn separator(&self) -> Option<Separator> {
        self.next.map(|link| link.separator)
    }
}

/// `[+-]0x<hex>[.<hex>]p[+-]<exp>`; the binary exponent is mandatory.
fn parse_hex_float(s: &str) -> Option<f64> {
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    let (mantissa, exponent) = s.split_once(['p', 'P'])?;
    let mut exp: i32 = exponent.parse().ok()?;
    let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    // Keep 60 significant bits; digits past that only move the exponent.
    let mut bits: u64 = 0;
    for c in int_digits.chars() {
        let digit = u64::from(c.to_digit(16)?);
        if bits < 1 << 60 {
            bits = bits * 16 + digit;
        } else {
            exp = exp.saturating_add(4);
        }
    }
    for c in frac_digits.chars() {
        let digit = u64::from(c.to_digit(16)?);
        if bits < 1 << 60 {
            bits = bits * 16 + digit;
            exp = exp.saturating_sub(4);
        }
    }

    let magnitude = bits as f64 * 2f64.powi(exp);
    Some(if negative { -magnitude } else { magnitude })
}

/// A value is quoted on output when a bare rendering would not parse back to
/// the same string with the given operators.
pub(crate) fn needs_quotes<'a>(
    value: &str,
    operators: impl IntoIterator<Item = &'a str>,
) -> bool {
    value.starts_with('"')
        || value.chars().any(char::is_whitespace)
        || operators.into_iter().any(|op| value.contains(op))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

impl Condition {
    pub(crate) fn write_with(&self, f: &mut fmt::Formatter<'_>, quote: bool) -> fmt::Result {
        write!(f, "{}{}", self.key, self.op)?;
        if quote {
            write_quoted(f, &self.value)
        } else {
            f.write_str(&self.value)
        }
    }
}

impl fmt::Display for Condition {
    /// Renders the clause in filter syntax. Quoting assumes the default
    /// operator set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, needs_quotes(&self.value, DEFAULT_OPERATORS))
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Condition", 5)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("keyParts", &self.key_parts)?;
        state.serialize_field("op", &self.op)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("next", &self.separator())?;
        state.end()
    }
}

/// A condition borrowed from its [`Filter`], able to follow AND/OR links.
///
/// Dereferences to [`Condition`], so all accessors are available directly.
#[derive(Clone, Copy)]
pub struct ConditionRef<'f> {
    filter: &'f Filter,
    index: usize,
}

impl<'f> ConditionRef<'f> {
    pub(crate) fn new(filter: &'f Filter, index: usize) -> Self {
        Self { filter, index }
    }

    /// The underlying record, with the filter's lifetime.
    pub fn condition(&self) -> &'f Condition {
        self.filter.condition_at(self.index)
    }

    /// Position of this condition in parse order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The successor and the separator that joins it.
    pub fn next(&self) -> Option<(Separator, ConditionRef<'f>)> {
        self.condition()
            .next
            .map(|link| (link.separator, ConditionRef::new(self.filter, link.index)))
    }

    /// The next condition if it is joined by `AND`.
    pub fn and(&self) -> Option<ConditionRef<'f>> {
        match self.next() {
            Some((Separator::And, next)) => Some(next),
            _ => None,
        }
    }

    /// The next condition if it is joined by `OR`.
    pub fn or(&self) -> Option<ConditionRef<'f>> {
        match self.next() {
            Some((Separator::Or, next)) => Some(next),
            _ => None,
        }
    }

    /// `(and(), or())`; at most one side is present.
    pub fn and_or(&self) -> (Option<ConditionRef<'f>>, Option<ConditionRef<'f>>) {
        (self.and(), self.or())
    }
}

impl Deref for ConditionRef<'_> {
    type Target = Condition;

    fn deref(&self) -> &Condition {
        self.condition()
    }
}

impl PartialEq for ConditionRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.filter, other.filter) && self.index == other.index
    }
}

impl Eq for ConditionRef<'_> {}

impl fmt::Debug for ConditionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionRef")
            .field("index", &self.index)
            .field("condition", self.condition())
            .finish()
    }
}

impl fmt::Display for ConditionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.condition(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(value: &str) -> Condition {
        Condition::new(["foo"], "=", value)
    }

    #[test]
    fn new_joins_parts_into_key() {
        let c = Condition::new(["foo", "bar", "bla"], "=", "vla");
        assert_eq!(c.key(), "foo.bar.bla");
        assert_eq!(c.key_parts(), ["foo", "bar", "bla"]);
    }

    #[test]
    fn new_keeps_dotted_segment_whole() {
        let c = Condition::new(["a.b"], "=", "x");
        assert_eq!(c.key(), "a.b");
        assert_eq!(c.key_parts(), ["a.b"]);
    }

    #[test]
    fn from_parts_joins_with_dots() {
        let c = Condition::from_parts(vec!["a".into(), "b".into()], "!=".into(), "x".into());
        assert_eq!(c.key(), "a.b");
        assert_eq!(c.op(), "!=");
    }

    #[test]
    fn display_bare_value() {
        assert_eq!(cond("bar").to_string(), "foo=bar");
        assert_eq!(cond("").to_string(), "foo=");
    }

    #[test]
    fn display_quotes_values_with_whitespace() {
        assert_eq!(cond("say \"hi\"").to_string(), r#"foo="say \"hi\"""#);
    }

    #[test]
    fn display_quotes_values_starting_with_quote() {
        assert_eq!(cond("\"x").to_string(), r#"foo="\"x""#);
    }

    #[test]
    fn display_keeps_backslashes_in_bare_values() {
        assert_eq!(cond(r"a\b").to_string(), r"foo=a\b");
    }

    #[test]
    fn display_quotes_values_with_default_operators() {
        assert_eq!(cond("x=y").to_string(), r#"foo="x=y""#);
        assert_eq!(cond("a!=b").to_string(), r#"foo="a!=b""#);
        assert_eq!(cond("x!").to_string(), "foo=x!");
    }

    #[test]
    fn needs_quotes_checks_given_operators() {
        assert!(needs_quotes("p<q", ["<"]));
        assert!(!needs_quotes("p<q", DEFAULT_OPERATORS));
        assert!(needs_quotes("seq", ["eq"]));
    }

    #[test]
    fn hex_floats() {
        assert_eq!(parse_hex_float("0x1p-2"), Some(0.25));
        assert_eq!(parse_hex_float("-0X1.8p1"), Some(-3.0));
        assert_eq!(parse_hex_float("0x.8p0"), Some(0.5));
        assert_eq!(parse_hex_float("0xAp+0"), Some(10.0));
        assert_eq!(parse_hex_float("0x1"), None);
        assert_eq!(parse_hex_float("0xp1"), None);
        assert_eq!(parse_hex_float("0x1g"), None);
        assert_eq!(parse_hex_float("1p1"), None);
    }

    #[test]
    fn separator_tokens() {
        assert_eq!(Separator::from_token("AND"), Some(Separator::And));
        assert_eq!(Separator::from_token("OR"), Some(Separator::Or));
        assert_eq!(Separator::from_token("and"), None);
        assert_eq!(Separator::Or.to_string(), "OR");
    }

    #[test]
    fn free_condition_has_no_successor() {
        assert_eq!(cond("x").separator(), None);
    }
}
