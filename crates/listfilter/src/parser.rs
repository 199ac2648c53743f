//! Recursive-descent parser for filter strings.
//!
//! Grammar:
//!
//! ```text
//! Filter      := "" | Conditions
//! Conditions  := Condition (Separator Condition)*
//! Separator   := Whitespace+ ("AND" | "OR") Whitespace+
//! Condition   := FullName Operator Value
//! FullName    := Name ("." Name)*
//! Name        := Letter (Letter | Digit | "_")*
//! Operator    := first registered operator found while growing the token
//!                one character at a time
//! Value       := QuotedValue | BareValue
//! BareValue   := everything up to the next whitespace or the end; may be empty
//! QuotedValue := '"' (('\' ('"' | '\')) | '\' Any | Any)* '"'
//! ```
//!
//! # Key design decisions
//!
//! - **Byte-offset cursor**: every routine takes the full input and a start
//!   offset and returns the offset just past what it consumed, so errors can
//!   report the exact position and the unparsed remainder.
//! - **Shortest operator wins**: the operator scan stops at the first
//!   registered match. With both `=` and `==` registered, `==` is never
//!   produced; `a==b` parses as `a = "=b"`.
//! - **Lossless escapes**: inside quotes only `\"` and `\\` are escapes. Any
//!   other backslash is kept, so `"\n"` yields the two characters `\` `n`.
//! - **Fail fast**: the first error aborts the parse; no partial filter is
//!   returned.

use crate::condition::{needs_quotes, Condition, Separator, NAME_SEPARATOR};
use crate::error::{ConfigError, ParseError, ParseErrorKind};
use crate::filter::Filter;
use crate::naming;
use crate::options::{NameCase, ParserBuilder, ParserOptions, DEFAULT_OPERATORS};
use std::collections::BTreeSet;
use std::fmt;

const QUOTE: char = '"';
const ESCAPE: char = '\\';

/// Result of one grammar routine: the token and the offset just past it.
type Step<T> = Result<(T, usize), ParseError>;

/// A configured filter parser.
///
/// Parsing is a pure function of the input and the configuration, so a single
/// parser can be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parser {
    operators: BTreeSet<String>,
    /// Byte length of the longest registered operator; bounds the operator scan.
    longest_operator: usize,
    name_case: NameCase,
    reject_operators_in_values: bool,
}

impl Default for Parser {
    /// The default operators (`=`, `!=`), names unchanged.
    fn default() -> Self {
        Self::with_operators(
            DEFAULT_OPERATORS.iter().map(|op| op.to_string()).collect(),
            NameCase::Unchanged,
            false,
        )
    }
}

impl Parser {
    /// Validate `options` and build a parser.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if both casings are requested, if no operator
    /// is registered or if an operator is the empty string.
    pub fn new(options: &ParserOptions) -> Result<Self, ConfigError> {
        let name_case = options.name_case()?;
        if options.operators.is_empty() {
            return Err(ConfigError::NoOperators);
        }
        if options.operators.iter().any(String::is_empty) {
            return Err(ConfigError::EmptyOperator);
        }
        let parser = Self::with_operators(
            options.operators.iter().cloned().collect(),
            name_case,
            options.reject_operators_in_values,
        );
        tracing::debug!(
            operators = ?parser.operators,
            name_case = ?parser.name_case,
            reject_operators_in_values = parser.reject_operators_in_values,
            "filter parser configured"
        );
        Ok(parser)
    }

    fn with_operators(
        operators: BTreeSet<String>,
        name_case: NameCase,
        reject_operators_in_values: bool,
    ) -> Self {
        let longest_operator = operators.iter().map(String::len).max().unwrap_or(0);
        Self {
            operators,
            longest_operator,
            name_case,
            reject_operators_in_values,
        }
    }

    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }

    /// Registered operators, in lexicographic order.
    pub fn operators(&self) -> impl Iterator<Item = &str> + '_ {
        self.operators.iter().map(String::as_str)
    }

    pub fn name_case(&self) -> NameCase {
        self.name_case
    }

    /// Re-emit `filter` so that this parser reads it back unchanged.
    ///
    /// Works like the filter's `Display`, but quotes every value that
    /// contains one of this parser's operators, which a parser built with
    /// `reject_operators_in_values` needs.
    ///
    /// ```
    /// use listfilter::Parser;
    ///
    /// let parser = Parser::builder()
    ///     .operators(["=", "<"])
    ///     .reject_operators_in_values()
    ///     .build()
    ///     .unwrap();
    /// let filter = parser.parse(r#"range="a<b""#).unwrap();
    /// let rendered = parser.render(&filter).to_string();
    /// assert_eq!(rendered, r#"range="a<b""#);
    /// assert_eq!(parser.parse(&rendered).unwrap(), filter);
    /// ```
    pub fn render<'a>(&'a self, filter: &'a Filter) -> Rendered<'a> {
        Rendered {
            parser: self,
            filter,
        }
    }

    /// Parse a filter string.
    ///
    /// The empty string yields an empty [`Filter`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered.
    pub fn parse(&self, input: &str) -> Result<Filter, ParseError> {
        if input.is_empty() {
            return Ok(Filter::default());
        }
        match self.parse_conditions(input) {
            Ok(filter) => {
                tracing::debug!(
                    conditions = filter.condition_count(),
                    keys = filter.len(),
                    "parsed filter"
                );
                Ok(filter)
            }
            Err(err) => {
                tracing::debug!(
                    kind = %err.kind(),
                    position = err.position(),
                    unparsable = err.unparsable(),
                    "filter parse failed"
                );
                Err(err)
            }
        }
    }

    /// `Condition (Separator Condition)*` up to the end of the input.
    fn parse_conditions(&self, input: &str) -> Result<Filter, ParseError> {
        let mut filter = Filter::default();
        let mut separator = None;
        let mut i = 0;
        loop {
            let (condition, next) = self.parse_condition(input, i)?;
            tracing::trace!(
                key = condition.key(),
                op = condition.op(),
                separator = separator.map(Separator::as_str),
                "parsed condition"
            );
            filter.push(condition, separator);
            if next == input.len() {
                return Ok(filter);
            }
            let (joined_by, next) = parse_separator(input, next)?;
            separator = Some(joined_by);
            i = next;
        }
    }

    fn parse_condition(&self, input: &str, start: usize) -> Step<Condition> {
        let (key_parts, i) = self.parse_name_parts(input, start)?;
        let (op, i) = self.parse_operator(input, i)?;
        let (value, i) = self.parse_value(input, i)?;
        Ok((Condition::from_parts(key_parts, op.to_string(), value), i))
    }

    /// `Name ("." Name)*`; each segment is validated and re-cased on its own.
    fn parse_name_parts(&self, input: &str, start: usize) -> Step<Vec<String>> {
        let (part, mut i) = self.parse_name(input, start)?;
        let mut parts = vec![part];
        while input[i..].starts_with(NAME_SEPARATOR) {
            let (part, next) = self.parse_name(input, i + NAME_SEPARATOR.len_utf8())?;
            parts.push(part);
            i = next;
        }
        Ok((parts, i))
    }

    fn parse_name(&self, input: &str, start: usize) -> Step<String> {
        let mut chars = input[start..].char_indices();
        match chars.next() {
            None => return Err(ParseError::at(ParseErrorKind::UnexpectedEnd, input, start)),
            Some((_, c)) if !c.is_alphabetic() => {
                return Err(ParseError::at(
                    ParseErrorKind::NameMustStartWithLetter,
                    input,
                    start,
                ))
            }
            Some(_) => {}
        }
        let end = chars
            .find(|&(_, c)| !is_name_char(c))
            .map_or(input.len(), |(offset, _)| start + offset);
        Ok((naming::apply(self.name_case, &input[start..end]), end))
    }

    /// Grow a candidate token one character at a time and return the first
    /// one that is a registered operator.
    fn parse_operator<'i>(&self, input: &'i str, start: usize) -> Step<&'i str> {
        let rest = &input[start..];
        for (offset, c) in rest.char_indices() {
            let end = offset + c.len_utf8();
            if end > self.longest_operator {
                break;
            }
            let candidate = &rest[..end];
            if self.operators.contains(candidate) {
                return Ok((candidate, start + end));
            }
        }
        Err(ParseError::at(ParseErrorKind::ExpectedOperator, input, start))
    }

    fn parse_value(&self, input: &str, start: usize) -> Step<String> {
        match input[start..].chars().next() {
            None => Ok((String::new(), start)),
            Some(QUOTE) => parse_quoted_value(input, start),
            Some(_) => self.parse_bare_value(input, start),
        }
    }

    /// Everything up to the next whitespace.
    fn parse_bare_value(&self, input: &str, start: usize) -> Step<String> {
        let end = skip_while(input, start, |c| !c.is_whitespace());
        let value = &input[start..end];
        if self.reject_operators_in_values {
            if let Some(offset) = self.find_operator(value) {
                return Err(ParseError::at(
                    ParseErrorKind::OperatorInValue,
                    input,
                    start + offset,
                ));
            }
        }
        Ok((value.to_string(), end))
    }

    /// Byte offset of the leftmost registered operator inside `value`.
    fn find_operator(&self, value: &str) -> Option<usize> {
        self.operators
            .iter()
            .filter_map(|op| value.find(op.as_str()))
            .min()
    }
}

/// A filter rendered for a specific [`Parser`]; see [`Parser::render`].
#[derive(Debug, Clone, Copy)]
pub struct Rendered<'a> {
    parser: &'a Parser,
    filter: &'a Filter,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.filter
            .write_with(f, |value| needs_quotes(value, self.parser.operators()))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric() || c == '_'
}

/// Offset of the first character at or after `start` for which `pred` is
/// false, or the input length.
fn skip_while(input: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    input[start..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(input.len(), |(offset, _)| start + offset)
}

/// `Whitespace+ ("AND" | "OR") Whitespace+`
fn parse_separator(input: &str, start: usize) -> Step<Separator> {
    let token_start = skip_while(input, start, char::is_whitespace);
    if token_start == start {
        return Err(ParseError::at(
            ParseErrorKind::ExpectedWhitespace,
            input,
            token_start,
        ));
    }
    let token_end = skip_while(input, token_start, |c| !c.is_whitespace());
    let separator = Separator::from_token(&input[token_start..token_end]).ok_or_else(|| {
        ParseError::at(ParseErrorKind::ExpectedSeparator, input, token_start)
    })?;
    let next = skip_while(input, token_end, char::is_whitespace);
    if next == token_end {
        return Err(ParseError::at(ParseErrorKind::ExpectedWhitespace, input, next));
    }
    Ok((separator, next))
}

/// A quoted value starting at the opening quote at `start`.
///
/// Errors are anchored at the opening quote.
fn parse_quoted_value(input: &str, start: usize) -> Step<String> {
    let body_start = start + QUOTE.len_utf8();
    let mut value = String::new();
    let mut escaped = false;
    for (offset, c) in input[body_start..].char_indices() {
        if escaped {
            if c != QUOTE && c != ESCAPE {
                value.push(ESCAPE);
            }
            value.push(c);
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == QUOTE {
            return Ok((value, body_start + offset + QUOTE.len_utf8()));
        } else {
            value.push(c);
        }
    }
    Err(ParseError::at(
        ParseErrorKind::UnterminatedQuotedValue,
        input,
        start,
    ))
}
