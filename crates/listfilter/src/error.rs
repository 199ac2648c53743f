//! Error types for filter parsing, parser configuration and typed value access.

use thiserror::Error;

/// What went wrong while parsing a filter string.
///
/// The `Display` output is the user-facing message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The input ended where a name was required (e.g. after a separator).
    #[error("unexpected end of string, expected a name")]
    UnexpectedEnd,

    /// A name (or a dotted name segment) did not start with a letter.
    #[error("name must start with letter")]
    NameMustStartWithLetter,

    /// None of the registered operators matched after a name.
    #[error("expected operator")]
    ExpectedOperator,

    /// A registered operator occurs inside a bare value. Only raised when the
    /// parser was built with `reject_operators_in_values`.
    #[error("operator found in value")]
    OperatorInValue,

    /// A quoted value has no closing `"`.
    #[error("unterminated quoted value")]
    UnterminatedQuotedValue,

    /// Whitespace was required around a condition separator.
    #[error("expected a whitespace")]
    ExpectedWhitespace,

    /// Something other than `AND` or `OR` sits between two conditions.
    #[error("expected a condition separator (AND, OR)")]
    ExpectedSeparator,
}

/// A failed parse: the error kind, the byte offset at which it was detected
/// and the remainder of the input starting at that offset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} @ {position} ({unparsable})")]
pub struct ParseError {
    kind: ParseErrorKind,
    position: usize,
    unparsable: String,
}

impl ParseError {
    /// Create an error with explicit context.
    pub fn new(kind: ParseErrorKind, position: usize, unparsable: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            unparsable: unparsable.into(),
        }
    }

    /// Create an error anchored at `position`, taking the rest of `input` as
    /// context. `position` must fall on a char boundary of `input`.
    pub(crate) fn at(kind: ParseErrorKind, input: &str, position: usize) -> Self {
        Self::new(kind, position, input.get(position..).unwrap_or_default())
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// The human-readable message, without position information.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Zero-based byte offset into the input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The part of the input from [`position`](Self::position) onward.
    pub fn unparsable(&self) -> &str {
        &self.unparsable
    }
}

/// A condition value could not be read as the requested type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("{0} is not an integer")]
    NotAnInteger(String),

    #[error("{0} is not a valid boolean")]
    NotABoolean(String),

    #[error("{0} is not a valid float")]
    NotAFloat(String),
}

/// Invalid parser configuration, reported when the parser is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("conflicting options for name casing: snake_case and camelCase are mutually exclusive")]
    ConflictingNameCase,

    #[error("operators must not be empty strings")]
    EmptyOperator,

    #[error("at least one operator must be registered")]
    NoOperators,
}

/// Umbrella error for the convenience entry points.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parser configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("filter parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid condition value: {0}")]
    Value(#[from] ValueError),

    /// Parser options or filter output could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout listfilter.
pub type Result<T> = std::result::Result<T, Error>;
