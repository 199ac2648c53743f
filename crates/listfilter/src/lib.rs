//! # listfilter
//!
//! Parser for the compact filter strings used by List and Search style APIs,
//! e.g. the `filter` query parameter of `GET /v1/things?filter=...`.
//!
//! A filter is a sequence of `key operator value` conditions joined by `AND` or
//! `OR`. Keys may be dotted paths, values may be bare or double-quoted with
//! backslash escapes:
//!
//! ```text
//! foo=bar
//! foo.bar=bla
//! foo=bar AND bla=vla
//! state!=DELETED OR displayName="My \"special\" thing"
//! ```
//!
//! Parsing only structures the conditions; evaluating them against data is left
//! to the caller.
//!
//! ## Quick start
//!
//! ```rust
//! use listfilter::{Parser, Separator};
//!
//! let filter = Parser::default().parse("foo=bar AND bla.vla!=\"x y\"").unwrap();
//!
//! let foo = filter.get_first("foo").unwrap();
//! assert_eq!(foo.op(), "=");
//! assert_eq!(foo.string_value(), "bar");
//!
//! let next = foo.and().unwrap();
//! assert_eq!(next.key_parts(), ["bla", "vla"]);
//! assert_eq!(next.string_value(), "x y");
//!
//! // Errors carry the byte position and the unparsed remainder.
//! let err = Parser::default().parse("foo*bar").unwrap_err();
//! assert_eq!(err.to_string(), "expected operator @ 3 (*bar)");
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: filter string → [`Filter`]
//! - [`filter`]: key index and ordered AND/OR traversal
//! - [`condition`]: single clause, typed value accessors
//! - [`options`]: operator set and name casing
//! - [`naming`]: snake_case / camelCase name rewriting
//! - [`error`]: parse, configuration and value errors

pub mod condition;
pub mod error;
pub mod filter;
pub mod naming;
pub mod options;
pub mod parser;

pub use condition::{Condition, ConditionRef, Separator};
pub use error::{ConfigError, Error, ParseError, ParseErrorKind, Result, ValueError};
pub use filter::{Conditions, Filter, Matches};
pub use options::{NameCase, ParserBuilder, ParserOptions};
pub use parser::{Parser, Rendered};

/// Parse `input` with a parser built from `options`.
///
/// Convenience for one-off parses; build a [`Parser`] once to parse many
/// strings with the same configuration.
///
/// # Errors
///
/// [`Error::Config`] if the options are invalid, [`Error::Parse`] if the input
/// is not a valid filter.
pub fn parse(input: &str, options: &ParserOptions) -> Result<Filter> {
    let parser = Parser::new(options)?;
    Ok(parser.parse(input)?)
}
