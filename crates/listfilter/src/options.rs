//! Parser configuration.
//!
//! Options can be assembled in code through [`ParserBuilder`] or loaded from
//! JSON into a [`ParserOptions`] record. Either way they are validated once,
//! when the [`Parser`] is built.

use crate::error::ConfigError;
use crate::parser::Parser;
use serde::{Deserialize, Serialize};

/// The operators registered when none are configured.
pub const DEFAULT_OPERATORS: [&str; 2] = ["=", "!="];

/// How parsed names are rewritten before they become keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NameCase {
    #[default]
    Unchanged,
    SnakeCase,
    CamelCase,
}

/// Raw parser configuration.
///
/// Every field has a default, so `{}` is a valid JSON document for it.
///
/// ```
/// use listfilter::ParserOptions;
///
/// let options = ParserOptions::from_json(r#"{"operators":["=","<",">"],"snake_case":true}"#).unwrap();
/// let parser = options.build().unwrap();
/// let filter = parser.parse("createTime>2022").unwrap();
/// assert!(filter.get_first("create_time").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub operators: Vec<String>,
    pub snake_case: bool,
    pub camel_case: bool,
    pub reject_operators_in_values: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            operators: DEFAULT_OPERATORS.iter().map(|op| op.to_string()).collect(),
            snake_case: false,
            camel_case: false,
            reject_operators_in_values: false,
        }
    }
}

impl ParserOptions {
    /// Read options from a JSON document.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve the two casing flags into a single [`NameCase`].
    pub fn name_case(&self) -> Result<NameCase, ConfigError> {
        match (self.snake_case, self.camel_case) {
            (true, true) => Err(ConfigError::ConflictingNameCase),
            (true, false) => Ok(NameCase::SnakeCase),
            (false, true) => Ok(NameCase::CamelCase),
            (false, false) => Ok(NameCase::Unchanged),
        }
    }

    /// Validate the options and build a parser from them.
    pub fn build(&self) -> Result<Parser, ConfigError> {
        Parser::new(self)
    }
}

/// Builder-style construction of a [`Parser`].
///
/// Adding an operator keeps the defaults; use [`operators`](Self::operators)
/// to replace the whole set.
#[derive(Debug, Clone, Default)]
pub struct ParserBuilder {
    options: ParserOptions,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more operator.
    pub fn operator(mut self, op: impl Into<String>) -> Self {
        self.options.operators.push(op.into());
        self
    }

    /// Replace the registered operator set.
    pub fn operators<I, S>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.operators = ops.into_iter().map(Into::into).collect();
        self
    }

    /// Rewrite names to snake_case. Conflicts with [`camel_case`](Self::camel_case).
    pub fn snake_case(mut self) -> Self {
        self.options.snake_case = true;
        self
    }

    /// Rewrite names to camelCase. Conflicts with [`snake_case`](Self::snake_case).
    pub fn camel_case(mut self) -> Self {
        self.options.camel_case = true;
        self
    }

    /// Fail on bare values that contain a registered operator.
    pub fn reject_operators_in_values(mut self) -> Self {
        self.options.reject_operators_in_values = true;
        self
    }

    pub fn build(self) -> Result<Parser, ConfigError> {
        Parser::new(&self.options)
    }
}
