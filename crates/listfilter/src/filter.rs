//! The parse result: conditions indexed by key, plus the ordered AND/OR chain.
//!
//! A [`Filter`] owns every condition it contains. The key index and the chain
//! reference the same records, so each condition is reachable exactly once
//! through [`Filter::conditions`] and exactly once through the key buckets.
//!
//! ```
//! use listfilter::{Parser, Separator};
//!
//! let filter = Parser::default().parse("state=ACTIVE OR state=PENDING AND size!=0").unwrap();
//!
//! let states: Vec<&str> = filter.get("state").unwrap().map(|c| c.condition().string_value()).collect();
//! assert_eq!(states, ["ACTIVE", "PENDING"]);
//!
//! let first = filter.first().unwrap();
//! assert_eq!(first.separator(), Some(Separator::Or));
//! assert_eq!(filter.to_string(), "state=ACTIVE OR state=PENDING AND size!=0");
//! ```

use crate::condition::{needs_quotes, Condition, ConditionRef, Link, Separator};
use crate::error::Result;
use crate::options::DEFAULT_OPERATORS;
use indexmap::IndexMap;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::FusedIterator;

/// A parsed filter. Immutable once returned by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Arena of conditions in parse order; the chain starts at index 0.
    conditions: Vec<Condition>,
    /// Key -> arena indices, in parse order. Keys keep first-appearance order.
    index: IndexMap<String, Vec<usize>>,
}

impl Filter {
    /// Append a condition, linking it to the previous one with `separator`.
    ///
    /// The first condition takes no separator; every later one must have one.
    pub(crate) fn push(&mut self, condition: Condition, separator: Option<Separator>) {
        let index = self.conditions.len();
        if let (Some(separator), Some(prev)) = (separator, self.conditions.last_mut()) {
            prev.next = Some(Link { separator, index });
        }
        self.index
            .entry(condition.key().to_string())
            .or_default()
            .push(index);
        self.conditions.push(condition);
    }

    pub(crate) fn condition_at(&self, index: usize) -> &Condition {
        &self.conditions[index]
    }

    /// All conditions recorded under `key`, in parse order.
    pub fn get(&self, key: &str) -> Option<Matches<'_>> {
        self.index.get(key).map(|indices| Matches {
            filter: self,
            indices: indices.iter(),
        })
    }

    /// The first condition recorded under `key`.
    pub fn get_first(&self, key: &str) -> Option<ConditionRef<'_>> {
        self.get(key).and_then(|mut matches| matches.next())
    }

    /// The last condition recorded under `key`.
    pub fn get_last(&self, key: &str) -> Option<ConditionRef<'_>> {
        self.get(key).and_then(|mut matches| matches.next_back())
    }

    /// Whether any condition uses `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Distinct keys, in order of first appearance.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    /// Every condition, grouped by key (see [`keys`](Self::keys) for the group
    /// order). Use [`conditions`](Self::conditions) for input order.
    pub fn values(&self) -> impl Iterator<Item = ConditionRef<'_>> + '_ {
        self.index
            .values()
            .flatten()
            .map(move |&index| ConditionRef::new(self, index))
    }

    /// Number of distinct keys, not conditions.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of conditions, counting repeated keys.
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// The first condition of the input; `None` only for the empty filter.
    pub fn first(&self) -> Option<ConditionRef<'_>> {
        if self.conditions.is_empty() {
            None
        } else {
            Some(ConditionRef::new(self, 0))
        }
    }

    /// Walk the AND/OR chain from [`first`](Self::first).
    ///
    /// The iterator borrows the filter and can be recreated at will.
    pub fn conditions(&self) -> Conditions<'_> {
        Conditions { next: self.first() }
    }

    /// Compact JSON rendering of the conditions in chain order.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Filter {
    /// Writes the chain, asking `quote` whether each value must be quoted.
    pub(crate) fn write_with(
        &self,
        f: &mut fmt::Formatter<'_>,
        quote: impl Fn(&str) -> bool,
    ) -> fmt::Result {
        for condition in self.conditions() {
            condition.write_with(f, quote(condition.string_value()))?;
            if let Some(separator) = condition.separator() {
                write!(f, " {separator} ")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Filter {
    /// Re-emits the filter in its own syntax. Values holding one of the
    /// default operators are quoted; use [`Parser::render`] for a custom
    /// operator set.
    ///
    /// [`Parser::render`]: crate::Parser::render
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, |value| needs_quotes(value, DEFAULT_OPERATORS))
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.conditions.len()))?;
        for condition in self.conditions() {
            seq.serialize_element(condition.condition())?;
        }
        seq.end()
    }
}

impl<'f> IntoIterator for &'f Filter {
    type Item = ConditionRef<'f>;
    type IntoIter = Conditions<'f>;

    fn into_iter(self) -> Conditions<'f> {
        self.conditions()
    }
}

/// Conditions sharing one key. Returned by [`Filter::get`].
#[derive(Debug, Clone)]
pub struct Matches<'f> {
    filter: &'f Filter,
    indices: std::slice::Iter<'f, usize>,
}

impl<'f> Iterator for Matches<'f> {
    type Item = ConditionRef<'f>;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.indices
            .next()
            .map(|&index| ConditionRef::new(filter, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl DoubleEndedIterator for Matches<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.indices
            .next_back()
            .map(|&index| ConditionRef::new(filter, index))
    }
}

impl ExactSizeIterator for Matches<'_> {}

/// Chain traversal. Returned by [`Filter::conditions`].
#[derive(Debug, Clone)]
pub struct Conditions<'f> {
    next: Option<ConditionRef<'f>>,
}

impl<'f> Iterator for Conditions<'f> {
    type Item = ConditionRef<'f>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.next().map(|(_, successor)| successor);
        Some(current)
    }
}

impl FusedIterator for Conditions<'_> {}
