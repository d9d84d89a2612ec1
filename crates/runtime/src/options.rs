//! Optional query parameters set through call builder setters.

use std::collections::BTreeMap;
use std::fmt::Display;

/// Optional query parameters of one call. The last write per key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, Vec<String>>,
}

impl Options {
    /// No parameters set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `key` with a single value.
    pub fn set(&mut self, key: &str, value: impl Display) {
        self.values.insert(key.to_string(), vec![value.to_string()]);
    }

    /// Replace `key` with every value in `values`, one query entry each.
    pub fn set_all<I>(&mut self, key: &str, values: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.values.insert(key.to_string(), values);
    }

    /// Values currently set for `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// Every key with its values, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// True when nothing was set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
