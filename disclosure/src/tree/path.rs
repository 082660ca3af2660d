//! Field paths: the key sequences that locate a leaf through nested mappings.

use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use thiserror::Error;

/// An owned sequence of mapping keys, e.g. `email.smtp.host`.
///
/// Paths come from the static field layout of the settings being edited, not
/// from operator input, so a path that runs through a scalar is a defect in
/// the caller rather than a recoverable condition.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The empty path. It addresses the tree root and is never a valid leaf.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from any sequence of string-like keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(keys.into_iter().map(|key| key.as_ref().to_owned()).collect())
    }

    /// Returns a new path with `key` appended.
    #[must_use]
    pub fn child(&self, key: impl AsRef<str>) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.as_ref().to_owned());
        Self(keys)
    }

    pub fn push(&mut self, key: impl AsRef<str>) {
        self.0.push(key.as_ref().to_owned());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// The top-level key, i.e. the configuration section this path belongs to.
    pub fn section(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The path relative to its section.
    pub fn within_section(&self) -> FieldPath {
        Self(self.0.iter().skip(1).cloned().collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Whether `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &[String]) -> bool {
        self.0.starts_with(other)
    }
}

impl Deref for FieldPath {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<[String]> for FieldPath {
    fn borrow(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    /// Splits on `.`; empty segments are dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_keys(s.split('.').filter(|key| !key.is_empty())))
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self::from_keys(value.split('.').filter(|key| !key.is_empty()))
    }
}

impl<S: AsRef<str>> From<&[S]> for FieldPath {
    fn from(value: &[S]) -> Self {
        Self::from_keys(value)
    }
}

impl From<Vec<String>> for FieldPath {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl IntoIterator for FieldPath {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Raised when a path cannot address a leaf.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path has no keys.
    #[error("an empty path does not address a field")]
    Empty,
    /// A prefix of the path resolves to a scalar or list, not a mapping.
    #[error("`{path}` runs through a non-mapping value at `{at}`")]
    MalformedPath {
        /// The full path that was requested.
        path: FieldPath,
        /// The prefix that resolved to a non-mapping value.
        at: FieldPath,
    },
}
