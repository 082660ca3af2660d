//! The read and write contract an edit session runs against.

use std::fmt;

use thiserror::Error;

use crate::{
    diff::ChangeSet,
    policy::{ClassificationTable, DisclosureLevel, DisclosurePolicy},
    tree::ConfigTree,
};

/// Storage for the configuration tree.
///
/// Implementations own transport and persistence. The session only relies on
/// the two calls below.
pub trait ConfigBackend {
    /// Reported to the operator verbatim when a read or write fails.
    type Error: fmt::Display;

    /// Returns the tree as seen at `level`.
    ///
    /// The result must already have the disclosure policy applied; the
    /// session does not redact a tree it did not read itself.
    fn fetch_config(&mut self, level: DisclosureLevel) -> Result<ConfigTree, Self::Error>;

    /// Persists `changes`.
    ///
    /// The payload is sparse: keys absent from it must be left untouched so
    /// unrelated sections are not clobbered.
    fn apply_config(&mut self, changes: &ChangeSet) -> Result<(), Self::Error>;
}

impl<B: ConfigBackend + ?Sized> ConfigBackend for &mut B {
    type Error = B::Error;

    fn fetch_config(&mut self, level: DisclosureLevel) -> Result<ConfigTree, Self::Error> {
        (**self).fetch_config(level)
    }

    fn apply_config(&mut self, changes: &ChangeSet) -> Result<(), Self::Error> {
        (**self).apply_config(changes)
    }
}

/// Failure injected into a [`MemoryBackend`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemoryBackendError {
    #[error("read rejected: {0}")]
    ReadRejected(String),
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// An in-process backend holding the full tree.
///
/// Reads disclose the stored tree through its classification table. Writes
/// merge the change set into the store and are recorded in order.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    store: ConfigTree,
    table: ClassificationTable,
    writes: Vec<ChangeSet>,
    reads: usize,
    fail_next_read: Option<String>,
    fail_next_write: Option<String>,
}

impl MemoryBackend {
    pub fn new(store: ConfigTree, table: ClassificationTable) -> Self {
        Self {
            store,
            table,
            ..Self::default()
        }
    }

    /// The stored tree, undisclosed.
    pub fn store(&self) -> &ConfigTree {
        &self.store
    }

    pub fn table(&self) -> &ClassificationTable {
        &self.table
    }

    /// Every accepted payload, oldest first.
    pub fn writes(&self) -> &[ChangeSet] {
        &self.writes
    }

    /// Number of successful reads.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Makes the next read fail with `reason`.
    pub fn fail_next_read(&mut self, reason: impl Into<String>) {
        self.fail_next_read = Some(reason.into());
    }

    /// Makes the next write fail with `reason`. The store is left unchanged.
    pub fn fail_next_write(&mut self, reason: impl Into<String>) {
        self.fail_next_write = Some(reason.into());
    }
}

impl ConfigBackend for MemoryBackend {
    type Error = MemoryBackendError;

    fn fetch_config(&mut self, level: DisclosureLevel) -> Result<ConfigTree, Self::Error> {
        if let Some(reason) = self.fail_next_read.take() {
            return Err(MemoryBackendError::ReadRejected(reason));
        }
        self.reads += 1;
        Ok(DisclosurePolicy::new(level, &self.table).disclose(&self.store))
    }

    fn apply_config(&mut self, changes: &ChangeSet) -> Result<(), Self::Error> {
        if let Some(reason) = self.fail_next_write.take() {
            return Err(MemoryBackendError::WriteRejected(reason));
        }
        changes.apply_to(&mut self.store);
        self.writes.push(changes.clone());
        Ok(())
    }
}
