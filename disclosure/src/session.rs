//! A single operator's edit session.
//!
//! The session owns a baseline read at one disclosure level and a separate
//! edited copy. It moves through
//!
//! ```text
//! Loaded -> Editing -> DiffComputed -> EmptyNoOp
//!                                   -> AwaitingConfirm -> Applied
//!                                                      -> Cancelled
//! ```
//!
//! and every terminal state returns to `Loaded` through a fresh read, so edits
//! never continue against a stale baseline. When that read fails the outcome
//! of the terminal step is still returned; the session stays in the terminal
//! state, [`EditSession::stale_reason`] holds the read error, and
//! [`EditSession::reload`] retries.

use std::fmt;

use slog::{debug, info, warn, Logger};
use thiserror::Error;

use crate::{
    backend::ConfigBackend,
    diff::diff,
    gate::{ApplyGate, ChangeSummary, GateOutcome, MaskedEdits, PendingApply},
    policy::{ClassificationTable, DisclosureLevel, DisclosurePolicy},
    slog::IntoPathJson,
    tree::{ConfigTree, FieldPath, Node},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    Loaded,
    Editing,
    DiffComputed,
    EmptyNoOp,
    AwaitingConfirm,
    Applied,
    Cancelled,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Loaded => "loaded",
            SessionState::Editing => "editing",
            SessionState::DiffComputed => "diff-computed",
            SessionState::EmptyNoOp => "empty-no-op",
            SessionState::AwaitingConfirm => "awaiting-confirm",
            SessionState::Applied => "applied",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SessionError<E> {
    /// The backend could not produce a baseline.
    #[error("failed to read configuration: {0}")]
    ReadFailure(E),
    /// The backend rejected the payload. Baseline and edits are kept.
    #[error("failed to apply configuration: {0}")]
    WriteFailure(E),
    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        state: SessionState,
        operation: &'static str,
    },
}

/// What the operator sees after asking to apply their edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Review {
    /// Nothing differs from the baseline.
    NoChanges,
    /// Only masked fields were touched; nothing would be written.
    AllMasked(MaskedEdits),
    /// Real changes await [`EditSession::confirm`].
    Confirm(ChangeSummary),
}

pub struct EditSession<B: ConfigBackend> {
    backend: B,
    table: ClassificationTable,
    level: DisclosureLevel,
    state: SessionState,
    baseline: ConfigTree,
    edited: ConfigTree,
    pending: Option<PendingApply>,
    stale: Option<B::Error>,
    logger: Logger,
}

impl<B: ConfigBackend> EditSession<B> {
    /// Reads the baseline at `level`.
    pub fn open(
        mut backend: B,
        table: ClassificationTable,
        level: DisclosureLevel,
        logger: Logger,
    ) -> Result<Self, SessionError<B::Error>> {
        let baseline = backend
            .fetch_config(level)
            .map_err(SessionError::ReadFailure)?;
        info!(logger, "configuration loaded"; "level" => level, "fields" => baseline.leaf_count());
        Ok(Self {
            backend,
            table,
            level,
            state: SessionState::Loaded,
            edited: baseline.clone(),
            baseline,
            pending: None,
            stale: None,
            logger,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn level(&self) -> DisclosureLevel {
        self.level
    }

    /// The tree as last read. Never touched by edits.
    pub fn baseline(&self) -> &ConfigTree {
        &self.baseline
    }

    pub fn edited(&self) -> &ConfigTree {
        &self.edited
    }

    pub fn policy(&self) -> DisclosurePolicy<'_> {
        DisclosurePolicy::new(self.level, &self.table)
    }

    /// The summary awaiting confirmation, if any.
    pub fn pending(&self) -> Option<&PendingApply> {
        self.pending.as_ref()
    }

    /// True when a terminal step finished but the follow-up read failed, so
    /// the baseline no longer reflects the store.
    pub fn needs_reload(&self) -> bool {
        self.stale.is_some()
    }

    /// The read error that left the baseline stale.
    pub fn stale_reason(&self) -> Option<&B::Error> {
        self.stale.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Writes `value` at `path` in the edited tree and returns the previous
    /// value.
    ///
    /// A value the operator writes back into a field is their own input, so
    /// placeholders passed here are recorded as echoes and discarded at
    /// review.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or runs through a non-mapping value.
    pub fn edit(
        &mut self,
        path: impl Into<FieldPath>,
        value: impl Into<Node>,
    ) -> Result<Option<Node>, SessionError<B::Error>> {
        self.require(&[SessionState::Loaded, SessionState::Editing], "edit")?;
        let path = path.into();
        let previous = self.edited.set(path.as_slice(), value.into().into_echo());
        self.state = SessionState::Editing;
        debug!(self.logger, "field edited"; "path" => &path);
        Ok(previous)
    }

    /// Removes `path` from the edited tree.
    pub fn clear(
        &mut self,
        path: impl Into<FieldPath>,
    ) -> Result<Option<Node>, SessionError<B::Error>> {
        self.require(&[SessionState::Loaded, SessionState::Editing], "clear")?;
        let path = path.into();
        let previous = self.edited.remove(path.as_slice());
        self.state = SessionState::Editing;
        debug!(self.logger, "field cleared"; "path" => &path);
        Ok(previous)
    }

    /// Diffs the edited tree against the baseline and runs the apply gate.
    ///
    /// Empty outcomes re-read the baseline and return to `Loaded`; if that
    /// read fails the outcome is still returned and the session stays in
    /// `EmptyNoOp`. A ready outcome waits in `AwaitingConfirm`.
    pub fn review(&mut self) -> Result<Review, SessionError<B::Error>> {
        self.require(&[SessionState::Loaded, SessionState::Editing], "review")?;
        let raw = diff(&self.baseline, &self.edited);
        self.state = SessionState::DiffComputed;
        debug!(self.logger, "diff computed"; "changes" => raw.path_json());

        match ApplyGate::new(self.level).evaluate(raw) {
            GateOutcome::NoChangesDetected => {
                self.state = SessionState::EmptyNoOp;
                info!(self.logger, "no changes detected");
                self.settle();
                Ok(Review::NoChanges)
            }
            GateOutcome::AllChangesMasked(masked) => {
                self.state = SessionState::EmptyNoOp;
                warn!(self.logger, "only masked fields were edited";
                    "level" => self.level, "dropped" => masked.path_json());
                self.settle();
                Ok(Review::AllMasked(masked))
            }
            GateOutcome::Ready(pending) => {
                if !pending.dropped().is_empty() {
                    info!(self.logger, "placeholder echoes dropped";
                        "dropped" => pending.dropped().len());
                }
                let summary = pending.summary().clone();
                self.pending = Some(pending);
                self.state = SessionState::AwaitingConfirm;
                Ok(Review::Confirm(summary))
            }
        }
    }

    /// Transmits the reviewed payload.
    ///
    /// On failure the session stays in `AwaitingConfirm` with both trees
    /// untouched, so the operator can retry or cancel. Once the write lands
    /// the summary is returned even if the follow-up read fails; check
    /// [`EditSession::needs_reload`].
    pub fn confirm(&mut self) -> Result<ChangeSummary, SessionError<B::Error>> {
        self.require(&[SessionState::AwaitingConfirm], "confirm")?;
        let Some(pending) = self.pending.as_ref() else {
            return Err(self.invalid("confirm"));
        };
        if let Err(err) = self.backend.apply_config(pending.changes()) {
            warn!(self.logger, "apply failed";
                "reason" => %err, "changes" => pending.changes().path_json());
            return Err(SessionError::WriteFailure(err));
        }
        info!(self.logger, "apply confirmed"; "summary" => pending.summary().path_json());
        let summary = pending.summary().clone();
        self.pending = None;
        self.state = SessionState::Applied;
        self.settle();
        Ok(summary)
    }

    /// Discards the edits and any pending payload, then re-reads.
    ///
    /// Cancelling cannot fail once allowed; a failed read leaves the session
    /// in `Cancelled` with [`EditSession::needs_reload`] set.
    pub fn cancel(&mut self) -> Result<(), SessionError<B::Error>> {
        self.require(
            &[SessionState::Editing, SessionState::AwaitingConfirm],
            "cancel",
        )?;
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        self.state = SessionState::Cancelled;
        info!(self.logger, "edits cancelled");
        self.settle();
        Ok(())
    }

    /// Re-reads the baseline at the current level, discarding all edits.
    ///
    /// Allowed in every state. If the read fails the session keeps its
    /// current state and trees.
    pub fn reload(&mut self) -> Result<(), SessionError<B::Error>> {
        let baseline = self
            .backend
            .fetch_config(self.level)
            .map_err(SessionError::ReadFailure)?;
        debug!(self.logger, "configuration reloaded";
            "level" => self.level, "fields" => baseline.leaf_count());
        self.edited = baseline.clone();
        self.baseline = baseline;
        self.pending = None;
        self.stale = None;
        self.state = SessionState::Loaded;
        Ok(())
    }

    /// Re-reads at `level`. Edits are never carried across a level switch,
    /// since what counts as a placeholder depends on the level.
    pub fn switch_level(&mut self, level: DisclosureLevel) -> Result<(), SessionError<B::Error>> {
        let previous = self.level;
        self.level = level;
        if let Err(err) = self.reload() {
            self.level = previous;
            return Err(err);
        }
        info!(self.logger, "disclosure level switched"; "from" => previous, "to" => level);
        Ok(())
    }

    /// Re-reads after a terminal step, keeping the read error instead of
    /// returning it.
    fn settle(&mut self) {
        if let Err(SessionError::ReadFailure(err)) = self.reload() {
            warn!(self.logger, "re-read after {} failed", self.state; "reason" => %err);
            self.stale = Some(err);
        }
    }

    fn require(
        &self,
        allowed: &[SessionState],
        operation: &'static str,
    ) -> Result<(), SessionError<B::Error>> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError<B::Error> {
        SessionError::InvalidState {
            state: self.state,
            operation,
        }
    }
}

impl<B: ConfigBackend + fmt::Debug> fmt::Debug for EditSession<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("backend", &self.backend)
            .field("level", &self.level)
            .field("state", &self.state)
            .field("stale", &self.stale.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use slog::{o, Discard, Logger};

    use super::{EditSession, Review, SessionError, SessionState};
    use crate::{
        backend::{MemoryBackend, MemoryBackendError},
        policy::{ClassificationTable, DisclosureLevel, FieldRule, HintPolicy},
        tree::{ConfigTree, Node, Placeholder},
    };

    fn table() -> ClassificationTable {
        ClassificationTable::new()
            .classify("apiKeys.secret", FieldRule::secret().with_hint(HintPolicy::keep_last(4)))
    }

    fn open(level: DisclosureLevel) -> EditSession<MemoryBackend> {
        let store = ConfigTree::try_from(json!({
            "app": { "name": "Console" },
            "apiKeys": { "secret": "sk_live_1234", "label": "prod" }
        }))
        .unwrap();
        let backend = MemoryBackend::new(store, table());
        EditSession::open(backend, table(), level, Logger::root(Discard, o!())).unwrap()
    }

    #[test]
    fn edit_then_confirm_writes_and_reloads() {
        let mut session = open(DisclosureLevel::Masked);
        assert_eq!(session.state(), SessionState::Loaded);

        session.edit("app.name", "Admin").unwrap();
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(
            session.baseline().get(&["app", "name"]),
            Some(&Node::from("Console"))
        );

        let Review::Confirm(summary) = session.review().unwrap() else {
            panic!("expected Confirm");
        };
        assert_eq!(summary.to_string(), "app: name");
        assert_eq!(session.state(), SessionState::AwaitingConfirm);

        session.confirm().unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(
            session.baseline().get(&["app", "name"]),
            Some(&Node::from("Admin"))
        );
        assert_eq!(session.backend().writes().len(), 1);
    }

    #[test]
    fn write_failure_keeps_trees_and_state() {
        let mut session = open(DisclosureLevel::Full);
        session.edit("app.name", "Admin").unwrap();
        session.review().unwrap();
        session.backend_mut().fail_next_write("storage offline");

        let err = session.confirm().unwrap_err();
        assert!(matches!(
            err,
            SessionError::WriteFailure(MemoryBackendError::WriteRejected(_))
        ));
        assert!(err.to_string().contains("storage offline"));
        assert_eq!(session.state(), SessionState::AwaitingConfirm);
        assert_eq!(
            session.edited().get(&["app", "name"]),
            Some(&Node::from("Admin"))
        );
        assert_eq!(
            session.baseline().get(&["app", "name"]),
            Some(&Node::from("Console"))
        );

        session.confirm().unwrap();
        assert_eq!(session.backend().writes().len(), 1);
    }

    #[test]
    fn echoing_the_placeholder_changes_nothing() {
        let mut session = open(DisclosureLevel::Masked);
        let shown = session.baseline().get(&["apiKeys", "secret"]).cloned().unwrap();
        assert_eq!(shown, Node::from(Placeholder::new("••••••••1234")));

        session.edit("apiKeys.secret", shown).unwrap();
        let Review::AllMasked(masked) = session.review().unwrap() else {
            panic!("expected AllMasked");
        };
        assert_eq!(masked.paths()[0].to_string(), "apiKeys.secret");
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(session.backend().writes().is_empty());
    }

    #[test]
    fn review_without_edits_is_no_changes() {
        let mut session = open(DisclosureLevel::Masked);
        assert_eq!(session.review().unwrap(), Review::NoChanges);
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[test]
    fn confirm_requires_pending_review() {
        let mut session = open(DisclosureLevel::Full);
        let err = session.confirm().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                state: SessionState::Loaded,
                operation: "confirm"
            }
        ));
    }

    #[test]
    fn edits_are_locked_while_awaiting_confirm() {
        let mut session = open(DisclosureLevel::Full);
        session.edit("app.name", "Admin").unwrap();
        session.review().unwrap();
        assert!(session.edit("app.name", "Other").is_err());

        session.cancel().unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(
            session.edited().get(&["app", "name"]),
            Some(&Node::from("Console"))
        );
        assert!(session.backend().writes().is_empty());
    }

    #[test]
    fn switching_level_discards_edits() {
        let mut session = open(DisclosureLevel::Masked);
        session.edit("app.name", "Admin").unwrap();
        session.switch_level(DisclosureLevel::Full).unwrap();
        assert_eq!(session.level(), DisclosureLevel::Full);
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(
            session.edited().get(&["apiKeys", "secret"]),
            Some(&Node::from("sk_live_1234"))
        );
        assert_eq!(
            session.edited().get(&["app", "name"]),
            Some(&Node::from("Console"))
        );
    }

    #[test]
    fn failed_level_switch_keeps_current_level() {
        let mut session = open(DisclosureLevel::Masked);
        session.backend_mut().fail_next_read("timeout");
        assert!(matches!(
            session.switch_level(DisclosureLevel::Full),
            Err(SessionError::ReadFailure(_))
        ));
        assert_eq!(session.level(), DisclosureLevel::Masked);
    }

    #[test]
    fn clear_removes_the_key() {
        let mut session = open(DisclosureLevel::Full);
        session.clear("apiKeys.label").unwrap();
        let Review::Confirm(summary) = session.review().unwrap() else {
            panic!("expected Confirm");
        };
        assert_eq!(summary.to_string(), "apiKeys: label");
        session.confirm().unwrap();
        assert_eq!(session.baseline().get(&["apiKeys", "label"]), None);
    }

    #[test]
    fn failed_read_after_confirm_still_reports_the_write() {
        let mut session = open(DisclosureLevel::Masked);
        session.edit("app.name", "Admin").unwrap();
        session.review().unwrap();
        session.backend_mut().fail_next_read("timeout");

        let summary = session.confirm().unwrap();
        assert_eq!(summary.to_string(), "app: name");
        assert_eq!(session.backend().writes().len(), 1);
        assert_eq!(session.state(), SessionState::Applied);
        assert!(session.needs_reload());
        assert_eq!(
            session.stale_reason(),
            Some(&MemoryBackendError::ReadRejected("timeout".to_owned()))
        );
        assert!(matches!(
            session.confirm(),
            Err(SessionError::InvalidState {
                state: SessionState::Applied,
                ..
            })
        ));

        session.reload().unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(!session.needs_reload());
        assert_eq!(
            session.baseline().get(&["app", "name"]),
            Some(&Node::from("Admin"))
        );
    }

    #[test]
    fn failed_read_after_masked_review_keeps_the_outcome() {
        let mut session = open(DisclosureLevel::Masked);
        let shown = session.baseline().get(&["apiKeys", "secret"]).cloned().unwrap();
        session.edit("apiKeys.secret", shown).unwrap();
        session.backend_mut().fail_next_read("timeout");

        let Review::AllMasked(masked) = session.review().unwrap() else {
            panic!("expected AllMasked");
        };
        assert!(masked.guidance().contains("`full`"));
        assert_eq!(session.state(), SessionState::EmptyNoOp);
        assert!(session.needs_reload());
        assert!(session.edit("app.name", "Admin").is_err());

        session.reload().unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(session.edit("app.name", "Admin").is_ok());
    }

    #[test]
    fn failed_read_after_empty_review_keeps_the_outcome() {
        let mut session = open(DisclosureLevel::Full);
        session.backend_mut().fail_next_read("timeout");
        assert_eq!(session.review().unwrap(), Review::NoChanges);
        assert_eq!(session.state(), SessionState::EmptyNoOp);
        assert!(session.needs_reload());
    }

    #[test]
    fn failed_read_after_cancel_keeps_cancelled() {
        let mut session = open(DisclosureLevel::Full);
        session.edit("app.name", "Admin").unwrap();
        session.review().unwrap();
        session.backend_mut().fail_next_read("timeout");

        session.cancel().unwrap();
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.pending().is_none());
        assert!(session.needs_reload());
        assert!(session.backend().writes().is_empty());

        assert!(session.reload().is_ok());
        assert_eq!(
            session.edited().get(&["app", "name"]),
            Some(&Node::from("Console"))
        );
    }
}
