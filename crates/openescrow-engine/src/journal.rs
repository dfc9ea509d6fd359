//! Local undo log for one engine operation.
//!
//! Every mutation of engine-owned state (offer books, event log) during an
//! operation pushes an [`Undo`] entry. If the operation fails, the engine
//! replays the entries newest-first; collaborators roll back their own state
//! through [`Transactional`](openescrow_types::Transactional).

use openescrow_types::{BookKind, OfferId};

/// A single reversible change to engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Undo {
    /// A record was appended to the book.
    Inserted(BookKind),
    /// `is_ended` was flipped on this record.
    Ended(BookKind, OfferId),
    /// An event was appended to the log.
    Emitted,
}

/// Ordered undo entries for the operation in progress.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    entries: Vec<Undo>,
}

impl Journal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, undo: Undo) {
        self.entries.push(undo);
    }

    /// True while nothing has been mutated, i.e. the operation failed a
    /// precondition rather than midway.
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries newest-first, consuming the journal.
    pub(crate) fn unwind(self) -> impl Iterator<Item = Undo> {
        self.entries.into_iter().rev()
    }
}
