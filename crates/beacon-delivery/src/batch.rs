//! The pending batch: serialized queries waiting for the next flush.
//!
//! Appends and drains take the same lock. A drain moves out the complete
//! contents and leaves an empty batch in one critical section, so a query is
//! part of exactly one drained batch.

use std::mem;

use parking_lot::Mutex;

use crate::{
    error::{Result, TrackingError},
    handle::{Responder, TrackingHandle},
};

#[derive(Debug)]
struct PendingEntry {
    query: String,
    responder: Responder,
}

/// Queries awaiting delivery, in enqueue order.
#[derive(Debug, Default)]
pub struct PendingBatch {
    entries: Mutex<Vec<PendingEntry>>,
}

impl PendingBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a query and returns the handle that resolves with its
    /// batch's outcome.
    pub fn push(&self, query: String) -> TrackingHandle {
        let (responder, handle) = TrackingHandle::channel();
        self.entries.lock().push(PendingEntry { query, responder });
        handle
    }

    /// Takes everything currently queued.
    pub fn drain(&self) -> DrainedBatch {
        DrainedBatch { entries: mem::take(&mut *self.entries.lock()) }
    }

    /// Number of queued queries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// A point-in-time snapshot taken out of a [`PendingBatch`].
///
/// Dropping it without calling [`DrainedBatch::complete`] resolves every
/// handle as abandoned.
#[derive(Debug)]
pub struct DrainedBatch {
    entries: Vec<PendingEntry>,
}

impl DrainedBatch {
    /// Number of queries in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The queries in enqueue order.
    pub fn queries(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.query.as_str()).collect()
    }

    /// Hands `outcome` to every handle in the snapshot.
    pub fn complete(self, outcome: &Result<()>) {
        for entry in self.entries {
            // The caller may have dropped its handle.
            let _ = entry.responder.send(outcome.clone());
        }
    }

    /// Fails every handle in the snapshot as abandoned.
    pub fn abandon(self) {
        self.complete(&Err(TrackingError::Abandoned));
    }
}
