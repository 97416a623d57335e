//! Deferred store work
//!
//! Store round-trips never run inside an input handler. Handlers queue a
//! task and return; the host drives the queue with `EditSession::tick`, one
//! turn at a time. Tasks queued while a turn runs wait for the next turn,
//! so further input can be handled between a request and its continuation.

use crate::error::EditError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use pdf_annotate_core::{Annotation, AnnotationId, DocumentId, ModelDelta};
use std::collections::VecDeque;

/// One unit of deferred work
#[derive(Debug, Clone, PartialEq)]
pub enum StoreTask {
    /// Read the record, apply the displacement, then queue its persist
    Move {
        document_id: DocumentId,
        annotation_id: AnnotationId,
        delta: ModelDelta,
    },

    /// Write an updated record
    Persist {
        document_id: DocumentId,
        annotation: Annotation,
    },

    /// Delete a record and, on success, its rendered elements
    Delete {
        document_id: DocumentId,
        annotation_id: AnnotationId,
    },

    /// Reset the drag flag after the pointer-up turn
    ClearDragging,
}

/// FIFO of pending store work
#[derive(Debug, Default)]
pub struct PersistQueue {
    tasks: VecDeque<StoreTask>,
}

impl PersistQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: StoreTask) {
        self.tasks.push_back(task);
    }

    /// Everything queued so far; later pushes belong to the next turn
    pub fn take_turn(&mut self) -> Vec<StoreTask> {
        self.tasks.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Host-facing channel for failures nobody is waiting on
#[derive(Debug, Clone)]
pub struct ErrorChannel {
    sender: Sender<EditError>,
    receiver: Receiver<EditError>,
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorChannel {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Log the failure and hand it to the host
    pub fn report(&self, error: EditError) {
        log::error!("{}", error);
        // The receiver lives as long as the channel itself
        let _ = self.sender.send(error);
    }

    /// Receiver hosts can poll or select on
    pub fn receiver(&self) -> Receiver<EditError> {
        self.receiver.clone()
    }

    /// All failures reported since the last drain
    pub fn drain(&self) -> Vec<EditError> {
        self.receiver.try_iter().collect()
    }
}
