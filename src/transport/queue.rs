//! Positional command/reply correlation.
//!
//! The monitor protocol has no request identifiers: the n-th reply
//! answers the n-th command still awaiting one. This module keeps the
//! waiting side of that contract as a queue of reply channels, pushed
//! when a command is written and popped when a reply arrives.
//!
//! Entries are only ever removed from the front (by a reply) or all at
//! once (on teardown). Removing from the middle would silently shift
//! every later reply onto the wrong caller, which is why no such
//! operation exists here.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::protocol::Reply;

// ============================================================================
// Types
// ============================================================================

/// Channel over which a pending command receives its reply.
pub type ReplySender = oneshot::Sender<Result<Reply>>;

// ============================================================================
// CorrelationQueue
// ============================================================================

/// FIFO of commands awaiting their replies, oldest first.
#[derive(Debug, Default)]
pub struct CorrelationQueue {
    pending: VecDeque<ReplySender>,
}

impl CorrelationQueue {
    /// Creates an empty queue.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of commands awaiting a reply.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no command is awaiting a reply.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Registers a command as the newest awaiting a reply.
    #[inline]
    pub fn push(&mut self, reply_tx: ReplySender) {
        self.pending.push_back(reply_tx);
    }

    /// Delivers a reply to the oldest pending command.
    ///
    /// A send failure means the caller gave up waiting; the reply is
    /// dropped but the pairing stays intact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolViolation`] when no command is
    /// pending, since an unsolicited reply proves the pairing is lost.
    pub fn complete(&mut self, reply: Reply) -> Result<()> {
        let reply_tx = self
            .pending
            .pop_front()
            .ok_or_else(|| Error::protocol_violation("reply arrived with no pending command"))?;
        let _ = reply_tx.send(Ok(reply));
        Ok(())
    }

    /// Fails every pending command and empties the queue.
    ///
    /// `make_err` is called once per entry since errors are not
    /// cloneable. Returns the number of commands failed.
    pub fn fail_all(&mut self, mut make_err: impl FnMut() -> Error) -> usize {
        let count = self.pending.len();
        for reply_tx in self.pending.drain(..) {
            let _ = reply_tx.send(Err(make_err()));
        }
        count
    }
}

// ============================================================================
// Tests
// ============================================================================
