//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Client-chosen connection identifier. Doubles as the user id.
pub type ConnectionId = String;

/// Result of queueing a frame on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Queued for the writer.
    Delivered,
    /// The queue is full; the consumer is not keeping up.
    Full,
    /// The writer is gone or the handle was closed.
    Closed,
}

/// A handle to a single WebSocket connection.
///
/// Holds the bounded sender drained by the socket writer and the token
/// that stops the writer when the hub closes the connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Connection id (shared by a replacement connection).
    pub id: ConnectionId,
    /// Unique per physical connection.
    pub instance: Uuid,
    sender: mpsc::Sender<String>,
    cancel: CancellationToken,
    alive: AtomicBool,
    replaced: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle around an outbound sender.
    pub fn new(id: impl Into<ConnectionId>, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: id.into(),
            instance: Uuid::new_v4(),
            sender,
            cancel: CancellationToken::new(),
            alive: AtomicBool::new(true),
            replaced: AtomicBool::new(false),
        }
    }

    /// Queue a raw frame without waiting.
    pub fn try_deliver(&self, raw: String) -> SendOutcome {
        if !self.is_alive() {
            return SendOutcome::Closed;
        }
        match self.sender.try_send(raw) {
            Ok(()) => SendOutcome::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => SendOutcome::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                SendOutcome::Closed
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Mark dead and stop the writer.
    pub fn close(&self) {
        self.mark_dead();
        self.cancel.cancel();
    }

    /// Token cancelled when the hub closes this connection.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether a newer connection with the same id took over.
    pub fn is_replaced(&self) -> bool {
        self.replaced.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_replaced(&self) {
        self.replaced.store(true, Ordering::SeqCst);
    }
}
