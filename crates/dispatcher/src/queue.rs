//! DeliveryQueue - unbounded MPMC FIFO of serialized events

use async_channel::{Receiver, Sender, TryRecvError};

use contracts::SerializedEvent;

/// Unbounded, multi-producer multi-consumer FIFO.
///
/// `push` never blocks. Items leave the queue exactly once, either through
/// `try_pop`/`take_batch` or through `purge`. After `close` new pushes are
/// rejected while already-queued items remain poppable.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    tx: Sender<SerializedEvent>,
    rx: Receiver<SerializedEvent>,
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryQueue {
    pub fn new() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { tx, rx }
    }

    /// Enqueue an item. Returns false once the queue is closed.
    pub fn push(&self, item: SerializedEvent) -> bool {
        self.tx.try_send(item).is_ok()
    }

    /// Dequeue the oldest item without blocking
    pub fn try_pop(&self) -> Option<SerializedEvent> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Current number of queued items
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Pop up to `limit` items, stopping early when the queue empties
    pub fn take_batch(&self, limit: usize) -> Vec<SerializedEvent> {
        let mut batch = Vec::with_capacity(limit.min(self.len()));
        while batch.len() < limit {
            match self.try_pop() {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        batch
    }

    /// Reject further pushes. Returns true on the first call only.
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Drop every queued item, returning how many were discarded
    pub fn purge(&self) -> usize {
        let mut purged = 0;
        while self.try_pop().is_some() {
            purged += 1;
        }
        purged
    }
}
