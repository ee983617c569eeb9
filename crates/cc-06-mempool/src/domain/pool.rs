//! # Pending Pool

use super::errors::MempoolError;
use cc_02_chain_storage::{read_json, write_json, BlobStore, Resource};
use parking_lot::Mutex;
use shared_types::PendingEntry;
use std::collections::VecDeque;
use std::sync::Arc;

/// Persisted FIFO of pending entries.
pub struct TransactionPool {
    store: Arc<dyn BlobStore>,
    queue: Mutex<VecDeque<PendingEntry>>,
}

impl std::fmt::Debug for TransactionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionPool")
            .field("len", &self.queue.lock().len())
            .finish()
    }
}

impl TransactionPool {
    /// Load the pool from `store`; an absent resource is an empty pool.
    pub fn open(store: Arc<dyn BlobStore>) -> Result<Self, MempoolError> {
        let entries: Vec<PendingEntry> =
            read_json(store.as_ref(), Resource::PendingPool)?.unwrap_or_default();
        tracing::debug!(pending = entries.len(), "Loaded pending pool");
        Ok(Self {
            store,
            queue: Mutex::new(entries.into()),
        })
    }

    /// Append `entry` at the tail.
    pub fn enqueue(&self, entry: PendingEntry) -> Result<(), MempoolError> {
        let mut queue = self.queue.lock();
        queue.push_back(entry);
        if let Err(e) = self.persist(&queue) {
            queue.pop_back();
            return Err(e);
        }
        tracing::debug!(pending = queue.len(), "Enqueued pending transaction");
        Ok(())
    }

    /// The head entry, without removing it.
    pub fn peek_head(&self) -> Option<PendingEntry> {
        self.queue.lock().front().cloned()
    }

    /// Remove the head entry. Removing from an empty pool is a no-op.
    pub fn dequeue_head(&self) -> Result<Option<PendingEntry>, MempoolError> {
        let mut queue = self.queue.lock();
        Self::pop_persisted(&mut queue, |q| self.persist(q))
    }

    /// Peek and remove the head under one lock, so concurrent miners are
    /// never handed the same entry.
    pub fn take_head(&self) -> Result<Option<PendingEntry>, MempoolError> {
        let mut queue = self.queue.lock();
        let taken = Self::pop_persisted(&mut queue, |q| self.persist(q))?;
        if let Some(entry) = &taken {
            tracing::info!(index = entry.index, from = %entry.transaction.from_address, "Handed pending transaction to miner");
        }
        Ok(taken)
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Snapshot in FIFO order.
    pub fn entries(&self) -> Vec<PendingEntry> {
        self.queue.lock().iter().cloned().collect()
    }

    fn pop_persisted(
        queue: &mut VecDeque<PendingEntry>,
        persist: impl FnOnce(&VecDeque<PendingEntry>) -> Result<(), MempoolError>,
    ) -> Result<Option<PendingEntry>, MempoolError> {
        let Some(head) = queue.pop_front() else {
            return Ok(None);
        };
        if let Err(e) = persist(queue) {
            queue.push_front(head);
            return Err(e);
        }
        Ok(Some(head))
    }

    fn persist(&self, queue: &VecDeque<PendingEntry>) -> Result<(), MempoolError> {
        let (front, back) = queue.as_slices();
        let entries: Vec<&PendingEntry> = front.iter().chain(back).collect();
        write_json(self.store.as_ref(), Resource::PendingPool, &entries)?;
        Ok(())
    }
}
