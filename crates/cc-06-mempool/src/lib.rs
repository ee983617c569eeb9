//! # Transaction Pool Subsystem (cc-06)
//!
//! FIFO queue of accepted transactions waiting for a miner. New entries are
//! appended at the tail; mining consumes from the head. The whole pool is
//! persisted to the `pending-pool` resource after every mutation.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | FIFO | `VecDeque` push-back / pop-front |
//! | At-most-once hand-out | `take_head` peeks and removes under one lock |
//! | Durable before visible | each mutation is persisted before the lock is released; a failed write rolls the in-memory queue back |

pub mod domain;

pub use domain::errors::MempoolError;
pub use domain::pool::TransactionPool;
