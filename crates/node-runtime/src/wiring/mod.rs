//! # Wiring
//!
//! Connects the outside world to the dispatcher: the TCP listener and its
//! per-connection read-dispatch-reply loop.

pub mod listener;

pub use listener::NodeListener;
