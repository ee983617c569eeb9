//! # Message Handlers
//!
//! Routing of decoded protocol messages to the subsystems.

pub mod dispatcher;

pub use dispatcher::{DispatchError, Dispatcher};
