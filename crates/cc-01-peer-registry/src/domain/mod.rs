//! # Domain Layer - Peer Registry

pub mod errors;
pub mod registry;
