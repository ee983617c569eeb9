//! # Domain Layer - Gossip

pub mod config;
pub mod errors;
pub mod report;
