//! # Subsystem Container
//!
//! Configuration loading and the dependency-injection container that builds
//! each subsystem and hands adapters to the ports that need them.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig, SignatureMode};
pub use subsystems::SubsystemContainer;
