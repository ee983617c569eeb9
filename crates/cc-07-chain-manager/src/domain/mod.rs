//! # Domain Layer - Chain Manager

pub mod errors;
pub mod ledger;
pub mod outcomes;
