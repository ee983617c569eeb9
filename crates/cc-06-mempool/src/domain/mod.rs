//! # Domain Layer - Transaction Pool

pub mod errors;
pub mod pool;
