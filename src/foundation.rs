//! Shared primitives and error types.

pub mod core;
pub mod error;
