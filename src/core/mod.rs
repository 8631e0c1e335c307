//! Shared infrastructure: terminal reporting and error types.

pub mod error;
pub mod output;
