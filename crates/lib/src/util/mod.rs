//! Shared utilities.
//!
//! Content hashing, filesystem helpers and test fixtures.

pub mod fs;
pub mod hash;

#[cfg(test)]
pub mod testutil;
