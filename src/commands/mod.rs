//! Command implementations
//!
//! Commands are organized into two categories following Git's architecture:
//!
//! - `plumbing`: Low-level commands for direct object manipulation (hash-object, write-tree, ...)
//! - `porcelain`: User-facing commands (init, add, rm, commit)

pub mod plumbing;
pub mod porcelain;
