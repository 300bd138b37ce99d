//! Content-addressed object store in the git on-disk format
//!
//! Objects (blobs, trees and commits) are addressed by the SHA-1 of their
//! serialized form and kept either as loose zlib files or inside pack files.
//! The staging index records paths for the next tree and folds them into
//! tree objects, optionally on top of a parent commit's tree.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

pub use errors::{Error, Result};
