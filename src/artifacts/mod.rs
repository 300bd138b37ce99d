//! On-disk formats and value types
//!
//! - `core`: zlib framing and trailing SHA-1 checksums shared by every file format
//! - `index`: staging file header, entries, modes and lock
//! - `objects`: object ids and the blob, tree and commit variants
//! - `pack`: pack bodies, pack indexes and their readers and writers

pub mod core;
pub mod index;
pub mod objects;
pub mod pack;
