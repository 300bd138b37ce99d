//! Object types and operations
//!
//! All content is stored as objects identified by SHA-1 hashes. There are three
//! persisted variants:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Directory listing (names, modes, and object IDs)
//! - **Commit**: Snapshot with metadata (root tree, parent, author, committer, message)
//!
//! Every object serializes as `<type> <size>\0<payload>`, and its id is the
//! SHA-1 of that whole sequence.

pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a raw SHA-1 hash in bytes
pub const OBJECT_ID_SIZE: usize = 20;
