//! Staging index file format
//!
//! The index (staging area) records which paths go into the next tree,
//! together with the stat data they had when they were staged.
//!
//! ## File Format (Version 2)
//!
//! ```text
//! Header (12 bytes, big-endian):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (ascending path order):
//!   - Stat fields, 32 bits each (big-endian, except the size which is little-endian)
//!   - 20-byte object id, 16-bit flags, NUL-terminated path
//!   - Zero padding so the entry ends on an 8-byte boundary
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod entry_mode;
pub mod index_entry;
pub mod index_header;
pub mod lock;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Magic signature identifying index files ("DIRC")
pub const SIGNATURE: u32 = 0x4449_5243;

/// Index file format version
pub const VERSION: u32 = 2;
