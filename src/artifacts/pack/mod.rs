//! Pack files
//!
//! A pack is an immutable container of many individually zlib-compressed
//! objects, paired with an index for id → offset lookups. Objects are stored
//! whole; there is no delta encoding between entries.
//!
//! ## Pack body
//!
//! ```text
//! "PACK" | version 2 | object count           (u32 big-endian each)
//! records: <type+size varint><zlib payload>   (writer order)
//! SHA-1 of every preceding byte
//! ```
//!
//! ## Index (`.idx`, version 2)
//!
//! ```text
//! "\xfftOc" | version 2
//! fan-out: 256 cumulative counts keyed by the first id byte
//! sorted ids | CRC32 per object | 32-bit offsets | 64-bit offsets
//! pack checksum | SHA-1 of every preceding byte
//! ```

pub mod object_header;
pub mod pack_index;
pub mod reader;
pub mod writer;

/// "PACK"
pub const PACK_SIGNATURE: u32 = 0x5041_434B;
pub const PACK_VERSION: u32 = 2;
/// Signature, version and object count
pub const PACK_HEADER_SIZE: usize = 12;

/// "\xfftOc"
pub const INDEX_SIGNATURE: u32 = 0xFF74_4F63;
pub const INDEX_VERSION: u32 = 2;

/// Number of fan-out buckets, one per possible leading id byte
pub const FAN_OUT_SIZE: usize = 256;

/// Set on a 32-bit offset that indexes the 64-bit offset table instead
pub const LARGE_OFFSET_FLAG: u32 = 0x8000_0000;
