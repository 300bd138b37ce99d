//! Core utilities shared by the loose store, the staging index and packs
//!
//! - `checksum`: trailing SHA-1 digests over whole files
//! - `zlib`: compression framing for stored objects

pub mod checksum;
pub mod zlib;
