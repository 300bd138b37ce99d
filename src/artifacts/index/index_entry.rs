//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path (relative to the worktree, `/`-separated)
//! - Content hash (blob object ID)
//! - Stat metadata captured when the file was staged
//!
//! ## Entry Format
//!
//! ```text
//! ctime, ctime_nsec, mtime, mtime_nsec, dev, ino, mode, uid, gid   u32 big-endian
//! size                                                             u32 little-endian
//! object id                                                        20 bytes
//! flags                                                            u16 big-endian
//! path                                                             NUL-terminated
//! padding                                                          7 - ((len + 6) % 8) zero bytes
//! ```
//!
//! The size field is little-endian, unlike every other field.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bitflags::bitflags;
use byteorder::{LittleEndian, NetworkEndian, ReadBytesExt};
use bytes::{BufMut, Bytes};
use derive_new::new;
use std::fs::Metadata;
use std::io::{BufRead, Read};
use std::os::unix::prelude::MetadataExt;
use std::path::Path;

/// Longest path length representable in the flags field
pub const MAX_PATH_SIZE: usize = 0xFFF;

bitflags! {
    /// 16-bit entry flags: a reserved top nibble and a 12-bit path length
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct EntryFlags: u16 {
        /// Reserved for future flags; preserved verbatim across load and save
        const RESERVED = 0xF000;
        /// Path length, capped at `MAX_PATH_SIZE`
        const NAME_LENGTH = 0x0FFF;
    }
}

impl EntryFlags {
    /// Keep the reserved bits and record the (capped) length of `name`
    pub fn for_name(self, name: &str) -> Self {
        let length = name.len().min(MAX_PATH_SIZE) as u16;
        EntryFlags::from_bits_retain((self.bits() & EntryFlags::RESERVED.bits()) | length)
    }

    pub fn name_length(&self) -> usize {
        (self.bits() & EntryFlags::NAME_LENGTH.bits()) as usize
    }
}

/// Number of zero bytes that follow the NUL terminator of a path of `name_length` bytes
pub fn padding_len(name_length: usize) -> usize {
    7 - ((name_length + 6) % 8)
}

/// Index entry representing a staged file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the worktree, `/`-separated
    pub name: String,
    /// Blob id of the staged content
    pub oid: ObjectId,
    /// Stat data captured at staging time
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// File name without its directories
    pub fn basename(&self) -> &str {
        basename(&self.name)
    }

    /// Directory holding the entry, `""` for top-level files
    pub fn parent(&self) -> &str {
        parent(&self.name)
    }

    /// Every ancestor directory, outermost first
    ///
    /// `a/b/c` yields `["a", "a/b"]`; a top-level file yields nothing.
    pub fn parent_dirs(&self) -> Vec<&str> {
        let mut dirs = Vec::new();
        let mut dir = self.parent();

        while !dir.is_empty() {
            dirs.push(dir);
            dir = parent(dir);
        }
        dirs.reverse();

        dirs
    }
}

/// Final component of a `/`-separated path
pub fn basename(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Everything before the final `/`, or `""` when there is none
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Stat data stored for each entry
///
/// Fields are kept at their on-disk width; wider values from the OS are
/// truncated to 32 bits when captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: u32,
    pub ctime_nsec: u32,
    /// Modification time (seconds since Unix epoch)
    pub mtime: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    /// File size in bytes
    pub size: u32,
    pub flags: EntryFlags,
}

impl TryFrom<(&Path, &Metadata)> for EntryMetadata {
    type Error = Error;

    fn try_from((file_path, metadata): (&Path, &Metadata)) -> Result<Self> {
        if metadata.is_dir() {
            return Err(Error::malformed(
                "staged path",
                format!("{} is a directory", file_path.display()),
            ));
        }

        Ok(Self {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode: EntryMode::from_metadata(file_path, metadata),
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
            flags: EntryFlags::default(),
        })
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Bytes {
        let metadata = &self.metadata;
        let mut entry_bytes = Vec::new();

        entry_bytes.put_u32(metadata.ctime);
        entry_bytes.put_u32(metadata.ctime_nsec);
        entry_bytes.put_u32(metadata.mtime);
        entry_bytes.put_u32(metadata.mtime_nsec);
        entry_bytes.put_u32(metadata.dev);
        entry_bytes.put_u32(metadata.ino);
        entry_bytes.put_u32(metadata.mode.as_u32());
        entry_bytes.put_u32(metadata.uid);
        entry_bytes.put_u32(metadata.gid);
        entry_bytes.put_u32_le(metadata.size);
        entry_bytes.put_slice(self.oid.as_bytes());
        entry_bytes.put_u16(metadata.flags.for_name(&self.name).bits());
        entry_bytes.put_slice(self.name.as_bytes());
        entry_bytes.put_u8(0);
        entry_bytes.put_bytes(0, padding_len(self.name.len()));

        Bytes::from(entry_bytes)
    }
}

impl Unpackable for IndexEntry {
    /// Decode one entry, consuming exactly its bytes (padding included)
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| Error::IndexCorrupted("truncated entry".to_string());

        let mut fields = [0u32; 9];
        reader
            .read_u32_into::<NetworkEndian>(&mut fields)
            .map_err(truncated)?;
        let [ctime, ctime_nsec, mtime, mtime_nsec, dev, ino, mode, uid, gid] = fields;
        let size = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        let oid = ObjectId::read_raw_from(&mut reader).map_err(truncated)?;
        let flags = EntryFlags::from_bits_retain(reader.read_u16::<NetworkEndian>().map_err(truncated)?);

        let mut name = Vec::new();
        reader.read_until(0, &mut name).map_err(truncated)?;
        if name.pop() != Some(0) {
            return Err(Error::IndexCorrupted(
                "missing NUL terminator in entry name".to_string(),
            ));
        }
        let name = String::from_utf8(name)
            .map_err(|_| Error::IndexCorrupted("entry name is not UTF-8".to_string()))?;

        let mut padding = vec![0u8; padding_len(name.len())];
        reader.read_exact(&mut padding).map_err(truncated)?;

        let mode = EntryMode::try_from(mode)
            .map_err(|_| Error::IndexCorrupted(format!("unknown mode {mode:o} for {name:?}")))?;

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}
