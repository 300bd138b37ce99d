//! Tree object
//!
//! Trees represent directory snapshots. They hold entries for files (blobs)
//! and subdirectories (other trees), along with their names and modes.
//!
//! ## Format
//!
//! Payload: a concatenation of `<6-digit-octal-mode> <name>\0<20-byte-id>` records.
//!
//! Entries are kept in canonical order: byte order of the name, with directory
//! names compared as if they ended in `/`. Equal content therefore always
//! serializes to the same bytes and the same id.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::BufRead;

/// One named child of a tree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    fn canonical_cmp(&self, name: &str, mode: EntryMode) -> Ordering {
        let suffix = |mode: EntryMode| mode.is_directory().then_some(b'/');

        self.name
            .bytes()
            .chain(suffix(self.mode))
            .cmp(name.bytes().chain(suffix(mode)))
    }
}

/// Directory snapshot: an ordered list of uniquely named entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Insert an entry, replacing any entry with the same name
    ///
    /// # Returns
    ///
    /// The entry previously stored under that name, if any
    pub fn set(&mut self, entry: TreeEntry) -> Option<TreeEntry> {
        let replaced = self.remove(&entry.name);

        let position = self
            .entries
            .partition_point(|existing| existing.canonical_cmp(&entry.name, entry.mode).is_lt());
        self.entries.insert(position, entry);

        replaced
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<TreeEntry> {
        let position = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(position))
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `ls-tree` style listing, one entry per line
    pub fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let kind = if entry.mode.is_directory() { "tree" } else { "blob" };
                format!("{} {} {}\t{}", entry.mode, kind, entry.oid, entry.name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Bytes {
        let mut payload = Vec::new();

        for entry in &self.entries {
            payload.extend_from_slice(format!("{:06o} {}", entry.mode.as_u32(), entry.name).as_bytes());
            payload.push(0);
            payload.extend_from_slice(entry.oid.as_bytes());
        }

        Bytes::from(payload)
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut entries: Vec<TreeEntry> = Vec::new();
        let mut names = HashSet::new();

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(Error::malformed("tree", "unexpected end of data in mode"));
            }

            let mode = std::str::from_utf8(&mode_bytes)
                .map_err(|_| Error::malformed("tree", "non-ASCII mode"))?;
            let mode = EntryMode::from_octal_str(mode)?;

            // Read "name\0"
            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(Error::malformed("tree", "unexpected end of data in name"));
            }
            let name = String::from_utf8(name_bytes.clone())
                .map_err(|_| Error::malformed("tree", "entry name is not UTF-8"))?;

            let oid = ObjectId::read_raw_from(&mut reader)
                .map_err(|_| Error::malformed("tree", format!("truncated id for {name:?}")))?;

            if !names.insert(name.clone()) {
                return Err(Error::malformed("tree", format!("duplicate entry {name:?}")));
            }
            if let Some(last) = entries.last()
                && !last.canonical_cmp(&name, mode).is_lt()
            {
                return Err(Error::malformed(
                    "tree",
                    format!("entry {name:?} is out of order"),
                ));
            }

            entries.push(TreeEntry::new(mode, name, oid));
        }

        Ok(Tree { entries })
    }
}
