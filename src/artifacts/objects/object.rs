//! Serialized object
//!
//! An `Object` owns the full serialized byte sequence `<type> <size>\0<payload>`.
//! Its id is recomputed from those bytes on every call, never cached, so the
//! `id == sha1(bytes)` invariant cannot drift.

use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::io::BufRead;
use std::path::Path;

/// Encode a value into its binary form
pub trait Packable {
    fn serialize(&self) -> Bytes;
}

/// Decode a value from its binary form
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Immutable serialized object (blob, tree or commit)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    bytes: Bytes,
}

impl Object {
    /// Wrap a payload with its `<type> <size>\0` header
    pub fn with_payload(object_type: ObjectType, payload: &[u8]) -> Self {
        let header = format!("{} {}\0", object_type.as_str(), payload.len());

        let mut bytes = Vec::with_capacity(header.len() + payload.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(payload);

        Object {
            bytes: Bytes::from(bytes),
        }
    }

    /// Wrap an already serialized byte sequence, e.g. one read back from storage
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Object {
            bytes: bytes.into(),
        }
    }

    /// Blob holding the verbatim contents of a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        Ok(Self::with_payload(ObjectType::Blob, &content))
    }

    pub fn from_blob(content: &[u8]) -> Self {
        Self::with_payload(ObjectType::Blob, content)
    }

    pub fn from_tree(tree: &Tree) -> Self {
        Self::with_payload(ObjectType::Tree, &tree.serialize())
    }

    pub fn from_commit(commit: &Commit) -> Self {
        Self::with_payload(ObjectType::Commit, &commit.serialize())
    }

    /// Variant named by the header's leading token; `Invalid` when unrecognized
    pub fn object_type(&self) -> ObjectType {
        ObjectType::parse_header(&self.bytes)
    }

    /// Payload: every byte after the first NUL (empty when there is no NUL)
    pub fn data(&self) -> &[u8] {
        match self.bytes.iter().position(|&b| b == 0) {
            Some(nul) => &self.bytes[nul + 1..],
            None => &[],
        }
    }

    /// Full serialized form, header included
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn object_id(&self) -> ObjectId {
        ObjectId::hash(&self.bytes)
    }

    /// Decode the payload as a tree
    ///
    /// A non-tree object in a tree position means the store is inconsistent,
    /// so this fails with `CorruptRepository` rather than a decode error.
    pub fn read_as_tree(&self) -> Result<Tree> {
        self.expect_type(ObjectType::Tree)?;
        Tree::deserialize(self.data())
    }

    /// Decode the payload as a commit, see [`Object::read_as_tree`]
    pub fn read_as_commit(&self) -> Result<Commit> {
        self.expect_type(ObjectType::Commit)?;
        Commit::deserialize(self.data())
    }

    fn expect_type(&self, expected: ObjectType) -> Result<()> {
        match self.object_type() {
            actual if actual == expected => Ok(()),
            actual => Err(Error::corrupt(format!(
                "object {} is a {actual} where a {expected} was expected",
                self.object_id()
            ))),
        }
    }

    /// Human-readable payload, the way `cat-file -p` prints it
    pub fn display(&self) -> Result<String> {
        match self.object_type() {
            ObjectType::Tree => Ok(self.read_as_tree()?.display()),
            _ => Ok(String::from_utf8_lossy(self.data()).into_owned()),
        }
    }
}
