//! Error taxonomy shared by every store and codec in the crate
//!
//! Absence is not an error: lookups return `Ok(None)` when an id or path is missing.
//! The variants below separate malformed input (rejected outright) from a store that
//! violates its own invariants (`CorruptRepository`, `IndexCorrupted`).

use crate::artifacts::objects::object_id::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The on-disk store contradicts itself: wrong object variant in a typed position,
    /// a dangling tree entry, an unresolvable parent commit, a non-file in a loose slot.
    #[error("repository corrupted: {0}")]
    CorruptRepository(String),

    /// The staging file failed its trailing checksum or could not be decoded.
    #[error("index corrupted: {0}")]
    IndexCorrupted(String),

    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),

    #[error("invalid user specification: {0:?}")]
    InvalidUser(String),

    #[error("malformed {what}: {reason}")]
    Malformed { what: &'static str, reason: String },

    #[error("invalid {what} signature: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic {
        what: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("unsupported {what} version: {version}")]
    UnsupportedVersion { what: &'static str, version: u32 },

    #[error("{what} checksum does not match its trailer")]
    ChecksumMismatch { what: &'static str },

    /// Raised when an operation needs an object the database does not hold,
    /// e.g. packing an id that was never stored.
    #[error("object {0} is not in the database")]
    MissingObject(ObjectId),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(what: &'static str, reason: impl Into<String>) -> Self {
        Error::Malformed {
            what,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Error::CorruptRepository(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
