use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, ReadBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) marker: u32,
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn with_entries(entries_count: u32) -> Self {
        IndexHeader::new(SIGNATURE, VERSION, entries_count)
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(&self.marker.to_be_bytes());
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.entries_count.to_be_bytes());

        Bytes::from(bytes)
    }
}

impl Unpackable for IndexHeader {
    /// Decode and validate the header
    ///
    /// There is no fallback for other versions: a file of any version but the
    /// supported one is unreadable.
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| Error::IndexCorrupted("truncated header".to_string());

        let marker = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let version = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let entries_count = reader.read_u32::<NetworkEndian>().map_err(truncated)?;

        if marker != SIGNATURE {
            return Err(Error::InvalidMagic {
                what: "index",
                expected: SIGNATURE,
                actual: marker,
            });
        }

        if version != VERSION {
            return Err(Error::UnsupportedVersion {
                what: "index",
                version,
            });
        }

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}
