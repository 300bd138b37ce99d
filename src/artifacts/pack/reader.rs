use crate::artifacts::core::{checksum, zlib};
use crate::artifacts::objects::OBJECT_ID_SIZE;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::pack::object_header::{self, ObjectHeader};
use crate::artifacts::pack::pack_index::{PackIndex, PackIndexEntry};
use crate::artifacts::pack::{PACK_HEADER_SIZE, PACK_SIGNATURE, PACK_VERSION};
use crate::errors::{Error, Result};
use byteorder::{ByteOrder, NetworkEndian};
use bytes::Bytes;
use memmap2::Mmap;
use std::ops::Deref;
use std::path::Path;

/// Pack body bytes, owned or mapped read-only from disk
#[derive(Debug)]
enum PackData {
    Owned(Bytes),
    Mapped(Mmap),
}

impl Deref for PackData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            PackData::Owned(bytes) => &bytes[..],
            PackData::Mapped(map) => &map[..],
        }
    }
}

/// One decoded record of a pack body
struct Record {
    header: ObjectHeader,
    payload: Vec<u8>,
    /// Header plus compressed payload
    len: usize,
}

/// Read-only pack: a validated body plus a sorted index over it
///
/// Every offset of the index has been checked against the body and every
/// entry carries the type found in its record header, so lookups never read
/// out of bounds.
#[derive(Debug)]
pub struct Pack {
    data: PackData,
    index: PackIndex,
}

impl Pack {
    /// Load a pack from raw bytes
    ///
    /// An empty `index` means none is available; the index is then
    /// regenerated by scanning the body.
    pub fn from_bytes(pack: impl Into<Bytes>, index: &[u8]) -> Result<Self> {
        let data = PackData::Owned(pack.into());
        let index = match index.is_empty() {
            true => None,
            false => Some(PackIndex::parse(index)?),
        };

        Self::load(data, index)
    }

    /// Map the pack at `path` and read its sibling `.idx`
    ///
    /// A missing `.idx` is regenerated in memory; nothing is written back.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        // SAFETY: pack files are never modified once written; the map is read-only.
        let map = unsafe { Mmap::map(&file)? };

        let index_path = path.with_extension("idx");
        let index = match std::fs::read(&index_path) {
            Ok(bytes) => Some(PackIndex::parse(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(pack = %path.display(), "pack index missing, regenerating");
                None
            }
            Err(err) => return Err(err.into()),
        };

        Self::load(PackData::Mapped(map), index)
    }

    fn load(data: PackData, index: Option<PackIndex>) -> Result<Self> {
        let (count, checksum) = validate_body(&data)?;

        let index = match index {
            Some(mut index) => {
                resolve_types(&data, count, checksum, &mut index)?;
                index
            }
            None => regenerate(&data, count, checksum)?,
        };

        Ok(Pack { data, index })
    }

    /// Object stored under `oid`, or `None` when this pack does not hold it
    pub fn get(&self, oid: &ObjectId) -> Result<Option<Object>> {
        let Some(entry) = self.index.lookup(oid) else {
            return Ok(None);
        };

        let record = read_record(&self.data, entry.offset)?;
        if crc32fast::hash(&record.payload) != entry.crc32 {
            return Err(Error::corrupt(format!(
                "pack entry {oid} fails its CRC check"
            )));
        }

        let object = Object::with_payload(record.header.object_type, &record.payload);
        if object.object_id() != *oid {
            return Err(Error::corrupt(format!(
                "pack entry {oid} hashes to {}",
                object.object_id()
            )));
        }

        Ok(Some(object))
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.index.lookup(oid).is_some()
    }

    pub fn index(&self) -> &PackIndex {
        &self.index
    }

    /// Trailer of the pack body, which also names the pack on disk
    pub fn checksum(&self) -> ObjectId {
        self.index.pack_checksum()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Check signature, version and trailer; returns the object count and checksum
fn validate_body(data: &[u8]) -> Result<(u32, ObjectId)> {
    if data.len() < PACK_HEADER_SIZE + OBJECT_ID_SIZE {
        return Err(Error::malformed("pack", "shorter than header and trailer"));
    }

    let signature = NetworkEndian::read_u32(&data[0..4]);
    if signature != PACK_SIGNATURE {
        return Err(Error::InvalidMagic {
            what: "pack",
            expected: PACK_SIGNATURE,
            actual: signature,
        });
    }
    let version = NetworkEndian::read_u32(&data[4..8]);
    if version != PACK_VERSION {
        return Err(Error::UnsupportedVersion {
            what: "pack",
            version,
        });
    }
    let count = NetworkEndian::read_u32(&data[8..12]);
    let (_, checksum) = checksum::verify(data, "pack")?;

    Ok((count, checksum))
}

/// Slice from `offset` to the start of the trailer, if `offset` lies on a record
fn records_from(data: &[u8], offset: u64) -> Result<&[u8]> {
    let end = data.len() - OBJECT_ID_SIZE;

    match usize::try_from(offset) {
        Ok(start) if (PACK_HEADER_SIZE..end).contains(&start) => Ok(&data[start..end]),
        _ => Err(Error::corrupt(format!(
            "pack offset {offset} lies outside the object records"
        ))),
    }
}

fn read_header(data: &[u8], offset: u64) -> Result<ObjectHeader> {
    let header = object_header::decode(records_from(data, offset)?)?;
    if header.object_type == ObjectType::Invalid {
        return Err(Error::corrupt(format!(
            "pack record at {offset} has an unknown type"
        )));
    }

    Ok(header)
}

fn read_record(data: &[u8], offset: u64) -> Result<Record> {
    let header = read_header(data, offset)?;
    let compressed = &records_from(data, offset)?[header.len..];
    let (payload, consumed) = zlib::decompress_prefix(compressed)?;

    if payload.len() as u64 != header.size {
        return Err(Error::corrupt(format!(
            "pack record at {offset} declares {} bytes but holds {}",
            header.size,
            payload.len()
        )));
    }

    Ok(Record {
        header,
        payload,
        len: header.len + consumed,
    })
}

/// Fill in entry types from the record headers, validating every offset
fn resolve_types(data: &[u8], count: u32, checksum: ObjectId, index: &mut PackIndex) -> Result<()> {
    if index.pack_checksum() != checksum {
        return Err(Error::corrupt(format!(
            "pack index belongs to pack {}, not {checksum}",
            index.pack_checksum()
        )));
    }
    if index.len() != count as usize {
        return Err(Error::corrupt(format!(
            "pack holds {count} objects but its index lists {}",
            index.len()
        )));
    }

    for entry in index.entries_mut() {
        entry.object_type = read_header(data, entry.offset)?.object_type;
    }

    Ok(())
}

/// Rebuild the index by walking every record of the body in order
fn regenerate(data: &[u8], count: u32, checksum: ObjectId) -> Result<PackIndex> {
    let end = (data.len() - OBJECT_ID_SIZE) as u64;
    let mut offset = PACK_HEADER_SIZE as u64;
    // every record takes at least two bytes, whatever the header claims
    let mut entries = Vec::with_capacity((count as usize).min(data.len() / 2));

    for _ in 0..count {
        let record = read_record(data, offset)?;
        let object_type = record.header.object_type;
        let object = Object::with_payload(object_type, &record.payload);

        entries.push(PackIndexEntry::new(
            object.object_id(),
            crc32fast::hash(&record.payload),
            offset,
            object_type,
        ));
        offset += record.len as u64;
    }

    if offset != end {
        return Err(Error::corrupt(format!(
            "pack declares {count} objects but records end at {offset} of {end}"
        )));
    }
    tracing::debug!(%checksum, objects = count, "regenerated pack index");

    Ok(PackIndex::build(entries, checksum))
}
