//! Pack index: sorted ids with their CRC32 and body offset
//!
//! Built by the writer, parsed from an `.idx` file, or regenerated by scanning
//! a pack body. In every case entries are sorted by id before the first lookup.

use crate::artifacts::core::checksum::{self, Checksum};
use crate::artifacts::objects::OBJECT_ID_SIZE;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::pack::{
    FAN_OUT_SIZE, INDEX_SIGNATURE, INDEX_VERSION, LARGE_OFFSET_FLAG,
};
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, ReadBytesExt};
use bytes::{BufMut, Bytes};
use derive_new::new;
use std::io::Cursor;

/// Where one object lives inside a pack body
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct PackIndexEntry {
    pub oid: ObjectId,
    /// CRC32 of the decompressed payload
    pub crc32: u32,
    /// Byte offset of the object's record header in the pack body
    pub offset: u64,
    /// `Invalid` until the record header has been read
    pub object_type: ObjectType,
}

#[derive(Debug, Clone)]
pub struct PackIndex {
    entries: Vec<PackIndexEntry>,
    fan_out: [u32; FAN_OUT_SIZE],
    pack_checksum: ObjectId,
}

impl PackIndex {
    /// Sort entries by id and derive the fan-out table
    pub fn build(mut entries: Vec<PackIndexEntry>, pack_checksum: ObjectId) -> Self {
        entries.sort_by(|a, b| a.oid.cmp(&b.oid));

        let mut fan_out = [0u32; FAN_OUT_SIZE];
        for entry in &entries {
            fan_out[entry.oid.first_byte() as usize] += 1;
        }
        // fan_out[b] = count of ids with first byte <= b
        for bucket in 1..FAN_OUT_SIZE {
            fan_out[bucket] += fan_out[bucket - 1];
        }

        PackIndex {
            entries,
            fan_out,
            pack_checksum,
        }
    }

    /// Binary search for `oid` within its fan-out bucket
    pub fn lookup(&self, oid: &ObjectId) -> Option<&PackIndexEntry> {
        let bucket = oid.first_byte() as usize;
        let start = match bucket {
            0 => 0,
            _ => self.fan_out[bucket - 1] as usize,
        };
        let end = self.fan_out[bucket] as usize;

        let candidates = self.entries.get(start..end)?;
        candidates
            .binary_search_by(|probe| probe.oid.cmp(oid))
            .ok()
            .map(|position| &candidates[position])
    }

    pub fn entries(&self) -> &[PackIndexEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [PackIndexEntry] {
        &mut self.entries
    }

    pub fn fan_out(&self) -> &[u32; FAN_OUT_SIZE] {
        &self.fan_out
    }

    /// Trailer of the pack body this index describes
    pub fn pack_checksum(&self) -> ObjectId {
        self.pack_checksum
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as an `.idx` version 2 file
    pub fn serialize(&self) -> Result<Bytes> {
        let mut table = Vec::new();
        table.put_u32(INDEX_SIGNATURE);
        table.put_u32(INDEX_VERSION);
        for count in self.fan_out {
            table.put_u32(count);
        }
        for entry in &self.entries {
            table.put_slice(entry.oid.as_bytes());
        }
        for entry in &self.entries {
            table.put_u32(entry.crc32);
        }

        let mut large_offsets = Vec::new();
        for entry in &self.entries {
            match u32::try_from(entry.offset) {
                Ok(offset) if offset < LARGE_OFFSET_FLAG => table.put_u32(offset),
                _ => {
                    table.put_u32(LARGE_OFFSET_FLAG | (large_offsets.len() / 8) as u32);
                    large_offsets.put_u64(entry.offset);
                }
            }
        }
        table.put_slice(&large_offsets);
        table.put_slice(self.pack_checksum.as_bytes());

        let mut writer = Checksum::new(Vec::with_capacity(table.len() + OBJECT_ID_SIZE));
        writer.write(&table)?;
        let (bytes, _) = writer.write_checksum()?;

        Ok(Bytes::from(bytes))
    }

    /// Decode an `.idx` version 2 file
    ///
    /// Every count and offset is validated against the buffer before it is
    /// trusted. Entry types are left `Invalid`; the pack fills them in from
    /// the record headers.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let (body, _) = checksum::verify(bytes, "pack index")?;
        let malformed = |reason: &str| Error::malformed("pack index", reason.to_string());
        let truncated = |_| Error::malformed("pack index", "truncated");

        let mut reader = Cursor::new(body);
        let signature = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        if signature != INDEX_SIGNATURE {
            return Err(Error::InvalidMagic {
                what: "pack index",
                expected: INDEX_SIGNATURE,
                actual: signature,
            });
        }
        let version = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        if version != INDEX_VERSION {
            return Err(Error::UnsupportedVersion {
                what: "pack index",
                version,
            });
        }

        let mut fan_out = [0u32; FAN_OUT_SIZE];
        reader
            .read_u32_into::<NetworkEndian>(&mut fan_out)
            .map_err(truncated)?;
        if fan_out.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(malformed("fan-out table is not cumulative"));
        }

        let count = fan_out[FAN_OUT_SIZE - 1] as usize;
        // ids + crcs + offsets + pack checksum, before any large offset
        let fixed_size = count
            .checked_mul(OBJECT_ID_SIZE + 4 + 4)
            .and_then(|size| size.checked_add(OBJECT_ID_SIZE))
            .ok_or_else(|| malformed("object count overflows"))?;
        let remaining = body.len() - reader.position() as usize;
        if remaining < fixed_size {
            return Err(malformed("shorter than its object count"));
        }

        let mut oids = Vec::with_capacity(count);
        for _ in 0..count {
            oids.push(ObjectId::read_raw_from(&mut reader).map_err(truncated)?);
        }
        if oids.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(malformed("ids are not strictly ascending"));
        }

        let mut crcs = vec![0u32; count];
        reader
            .read_u32_into::<NetworkEndian>(&mut crcs)
            .map_err(truncated)?;
        let mut short_offsets = vec![0u32; count];
        reader
            .read_u32_into::<NetworkEndian>(&mut short_offsets)
            .map_err(truncated)?;

        let large_count = short_offsets
            .iter()
            .filter(|&&offset| offset & LARGE_OFFSET_FLAG != 0)
            .count();
        let mut large_offsets = vec![0u64; large_count];
        reader
            .read_u64_into::<NetworkEndian>(&mut large_offsets)
            .map_err(truncated)?;

        let pack_checksum = ObjectId::read_raw_from(&mut reader).map_err(truncated)?;
        if reader.position() as usize != body.len() {
            return Err(malformed("unexpected trailing bytes"));
        }

        let mut entries = Vec::with_capacity(count);
        for ((oid, crc32), offset) in oids.into_iter().zip(crcs).zip(short_offsets) {
            let offset = match offset & LARGE_OFFSET_FLAG {
                0 => u64::from(offset),
                _ => *large_offsets
                    .get((offset & !LARGE_OFFSET_FLAG) as usize)
                    .ok_or_else(|| malformed("large offset out of range"))?,
            };
            entries.push(PackIndexEntry::new(oid, crc32, offset, ObjectType::Invalid));
        }

        let index = PackIndex::build(entries, pack_checksum);
        if index.fan_out != fan_out {
            return Err(malformed("fan-out table disagrees with ids"));
        }

        Ok(index)
    }
}
