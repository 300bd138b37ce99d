use crate::artifacts::core::checksum::Checksum;
use crate::artifacts::core::zlib;
use crate::artifacts::objects::OBJECT_ID_SIZE;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::pack::pack_index::{PackIndex, PackIndexEntry};
use crate::artifacts::pack::{PACK_HEADER_SIZE, PACK_SIGNATURE, PACK_VERSION, object_header};
use crate::errors::{Error, Result};
use bytes::{BufMut, Bytes};
use std::collections::HashSet;

/// A finished pack body with its index, both still in memory
#[derive(Debug, Clone)]
pub struct WrittenPack {
    pub checksum: ObjectId,
    pub pack: Bytes,
    pub index: Bytes,
}

impl WrittenPack {
    /// `pack-<checksum>`, the stem shared by the `.pack` and `.idx` files
    pub fn file_stem(&self) -> String {
        format!("pack-{}", self.checksum)
    }
}

/// Builds a pack from whole objects
///
/// Records are laid out in the order objects are added; adding the same id a
/// second time is a no-op.
#[derive(Debug, Default)]
pub struct PackWriter {
    records: Vec<u8>,
    entries: Vec<PackIndexEntry>,
    seen: HashSet<ObjectId>,
}

impl PackWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: &Object) -> Result<()> {
        let oid = object.object_id();
        let object_type = object.object_type();
        if object_type == ObjectType::Invalid {
            return Err(Error::malformed(
                "pack entry",
                format!("object {oid} has no packable type"),
            ));
        }
        if !self.seen.insert(oid) {
            return Ok(());
        }

        let payload = object.data();
        let offset = (PACK_HEADER_SIZE + self.records.len()) as u64;

        self.records
            .put_slice(&object_header::encode(object_type, payload.len() as u64));
        self.records.put_slice(&zlib::compress(payload)?);
        self.entries.push(PackIndexEntry::new(
            oid,
            crc32fast::hash(payload),
            offset,
            object_type,
        ));

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> Result<WrittenPack> {
        let count = u32::try_from(self.entries.len())
            .map_err(|_| Error::malformed("pack", "too many objects"))?;

        let mut header = Vec::with_capacity(PACK_HEADER_SIZE);
        header.put_u32(PACK_SIGNATURE);
        header.put_u32(PACK_VERSION);
        header.put_u32(count);

        let mut writer = Checksum::new(Vec::with_capacity(
            PACK_HEADER_SIZE + self.records.len() + OBJECT_ID_SIZE,
        ));
        writer.write(&header)?;
        writer.write(&self.records)?;
        let (pack, checksum) = writer.write_checksum()?;

        let index = PackIndex::build(self.entries, checksum).serialize()?;
        tracing::debug!(%checksum, objects = count, bytes = pack.len(), "wrote pack");

        Ok(WrittenPack {
            checksum,
            pack: Bytes::from(pack),
            index,
        })
    }
}
