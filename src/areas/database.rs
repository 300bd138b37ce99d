use crate::areas::loose::LooseStore;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::pack::reader::Pack;
use crate::artifacts::pack::writer::{PackWriter, WrittenPack};
use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};

const PACK_DIR: &str = "pack";

/// Object database: the loose store first, then every attached pack
///
/// Packs are consulted in the order they were attached and are never
/// removed or reordered.
#[derive(Debug)]
pub struct Database {
    loose: LooseStore,
    packs: Vec<Pack>,
}

impl Database {
    /// Database over `objects_path` with no packs attached
    pub fn new(objects_path: Box<Path>) -> Self {
        Database {
            loose: LooseStore::new(objects_path),
            packs: Vec::new(),
        }
    }

    /// Database over `objects_path` with every pack under `pack/` attached
    ///
    /// Packs are attached in file-name order.
    pub fn open(objects_path: Box<Path>) -> Result<Self> {
        let mut database = Self::new(objects_path);

        let pack_dir = database.pack_path();
        let mut pack_paths = match std::fs::read_dir(&pack_dir) {
            Ok(entries) => entries
                .map(|entry| entry.map(|entry| entry.path()))
                .collect::<std::io::Result<Vec<_>>>()?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        pack_paths.retain(|path| path.extension().is_some_and(|ext| ext == "pack"));
        pack_paths.sort();

        for path in pack_paths {
            database.add_pack(Pack::open(&path)?);
        }

        Ok(database)
    }

    pub fn objects_path(&self) -> &Path {
        self.loose.path()
    }

    pub fn pack_path(&self) -> PathBuf {
        self.loose.path().join(PACK_DIR)
    }

    pub fn loose(&self) -> &LooseStore {
        &self.loose
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    /// Look an object up, loose store first
    pub fn get(&self, oid: &ObjectId) -> Result<Option<Object>> {
        if let Some(object) = self.loose.get(oid)? {
            return Ok(Some(object));
        }

        for pack in &self.packs {
            if let Some(object) = pack.get(oid)? {
                return Ok(Some(object));
            }
        }

        Ok(None)
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.loose.contains(oid) || self.packs.iter().any(|pack| pack.contains(oid))
    }

    /// Store an object in the loose store
    pub fn add(&self, object: &Object) -> Result<ObjectId> {
        self.loose.add(object)
    }

    pub fn add_pack(&mut self, pack: Pack) {
        tracing::debug!(checksum = %pack.checksum(), objects = pack.len(), "attached pack");
        self.packs.push(pack);
    }

    /// Attach a pack given as raw bytes; an empty `index` is regenerated
    pub fn attach_pack(&mut self, pack: impl Into<bytes::Bytes>, index: &[u8]) -> Result<()> {
        let pack = Pack::from_bytes(pack, index)?;
        self.add_pack(pack);

        Ok(())
    }

    /// Tree stored under `oid`
    ///
    /// An absent object or one of another type fails with `CorruptRepository`:
    /// callers only ask for trees that something else references.
    pub fn load_tree(&self, oid: &ObjectId) -> Result<Tree> {
        self.get(oid)?
            .ok_or_else(|| Error::corrupt(format!("tree {oid} is missing")))?
            .read_as_tree()
    }

    /// Commit stored under `oid`, see [`Database::load_tree`]
    pub fn load_commit(&self, oid: &ObjectId) -> Result<Commit> {
        self.get(oid)?
            .ok_or_else(|| Error::corrupt(format!("commit {oid} is missing")))?
            .read_as_commit()
    }

    /// Build a pack holding the given objects, in the given order
    pub fn write_pack<'a>(&self, oids: impl IntoIterator<Item = &'a ObjectId>) -> Result<WrittenPack> {
        let mut writer = PackWriter::new();
        for oid in oids {
            let object = self.get(oid)?.ok_or(Error::MissingObject(*oid))?;
            writer.add(&object)?;
        }

        writer.finish()
    }

    /// Write a pack of the given objects under `pack/` and attach it
    ///
    /// # Returns
    ///
    /// The path of the new `.pack` file
    pub fn install_pack<'a>(
        &mut self,
        oids: impl IntoIterator<Item = &'a ObjectId>,
    ) -> Result<PathBuf> {
        let written = self.write_pack(oids)?;

        let pack_dir = self.pack_path();
        std::fs::create_dir_all(&pack_dir)?;
        let pack_path = pack_dir.join(format!("{}.pack", written.file_stem()));
        let index_path = pack_path.with_extension("idx");

        // index last, so a pack is never listed with an index it does not match
        std::fs::write(&pack_path, &written.pack)?;
        std::fs::write(&index_path, &written.index)?;

        self.attach_pack(written.pack, &written.index)?;
        tracing::debug!(pack = %pack_path.display(), "installed pack");

        Ok(pack_path)
    }
}
