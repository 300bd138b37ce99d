use crate::artifacts::core::zlib;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use fake::rand;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// One zlib-compressed file per object, sharded by the first id byte
#[derive(Debug)]
pub struct LooseStore {
    path: Box<Path>,
}

impl LooseStore {
    pub fn new(path: Box<Path>) -> Self {
        LooseStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.path.join(oid.to_path())
    }

    /// Store an object unless it is already present
    ///
    /// An existing regular file under the object's name is trusted to hold
    /// the same bytes and is left untouched.
    pub fn add(&self, object: &Object) -> Result<ObjectId> {
        let oid = object.object_id();
        let object_path = self.object_path(&oid);

        match std::fs::symlink_metadata(&object_path) {
            Ok(metadata) if metadata.is_file() => {
                tracing::trace!(%oid, "loose object already present");
                return Ok(oid);
            }
            Ok(_) => {
                return Err(Error::corrupt(format!(
                    "{} is not a regular file",
                    object_path.display()
                )));
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        self.write_object(&object_path, object)?;
        tracing::debug!(%oid, object_type = %object.object_type(), "wrote loose object");

        Ok(oid)
    }

    /// Read back an object, `None` when its file does not exist
    pub fn get(&self, oid: &ObjectId) -> Result<Option<Object>> {
        let compressed = match std::fs::read(self.object_path(oid)) {
            Ok(compressed) => compressed,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(Object::from_bytes(zlib::decompress(&compressed)?)))
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    fn write_object(&self, object_path: &Path, object: &Object) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::corrupt(format!("invalid object path {}", object_path.display())))?;
        std::fs::create_dir_all(object_dir)?;

        // write under a temporary name, then rename so readers never see a partial object
        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let content = zlib::compress(object.bytes())?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)?;
        if let Err(err) = file.write_all(&content) {
            let _ = std::fs::remove_file(&temp_object_path);
            return Err(err.into());
        }
        drop(file);

        std::fs::rename(&temp_object_path, object_path)?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
