use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

impl Repository {
    pub fn hash_object(&mut self, object_path: &str, write: bool) -> anyhow::Result<()> {
        let object = Object::from_file(Path::new(object_path))
            .with_context(|| format!("Unable to read {object_path}"))?;
        let object_id = object.object_id();

        // write (if write is true) as compressed object file
        if write {
            self.database().add(&object)?;
        }

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
