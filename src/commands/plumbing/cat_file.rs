use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

/// What `cat-file` prints about an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    /// Payload, trees listed entry by entry
    Pretty,
    Type,
    Size,
}

impl Repository {
    pub fn cat_file(&mut self, object_id: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let oid = ObjectId::try_parse(object_id)?;
        let object = self
            .database()
            .get(&oid)?
            .ok_or_else(|| anyhow::anyhow!("Not a valid object name {object_id}"))?;

        match mode {
            CatFileMode::Pretty => write!(self.writer(), "{}", object.display()?)?,
            CatFileMode::Type => writeln!(self.writer(), "{}", object.object_type())?,
            CatFileMode::Size => writeln!(self.writer(), "{}", object.data().len())?,
        }

        Ok(())
    }
}
