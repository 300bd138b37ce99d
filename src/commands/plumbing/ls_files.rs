use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List staged paths; with `stage`, also their mode and blob id
    pub fn ls_files(&mut self, stage: bool) -> anyhow::Result<()> {
        let index = self.index(false)?;

        for entry in index.entries() {
            match stage {
                true => writeln!(
                    self.writer(),
                    "{} {} 0\t{}",
                    entry.metadata.mode,
                    entry.oid,
                    entry.name
                )?,
                false => writeln!(self.writer(), "{}", entry.name)?,
            }
        }

        Ok(())
    }
}
