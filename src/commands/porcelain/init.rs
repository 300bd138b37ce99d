use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub fn init(&mut self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .git/objects directory")?;

        fs::create_dir_all(self.database().pack_path())
            .context("Failed to create .git/objects/pack directory")?;

        // an empty staging file holds no entries
        let index_path = self.index_path();
        if !index_path.exists() {
            fs::write(&index_path, b"").context("Failed to create .git/index file")?;
        }

        write!(
            self.writer(),
            "Initialized empty Git repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
