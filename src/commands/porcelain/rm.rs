use crate::areas::repository::Repository;
use crate::areas::workspace::absolute_path;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Unstage paths, leaving the working files alone
    pub fn rm(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index(true)?;

        for path in paths {
            let absolute = absolute_path(Path::new(path))
                .with_context(|| format!("Unable to resolve {path}"))?;
            index
                .remove(&absolute)
                .with_context(|| format!("Unable to unstage {path}"))?;
            writeln!(self.writer(), "rm '{path}'")?;
        }

        index.write_updates()?;

        Ok(())
    }
}
