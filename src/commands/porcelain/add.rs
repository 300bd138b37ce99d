use crate::areas::repository::Repository;
use anyhow::Context;
use std::path::Path;

impl Repository {
    /// Stage files, expanding directories recursively
    pub fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index(true)?;

        let files = paths
            .iter()
            .map(|path| {
                self.workspace()
                    .list_files(Path::new(path))
                    .with_context(|| format!("pathspec '{path}' did not match any files"))
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten();

        for file in files {
            index
                .add(&file)
                .with_context(|| format!("Unable to stage {}", file.display()))?;
        }

        index.write_updates()?;

        Ok(())
    }
}
