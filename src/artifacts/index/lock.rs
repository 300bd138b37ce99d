use crate::errors::Result;
use file_guard::{FileGuard, Lock};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Exclusive advisory hold on the staging file
///
/// The lock lives as long as the guard and is released when it drops, on
/// every exit path. While held, all reads and writes of the staging file go
/// through the locked handle so the lock always covers the file being replaced.
pub struct IndexLock {
    guard: FileGuard<Box<File>>,
}

impl IndexLock {
    /// Block until the staging file at `path` is exclusively ours
    ///
    /// Creates an empty file when none exists yet.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let guard = file_guard::lock(Box::new(file), Lock::Exclusive, 0, 1)?;
        tracing::debug!(path = %path.display(), "acquired index lock");

        Ok(IndexLock { guard })
    }

    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let file = self.file();
        file.seek(SeekFrom::Start(0))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        Ok(contents)
    }

    pub fn replace_contents(&mut self, contents: &[u8]) -> Result<()> {
        let file = self.file();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(contents)?;
        file.sync_data()?;

        Ok(())
    }

    fn file(&mut self) -> &mut File {
        &mut self.guard
    }
}

impl std::fmt::Debug for IndexLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexLock").finish_non_exhaustive()
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        tracing::debug!("released index lock");
    }
}
