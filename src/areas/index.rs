//! Staging area
//!
//! The index records the paths staged for the next tree along with the stat
//! data they had when staged, and folds them into tree objects on demand.
//!
//! ## Data Structures
//!
//! - `entries`: staged files keyed by `/`-separated path relative to the worktree
//! - `children`: every directory mapped to the staged files below it, so staging
//!   a file over a directory (or the reverse) can drop the entries it replaces

use crate::areas::database::Database;
use crate::artifacts::core::checksum::{self, Checksum};
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::{self, EntryMetadata, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::lock::IndexLock;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::path::{Component, Path};

/// Staging area bound to one database
///
/// When opened with a lock, the staging file stays exclusively held until the
/// index is dropped. Dropping an index whose entries changed since they were
/// loaded writes them back.
#[derive(Debug)]
pub struct Index<'db> {
    /// Path to the staging file (typically `.git/index`)
    path: Box<Path>,
    /// Directory staged paths are relative to
    worktree: Box<Path>,
    database: &'db Database,
    entries: BTreeMap<String, IndexEntry>,
    children: BTreeMap<String, BTreeSet<String>>,
    lock: Option<IndexLock>,
    /// Entries differ from what was last loaded or written
    changed: bool,
}

impl<'db> Index<'db> {
    /// Empty, unlocked index; nothing is read until [`Index::load`]
    pub fn new(database: &'db Database, path: Box<Path>, worktree: Box<Path>) -> Self {
        Index {
            path,
            worktree,
            database,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            lock: None,
            changed: false,
        }
    }

    /// Load the staging file, first taking the exclusive lock if `with_lock` is set
    pub fn open(
        database: &'db Database,
        path: Box<Path>,
        worktree: Box<Path>,
        with_lock: bool,
    ) -> Result<Self> {
        let mut index = Self::new(database, path, worktree);
        if with_lock {
            index.lock = Some(IndexLock::acquire(&index.path)?);
        }
        index.load()?;

        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Replace the in-memory entries with the contents of the staging file
    ///
    /// A missing or empty file holds no entries. A file failing its checksum
    /// fails with `IndexCorrupted` and leaves the index empty.
    pub fn load(&mut self) -> Result<()> {
        self.clear();

        let bytes = match &mut self.lock {
            Some(lock) => lock.read_all()?,
            None => match std::fs::read(&self.path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                Err(err) => return Err(err.into()),
            },
        };
        if bytes.is_empty() {
            return Ok(());
        }

        if let Err(err) = self.parse(&bytes) {
            self.clear();
            return Err(err);
        }
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "loaded index");

        Ok(())
    }

    fn parse(&mut self, bytes: &[u8]) -> Result<()> {
        let (body, _) = checksum::verify(bytes, "index").map_err(|err| match err {
            Error::ChecksumMismatch { .. } => {
                Error::IndexCorrupted("checksum does not match contents".to_string())
            }
            err => err,
        })?;

        let mut reader = Cursor::new(body);
        let header = IndexHeader::deserialize(&mut reader)?;
        for _ in 0..header.entries_count {
            let entry = IndexEntry::deserialize(&mut reader)?;
            self.store_entry(entry);
        }

        if reader.position() as usize != body.len() {
            return Err(Error::IndexCorrupted(
                "unexpected bytes after the last entry".to_string(),
            ));
        }

        Ok(())
    }

    /// Persist the entries, sorted by path, followed by their checksum
    pub fn write_updates(&mut self) -> Result<()> {
        let count = u32::try_from(self.entries.len())
            .map_err(|_| Error::malformed("index", "too many entries"))?;

        let mut writer = Checksum::new(Vec::new());
        writer.write(&IndexHeader::with_entries(count).serialize())?;
        for entry in self.entries.values() {
            writer.write(&entry.serialize())?;
        }
        let (bytes, _) = writer.write_checksum()?;

        match &mut self.lock {
            Some(lock) => lock.replace_contents(&bytes)?,
            None => std::fs::write(&self.path, &bytes)?,
        }
        self.changed = false;
        tracing::debug!(path = %self.path.display(), entries = count, "wrote index");

        Ok(())
    }

    /// Stage the file at `path`
    ///
    /// `path` is either relative to the worktree or an absolute path inside it.
    /// The file's content is stored as a blob and its entry replaces any entry
    /// for the same path, any staged file where one of its directories should
    /// be, and everything staged under it as a directory.
    ///
    /// # Returns
    ///
    /// The id of the stored blob
    pub fn add(&mut self, path: &Path) -> Result<ObjectId> {
        let name = self.entry_name(path)?;
        let file_path = self.worktree.join(&name);

        let metadata = std::fs::symlink_metadata(&file_path)?;
        let stat = EntryMetadata::try_from((file_path.as_path(), &metadata))?;
        let content = match stat.mode {
            EntryMode::Symlink => link_target(&file_path)?,
            _ => std::fs::read(&file_path)?,
        };

        let oid = self.database.add(&Object::with_payload(ObjectType::Blob, &content))?;
        let entry = IndexEntry::new(name, oid, stat);
        tracing::trace!(path = %entry.name, %oid, "staged");

        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;

        Ok(oid)
    }

    /// Unstage `path`, or everything under it when it names a directory
    ///
    /// Unstaging a path that is not staged is a no-op.
    pub fn remove(&mut self, path: &Path) -> Result<()> {
        let name = self.entry_name(path)?;

        let before = self.entries.len();
        self.remove_entry(&name);
        self.remove_children(&name);
        self.changed |= self.entries.len() != before;

        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn entry(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold every staged path into a hierarchy of trees
    ///
    /// With a `parent` commit, its root tree seeds the result: directories
    /// are loaded from it on first use, and everything not staged over is kept
    /// as it was. Every tree below the root is stored; the root itself is
    /// returned unstored.
    pub fn to_tree(&self, parent: Option<&ObjectId>) -> Result<Object> {
        let root = match parent {
            Some(parent) => {
                let commit = self.database.load_commit(parent)?;
                self.database.load_tree(&commit.tree_oid)?
            }
            None => Tree::default(),
        };

        // pending trees keyed by directory path, "" being the root
        let mut pending = BTreeMap::from([(String::new(), root)]);

        for entry in self.entries.values() {
            let dir = entry.parent();
            self.materialize(&mut pending, dir)?;

            pending
                .get_mut(dir)
                .ok_or_else(|| Error::corrupt(format!("directory {dir:?} was not loaded")))?
                .set(TreeEntry::new(
                    entry.metadata.mode,
                    entry.basename().to_string(),
                    entry.oid,
                ));
        }

        // a parent path is a proper prefix of its children, so it sorts first
        // and the last key is always a deepest pending directory
        while let Some((dir, tree)) = pending.pop_last() {
            let tree = Object::from_tree(&tree);
            if dir.is_empty() {
                return Ok(tree);
            }

            let oid = self.database.add(&tree)?;
            tracing::trace!(dir = %dir, %oid, "stored tree");

            let parent_dir = index_entry::parent(&dir);
            pending
                .get_mut(parent_dir)
                .ok_or_else(|| Error::corrupt(format!("directory {parent_dir:?} was not loaded")))?
                .set(TreeEntry::new(
                    EntryMode::Directory,
                    index_entry::basename(&dir).to_string(),
                    oid,
                ));
        }

        Err(Error::corrupt("root tree vanished while folding"))
    }

    /// Make sure `dir` and all of its ancestors have a pending tree
    ///
    /// Missing ancestors are loaded from their own parent's tree, outermost
    /// first, so each directory is read at most once.
    fn materialize(&self, pending: &mut BTreeMap<String, Tree>, dir: &str) -> Result<()> {
        let mut missing = Vec::new();
        let mut cursor = dir;
        while !pending.contains_key(cursor) {
            missing.push(cursor);
            cursor = index_entry::parent(cursor);
        }

        for dir in missing.into_iter().rev() {
            let parent_tree = pending
                .get(index_entry::parent(dir))
                .ok_or_else(|| Error::corrupt(format!("directory {dir:?} has no parent tree")))?;

            // a committed file in the way is replaced by the new directory
            let tree = match parent_tree.get(index_entry::basename(dir)) {
                Some(entry) if entry.mode.is_directory() => self.database.load_tree(&entry.oid)?,
                _ => Tree::default(),
            };
            pending.insert(dir.to_string(), tree);
        }

        Ok(())
    }

    /// `/`-separated name of `path` relative to the worktree
    fn entry_name(&self, path: &Path) -> Result<String> {
        let relative = match path.is_absolute() {
            true => path.strip_prefix(&self.worktree).map_err(|_| {
                Error::malformed(
                    "staged path",
                    format!("{} is outside the worktree", path.display()),
                )
            })?,
            false => path,
        };

        let mut components = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => components.push(part.to_str().ok_or_else(|| {
                    Error::malformed("staged path", format!("{} is not UTF-8", path.display()))
                })?),
                Component::CurDir => {}
                _ => {
                    return Err(Error::malformed(
                        "staged path",
                        format!("{} leaves the worktree", path.display()),
                    ));
                }
            }
        }

        match components.is_empty() {
            true => Err(Error::malformed("staged path", "empty path")),
            false => Ok(components.join("/")),
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.changed = false;
    }

    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(entry.name.clone());
        }

        self.entries.insert(entry.name.clone(), entry);
    }

    fn remove_children(&mut self, name: &str) {
        if let Some(children) = self.children.remove(name) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, name: &str) {
        let Some(entry) = self.entries.remove(name) else {
            return;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(name);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
    }
}

impl Drop for Index<'_> {
    fn drop(&mut self) {
        if !self.changed {
            return;
        }

        if let Err(err) = self.write_updates() {
            tracing::error!(path = %self.path.display(), error = %err, "failed to write index");
        }
    }
}

fn link_target(path: &Path) -> Result<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;

    Ok(std::fs::read_link(path)?.as_os_str().as_bytes().to_vec())
}
