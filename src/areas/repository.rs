use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::errors::Result;
use std::cell::{RefCell, RefMut};
use std::path::Path;

const GIT_DIR: &str = ".git";
const OBJECTS_DIR: &str = "objects";
const INDEX_FILE: &str = "index";

/// A worktree with its `.git` directory
///
/// Commands are implemented on this type and print through its writer.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    workspace: Workspace,
}

impl Repository {
    /// Repository rooted at `path`, created if it does not exist yet
    ///
    /// Attached packs are discovered from disk, so the object store must be
    /// readable; an uninitialized root simply has none.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;

        let database = Database::open(path.join(GIT_DIR).join(OBJECTS_DIR).into_boxed_path())?;
        let workspace = Workspace::new(path.clone().into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            workspace,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index_path(&self) -> Box<Path> {
        self.path.join(GIT_DIR).join(INDEX_FILE).into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Load the staging area, holding its lock until the index drops when `with_lock` is set
    pub fn index(&self, with_lock: bool) -> Result<Index<'_>> {
        Index::open(&self.database, self.index_path(), self.path.clone(), with_lock)
    }
}
