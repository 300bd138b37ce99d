use crate::errors::{Error, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".git", ".", ".."];

/// Working directory the staged paths are taken from
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every file at or below `root`, relative to the workspace, in name order
    ///
    /// `root` may be relative to the current directory or absolute. A file or
    /// symlink is returned as itself, links are never followed, and anything
    /// under `.git` is skipped.
    pub fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let root = absolute_path(root)?;
        // resolve the directories above `root` but leave a final symlink alone
        let root = match (root.parent(), root.file_name()) {
            (Some(parent), Some(name)) => std::fs::canonicalize(parent)?.join(name),
            _ => std::fs::canonicalize(&root)?,
        };
        let metadata = std::fs::symlink_metadata(&root)?;

        let relative = root.strip_prefix(&self.path).map_err(|_| {
            Error::malformed(
                "workspace path",
                format!("{} is outside the workspace", root.display()),
            )
        })?;

        if Self::is_ignored(relative) {
            return Ok(Vec::new());
        }
        if !metadata.is_dir() {
            return Ok(vec![relative.to_path_buf()]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                !Self::is_ignored(relative)
            });
        for entry in walker {
            let entry = entry.map_err(|err| match err.into_io_error() {
                Some(err) => Error::Io(err),
                None => Error::malformed("workspace path", "file system loop"),
            })?;

            if entry.file_type().is_dir() {
                continue;
            }
            if let Ok(path) = entry.path().strip_prefix(&self.path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()),
            _ => false,
        })
    }
}

/// `path` joined onto the current directory with `.` and `..` resolved lexically
///
/// Symlinks are not resolved, so a path naming a link still names the link.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    let joined = std::env::current_dir()?.canonicalize()?.join(path);

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            component => resolved.push(component),
        }
    }

    Ok(resolved)
}
