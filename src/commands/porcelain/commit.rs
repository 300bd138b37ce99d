use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Commit the staged tree on top of `parent`
    ///
    /// There are no branches to advance, so the parent is always explicit and
    /// the new commit id is only reported.
    pub fn commit(&mut self, parent: Option<&str>, message: &str) -> anyhow::Result<()> {
        let parent = parent.map(ObjectId::try_parse).transpose()?;

        let tree = {
            let index = self.index(false)?;
            index.to_tree(parent.as_ref())?
        };
        let tree_oid = self.database().add(&tree)?;

        let (commit_id, commit) = self.create_commit(tree_oid, parent, message)?;
        let is_root = match commit.is_root() {
            true => "(root-commit) ",
            false => "",
        };

        writeln!(
            self.writer(),
            "[{}{}] {}",
            is_root,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
