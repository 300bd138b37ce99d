use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Commit, UserWithTime};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::Write;

impl Repository {
    pub fn commit_tree(
        &mut self,
        tree: &str,
        parent: Option<&str>,
        message: &str,
    ) -> anyhow::Result<()> {
        let tree_oid = ObjectId::try_parse(tree)?;
        let parent = parent.map(ObjectId::try_parse).transpose()?;

        let (commit_id, _) = self.create_commit(tree_oid, parent, message)?;
        writeln!(self.writer(), "{commit_id}")?;

        Ok(())
    }

    /// Store a commit of `tree_oid`, checking that the tree and parent exist
    ///
    /// The author comes from `GIT_AUTHOR_*`; the committer from `GIT_COMMITTER_*`,
    /// falling back to the author.
    pub(crate) fn create_commit(
        &self,
        tree_oid: ObjectId,
        parent: Option<ObjectId>,
        message: &str,
    ) -> anyhow::Result<(ObjectId, Commit)> {
        self.database()
            .load_tree(&tree_oid)
            .with_context(|| format!("{tree_oid} is not a valid tree"))?;
        if let Some(parent) = &parent {
            self.database()
                .load_commit(parent)
                .with_context(|| format!("{parent} is not a valid commit"))?;
        }

        let author = UserWithTime::load_from_env("AUTHOR")
            .context("GIT_AUTHOR_NAME and GIT_AUTHOR_EMAIL must be set")?;
        let committer = UserWithTime::load_from_env("COMMITTER").unwrap_or_else(|| author.clone());

        let mut commit = Commit::new(tree_oid, author)
            .with_committer(committer)
            .with_message(format!("{}\n", message.trim()));
        if let Some(parent) = parent {
            commit = commit.with_parent(parent);
        }

        let commit_id = self.database().add(&Object::from_commit(&commit))?;
        tracing::debug!(%commit_id, tree = %tree_oid, "stored commit");

        Ok((commit_id, commit))
    }
}
