use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Store the staged tree, merged over the tree of `parent` when given
    pub fn write_tree(&mut self, parent: Option<&str>) -> anyhow::Result<()> {
        let parent = parent.map(ObjectId::try_parse).transpose()?;

        let tree = {
            let index = self.index(false)?;
            index.to_tree(parent.as_ref())?
        };
        let tree_id = self.database().add(&tree)?;

        writeln!(self.writer(), "{tree_id}")?;

        Ok(())
    }
}
