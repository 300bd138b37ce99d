use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Pack the given objects under `objects/pack` and print the pack checksum
    pub fn pack_objects(&mut self, object_ids: &[String]) -> anyhow::Result<()> {
        let oids = object_ids
            .iter()
            .map(|id| ObjectId::try_parse(id))
            .collect::<Result<Vec<_>, _>>()?;

        let pack_path = self.database_mut().install_pack(&oids)?;
        let checksum = self
            .database()
            .packs()
            .last()
            .map(|pack| pack.checksum())
            .ok_or_else(|| anyhow::anyhow!("pack {} was not attached", pack_path.display()))?;

        writeln!(self.writer(), "{checksum}")?;

        Ok(())
    }
}
