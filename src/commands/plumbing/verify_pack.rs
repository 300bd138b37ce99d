use crate::areas::repository::Repository;
use crate::artifacts::pack::reader::Pack;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Read back every object of a pack, checking its CRC and id
    ///
    /// Prints `<id> <type> <size> <offset>` per object in pack order.
    pub fn verify_pack(&mut self, pack_path: &str) -> anyhow::Result<()> {
        let pack = Pack::open(Path::new(pack_path))
            .with_context(|| format!("Unable to open pack {pack_path}"))?;

        let mut entries = pack.index().entries().iter().collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.offset);

        for entry in entries {
            let object = pack
                .get(&entry.oid)?
                .ok_or_else(|| anyhow::anyhow!("{} is listed but not found", entry.oid))?;

            writeln!(
                self.writer(),
                "{} {} {} {}",
                entry.oid,
                entry.object_type,
                object.data().len(),
                entry.offset
            )?;
        }
        writeln!(self.writer(), "{pack_path}: ok")?;

        Ok(())
    }
}
