use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use stowage::Error;
use stowage::areas::database::Database;
use stowage::artifacts::index::entry_mode::{EntryMode, FileMode};
use stowage::artifacts::objects::object::Object;
use stowage::artifacts::objects::object_id::ObjectId;
use stowage::artifacts::objects::object_type::ObjectType;
use stowage::artifacts::objects::tree::{Tree, TreeEntry};
use stowage::artifacts::pack::reader::Pack;
use stowage::artifacts::pack::writer::PackWriter;

mod common;

fn database() -> (assert_fs::TempDir, Database) {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new().expect("Failed to create temp dir");
    let database = Database::new(dir.path().join("objects").into_boxed_path());
    (dir, database)
}

fn entry_name() -> impl Strategy<Value = String> {
    "[a-z0-9._-]{1,12}".prop_filter("reserved names", |name| name != "." && name != "..")
}

fn entry_mode() -> impl Strategy<Value = EntryMode> {
    prop_oneof![
        Just(EntryMode::File(FileMode::Regular)),
        Just(EntryMode::File(FileMode::Executable)),
        Just(EntryMode::Symlink),
        Just(EntryMode::Directory),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn loose_objects_read_back_unchanged(payload in vec(any::<u8>(), 0..512)) {
        let (_dir, database) = database();
        let object = Object::with_payload(ObjectType::Blob, &payload);

        let oid = database.add(&object)?;
        prop_assert_eq!(oid, object.object_id());
        prop_assert_eq!(database.add(&object)?, oid);

        let stored = database.get(&oid)?.expect("stored object is missing");
        prop_assert_eq!(stored.object_type(), ObjectType::Blob);
        prop_assert_eq!(stored.data(), payload.as_slice());
    }

    #[test]
    fn packs_answer_for_exactly_their_objects(
        payloads in btree_set(vec(any::<u8>(), 0..256), 1..24),
        absent in vec(any::<u8>(), 256..300),
    ) {
        let objects = payloads
            .iter()
            .map(|payload| Object::with_payload(ObjectType::Blob, payload))
            .collect::<Vec<_>>();

        let mut writer = PackWriter::new();
        for object in &objects {
            writer.add(object)?;
        }
        let written = writer.finish()?;
        let pack = Pack::from_bytes(written.pack, &written.index)?;

        prop_assert_eq!(pack.len(), objects.len());
        let fan_out = pack.index().fan_out();
        prop_assert!(fan_out.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert_eq!(fan_out[255] as usize, objects.len());

        for object in &objects {
            let found = pack.get(&object.object_id())?.expect("packed object is missing");
            prop_assert_eq!(found.data(), object.data());
        }

        let missing = Object::with_payload(ObjectType::Blob, &absent).object_id();
        prop_assert!(pack.get(&missing)?.is_none());
    }

    #[test]
    fn tree_ids_do_not_depend_on_insertion_order(
        entries in vec((entry_name(), entry_mode(), any::<[u8; 20]>()), 0..16),
    ) {
        let mut forward = Tree::default();
        for (name, mode, oid) in &entries {
            forward.set(TreeEntry::new(*mode, name.clone(), ObjectId::from_bytes(*oid)));
        }

        // the last entry for a name wins, so replay only those in reverse
        let mut unique = std::collections::BTreeMap::new();
        for (name, mode, oid) in &entries {
            unique.insert(name.clone(), (*mode, *oid));
        }
        let mut backward = Tree::default();
        for (name, (mode, oid)) in unique.iter().rev() {
            backward.set(TreeEntry::new(*mode, name.clone(), ObjectId::from_bytes(*oid)));
        }

        let forward = Object::from_tree(&forward);
        let backward = Object::from_tree(&backward);
        prop_assert_eq!(forward.object_id(), backward.object_id());
        prop_assert_eq!(forward.read_as_tree()?, backward.read_as_tree()?);
    }

    #[test]
    fn ids_other_than_forty_hex_digits_are_rejected(id in "[0-9a-fA-Fg-z]{0,45}") {
        let valid = id.len() == 40 && id.bytes().all(|byte| byte.is_ascii_hexdigit());

        match ObjectId::try_parse(&id) {
            Ok(oid) => {
                prop_assert!(valid);
                prop_assert_eq!(oid.to_string(), id.to_ascii_lowercase());
            }
            Err(err) => {
                prop_assert!(!valid);
                prop_assert!(matches!(err, Error::InvalidObjectId(_)), "{:?}", err);
            }
        }
    }
}

#[test]
fn typed_loads_reject_the_wrong_variant() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, database) = database();
    let blob = database.add(&Object::from_blob(b"not a tree"))?;

    assert!(matches!(database.load_tree(&blob), Err(Error::CorruptRepository(_))));
    assert!(matches!(database.load_commit(&blob), Err(Error::CorruptRepository(_))));

    Ok(())
}

#[test]
fn packed_objects_are_found_after_reopening() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, mut database) = database();
    let oids = ["one", "two", "three"]
        .iter()
        .map(|content| database.add(&Object::from_blob(content.as_bytes())))
        .collect::<Result<Vec<_>, _>>()?;

    database.install_pack(&oids)?;
    for oid in &oids {
        std::fs::remove_file(database.loose().object_path(oid))?;
    }

    let reopened = Database::open(dir.path().join("objects").into_boxed_path())?;
    assert_eq!(reopened.packs().len(), 1);
    for oid in &oids {
        assert!(reopened.contains(oid));
        assert_eq!(
            reopened.get(oid)?.map(|object| object.object_id()),
            Some(*oid)
        );
    }

    Ok(())
}
