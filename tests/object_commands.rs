use crate::common::command::{repository_dir, run_stowage_command};
use assert_fs::TempDir;
use assert_fs::prelude::{FileWriteStr, PathChild};
use fake::Fake;
use fake::faker::lorem::en::Words;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

const HELLO_OID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

#[rstest]
fn hash_object_prints_the_blob_id_without_storing_it(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_stowage_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("hello.txt").write_str("hello\n")?;

    run_stowage_command(repository_dir.path(), &["hash-object", "hello.txt"])
        .assert()
        .success()
        .stdout(format!("{HELLO_OID}\n"));

    assert!(
        !repository_dir
            .path()
            .join(".git/objects/ce")
            .join(&HELLO_OID[2..])
            .exists()
    );

    Ok(())
}

#[rstest]
fn hash_object_with_write_stores_a_loose_object(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_stowage_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("hello.txt").write_str("hello\n")?;

    for _ in 0..2 {
        run_stowage_command(repository_dir.path(), &["hash-object", "-w", "hello.txt"])
            .assert()
            .success()
            .stdout(format!("{HELLO_OID}\n"));
    }

    let shard = repository_dir.path().join(".git/objects/ce");
    assert_eq!(std::fs::read_dir(&shard)?.count(), 1);
    assert!(shard.join(&HELLO_OID[2..]).is_file());

    Ok(())
}

#[rstest]
fn hash_object_of_a_missing_file_fails(repository_dir: TempDir) {
    run_stowage_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_stowage_command(repository_dir.path(), &["hash-object", "absent.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to read absent.txt"));
}

#[rstest]
fn cat_file_reads_back_a_written_blob(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_stowage_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    let content = Words(5..10).fake::<Vec<String>>().join(" ");
    repository_dir.child("words.txt").write_str(&content)?;

    let output = run_stowage_command(repository_dir.path(), &["hash-object", "-w", "words.txt"])
        .output()?;
    let oid = common::stdout_line(&output);

    run_stowage_command(repository_dir.path(), &["cat-file", "-p", &oid])
        .assert()
        .success()
        .stdout(content.clone());
    run_stowage_command(repository_dir.path(), &["cat-file", "-t", &oid])
        .assert()
        .success()
        .stdout("blob\n");
    run_stowage_command(repository_dir.path(), &["cat-file", "-s", &oid])
        .assert()
        .success()
        .stdout(format!("{}\n", content.len()));

    Ok(())
}

#[rstest]
fn cat_file_requires_exactly_one_mode(repository_dir: TempDir) {
    run_stowage_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_stowage_command(repository_dir.path(), &["cat-file", HELLO_OID])
        .assert()
        .failure();
    run_stowage_command(repository_dir.path(), &["cat-file", "-p", "-t", HELLO_OID])
        .assert()
        .failure();
}

#[rstest]
fn cat_file_of_an_unknown_object_fails(repository_dir: TempDir) {
    run_stowage_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_stowage_command(repository_dir.path(), &["cat-file", "-p", HELLO_OID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a valid object name"));
}

#[rstest]
#[case::too_short("ce013625030ba8dba906f756967f9e9ca394464")]
#[case::too_long("ce013625030ba8dba906f756967f9e9ca394464aa")]
#[case::not_hex("zz013625030ba8dba906f756967f9e9ca394464a")]
fn cat_file_rejects_malformed_ids(repository_dir: TempDir, #[case] oid: &str) {
    run_stowage_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_stowage_command(repository_dir.path(), &["cat-file", "-t", oid])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid object id"));
}
