use crate::common::command::{run_stowage_command, staged_repository_dir, with_author};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::{Path, PathBuf};

mod common;

/// Store the staged tree plus a commit of it, returning every stored id
fn store_snapshot(dir: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let tree = common::stdout_line(&run_stowage_command(dir, &["write-tree"]).output()?);
    let commit = common::stdout_line(
        &with_author(run_stowage_command(dir, &["commit-tree", &tree, "-m", "snapshot"]))
            .output()?,
    );

    let listing = run_stowage_command(dir, &["ls-files", "-s"]).output()?;
    let mut oids = String::from_utf8(listing.stdout)?
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1).map(str::to_string))
        .collect::<Vec<_>>();
    oids.extend([tree, commit]);

    Ok(oids)
}

fn pack_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = std::fs::read_dir(dir.join(".git/objects/pack"))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    files.retain(|path| path.extension().is_some_and(|ext| ext == extension));
    files.sort();

    Ok(files)
}

fn remove_loose_objects(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    for entry in std::fs::read_dir(dir.join(".git/objects"))? {
        let path = entry?.path();
        if path.file_name().is_some_and(|name| name.len() == 2) {
            std::fs::remove_dir_all(path)?;
        }
    }

    Ok(())
}

#[rstest]
fn pack_objects_writes_a_pack_and_its_index(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = staged_repository_dir.path();
    let oids = store_snapshot(root)?;

    let mut args = vec!["pack-objects"];
    args.extend(oids.iter().map(String::as_str));
    let output = run_stowage_command(root, &args).output()?;
    assert!(output.status.success());
    let checksum = common::stdout_line(&output);

    let packs = pack_files(root, "pack")?;
    assert_eq!(packs.len(), 1);
    assert_eq!(
        packs[0].file_stem().map(|stem| stem.to_string_lossy().to_string()),
        Some(format!("pack-{checksum}"))
    );
    assert_eq!(pack_files(root, "idx")?.len(), 1);

    Ok(())
}

#[rstest]
fn packed_objects_are_readable_without_loose_copies(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = staged_repository_dir.path();
    let oids = store_snapshot(root)?;
    let before = oids
        .iter()
        .map(|oid| run_stowage_command(root, &["cat-file", "-p", oid]).output())
        .collect::<Result<Vec<_>, _>>()?;

    let mut args = vec!["pack-objects"];
    args.extend(oids.iter().map(String::as_str));
    run_stowage_command(root, &args).assert().success();
    remove_loose_objects(root)?;

    for (oid, expected) in oids.iter().zip(before) {
        let actual = run_stowage_command(root, &["cat-file", "-p", oid]).output()?;
        assert!(actual.status.success(), "{oid} is not readable from the pack");
        assert_eq!(actual.stdout, expected.stdout);
    }

    Ok(())
}

#[rstest]
fn verify_pack_lists_every_object_in_pack_order(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = staged_repository_dir.path();
    let oids = store_snapshot(root)?;

    let mut args = vec!["pack-objects"];
    args.extend(oids.iter().map(String::as_str));
    run_stowage_command(root, &args).assert().success();
    let pack = pack_files(root, "pack")?.remove(0);
    let pack = pack.to_string_lossy().to_string();

    let output = run_stowage_command(root, &["verify-pack", &pack]).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines = stdout.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), oids.len() + 1);
    assert_eq!(lines.last().copied(), Some(format!("{pack}: ok").as_str()));

    let listed = lines[..oids.len()]
        .iter()
        .filter_map(|line| line.split(' ').next())
        .collect::<Vec<_>>();
    assert_eq!(listed, oids.iter().map(String::as_str).collect::<Vec<_>>());

    let offsets = lines[..oids.len()]
        .iter()
        .filter_map(|line| line.rsplit(' ').next())
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(offsets[0], 12);
    assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));

    Ok(())
}

#[rstest]
fn verify_pack_regenerates_a_missing_index(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = staged_repository_dir.path();
    let oids = store_snapshot(root)?;

    let mut args = vec!["pack-objects"];
    args.extend(oids.iter().map(String::as_str));
    run_stowage_command(root, &args).assert().success();
    std::fs::remove_file(pack_files(root, "idx")?.remove(0))?;
    let pack = pack_files(root, "pack")?.remove(0);

    run_stowage_command(root, &["verify-pack", &pack.to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(": ok\n"));

    Ok(())
}

#[rstest]
fn verify_pack_reports_a_corrupted_pack(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = staged_repository_dir.path();
    let oids = store_snapshot(root)?;

    let mut args = vec!["pack-objects"];
    args.extend(oids.iter().map(String::as_str));
    run_stowage_command(root, &args).assert().success();
    let pack = pack_files(root, "pack")?.remove(0);
    let mut bytes = std::fs::read(&pack)?;
    bytes[14] ^= 0xff;
    std::fs::write(&pack, bytes)?;

    run_stowage_command(root, &["verify-pack", &pack.to_string_lossy()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("checksum does not match"));

    Ok(())
}

#[rstest]
fn pack_objects_of_an_unknown_object_fails(staged_repository_dir: TempDir) {
    run_stowage_command(
        staged_repository_dir.path(),
        &["pack-objects", "0123456789012345678901234567890123456789"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not in the database"));
}
