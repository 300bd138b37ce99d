use crate::common::command::{
    repository_dir, run_stowage_command, staged_repository_dir, stowage_commit, with_author,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

fn commit_id(dir: &std::path::Path, parent: Option<&str>, message: &str) -> String {
    let output = stowage_commit(dir, parent, message)
        .output()
        .expect("Failed to run commit");
    assert!(output.status.success(), "{:?}", output);

    let line = common::stdout_line(&output);
    let short = line
        .trim_start_matches('[')
        .trim_start_matches("(root-commit) ")
        .split(']')
        .next()
        .unwrap_or_default()
        .to_string();

    // resolve the short id through the loose store layout
    let shard = dir.join(".git/objects").join(&short[..2]);
    let name = std::fs::read_dir(&shard)
        .expect("Failed to read object shard")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .find(|name| name.starts_with(&short[2..]))
        .expect("Commit object not stored");
    format!("{}{}", &short[..2], name)
}

#[rstest]
fn first_commit_is_a_root_commit(staged_repository_dir: TempDir) {
    stowage_commit(staged_repository_dir.path(), None, "Initial commit")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[\(root-commit\) [0-9a-f]{7}\] Initial commit\n$").unwrap());
}

#[rstest]
fn commit_records_author_tree_and_message(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = staged_repository_dir.path();
    let tree = common::stdout_line(&run_stowage_command(root, &["write-tree"]).output()?);

    let oid = commit_id(root, None, "  Initial commit\n\nwith a body  ");

    let payload = run_stowage_command(root, &["cat-file", "-p", &oid]).output()?;
    assert_eq!(
        String::from_utf8(payload.stdout)?,
        format!(
            "tree {tree}\n\
             author fake_user <fake_email@email.com> 1672574400 +0000\n\
             committer fake_user <fake_email@email.com> 1672574400 +0000\n\
             \n\
             Initial commit\n\nwith a body\n"
        )
    );
    run_stowage_command(root, &["cat-file", "-t", &oid])
        .assert()
        .success()
        .stdout("commit\n");

    Ok(())
}

#[rstest]
fn commit_with_a_parent_keeps_unstaged_paths_of_its_tree(
    staged_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = staged_repository_dir.path();
    let first = commit_id(root, None, "First commit");
    let first_tree = common::stdout_line(&run_stowage_command(root, &["write-tree"]).output()?);

    // restart from an empty index holding a single new file
    std::fs::write(root.join(".git/index"), b"")?;
    write_file(FileSpec::new(root.join("a/4.txt"), "four".to_string()));
    run_stowage_command(root, &["add", "a/4.txt"])
        .assert()
        .success();

    stowage_commit(root, Some(&first), "Second commit")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[[0-9a-f]{7}\] Second commit\n$")?);

    let merged = common::stdout_line(
        &run_stowage_command(root, &["write-tree", "--parent", &first]).output()?,
    );
    assert_ne!(merged, first_tree);

    let listing = run_stowage_command(root, &["cat-file", "-p", &merged]).output()?;
    let listing = String::from_utf8(listing.stdout)?;
    assert!(listing.contains("\t1.txt"));

    let subtree = listing
        .lines()
        .find(|line| line.ends_with("\ta"))
        .and_then(|line| line.split_whitespace().nth(2))
        .ok_or("merged tree lost directory a")?;
    let sublisting = run_stowage_command(root, &["cat-file", "-p", subtree]).output()?;
    let sublisting = String::from_utf8(sublisting.stdout)?;
    assert!(sublisting.contains("\t2.txt"));
    assert!(sublisting.contains("\t4.txt"));
    assert!(sublisting.contains("\tb"));

    Ok(())
}

#[rstest]
fn commit_with_an_unknown_parent_fails(staged_repository_dir: TempDir) {
    stowage_commit(
        staged_repository_dir.path(),
        Some("0123456789012345678901234567890123456789"),
        "Orphan",
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("repository corrupted"));
}

#[rstest]
fn commit_without_an_author_fails(staged_repository_dir: TempDir) {
    run_stowage_command(staged_repository_dir.path(), &["commit", "-m", "Anonymous"])
        .env_remove("GIT_AUTHOR_NAME")
        .env_remove("GIT_AUTHOR_EMAIL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GIT_AUTHOR_NAME"));
}

#[rstest]
fn commit_tree_links_an_existing_tree(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = repository_dir.path();
    run_stowage_command(root, &["init"]).assert().success();
    let tree = common::stdout_line(&run_stowage_command(root, &["write-tree"]).output()?);

    let first = common::stdout_line(
        &with_author(run_stowage_command(
            root,
            &["commit-tree", &tree, "-m", "empty"],
        ))
        .output()?,
    );
    let second = with_author(run_stowage_command(
        root,
        &["commit-tree", &tree, "-p", &first, "-m", "still empty"],
    ))
    .output()?;
    let second = common::stdout_line(&second);

    run_stowage_command(root, &["cat-file", "-p", &second])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("parent {first}\n")))
        .stdout(predicate::str::ends_with("still empty\n"));

    Ok(())
}

#[rstest]
fn commit_tree_rejects_a_blob_as_tree(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = repository_dir.path();
    run_stowage_command(root, &["init"]).assert().success();
    write_file(FileSpec::new(root.join("hello.txt"), "hello\n".to_string()));
    let blob = common::stdout_line(
        &run_stowage_command(root, &["hash-object", "-w", "hello.txt"]).output()?,
    );

    with_author(run_stowage_command(
        root,
        &["commit-tree", &blob, "-m", "not a tree"],
    ))
    .assert()
    .failure()
    .stderr(predicate::str::contains("repository corrupted"));

    Ok(())
}
