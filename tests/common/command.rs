use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

/// Initialized repository with `1.txt`, `a/2.txt` and `a/b/3.txt` staged
#[fixture]
pub fn staged_repository_dir(repository_dir: TempDir) -> TempDir {
    run_stowage_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_stowage_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    repository_dir
}

pub fn run_stowage_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("stowage").expect("Failed to find stowage binary");
    cmd.env_remove("STOWAGE_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Pin the author and its date so commit ids are reproducible
pub fn with_author(mut cmd: Command) -> Command {
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", "fake_user"),
        ("GIT_AUTHOR_EMAIL", "fake_email@email.com"),
        ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 +0000"), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd.env_remove("GIT_COMMITTER_NAME");
    cmd.env_remove("GIT_COMMITTER_EMAIL");
    cmd.env_remove("GIT_COMMITTER_DATE");
    cmd
}

pub fn stowage_commit(dir: &Path, parent: Option<&str>, message: &str) -> Command {
    let mut args = vec!["commit", "-m", message];
    if let Some(parent) = parent {
        args.extend(["-p", parent]);
    }
    with_author(run_stowage_command(dir, &args))
}
