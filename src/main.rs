use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};
use stowage::areas::repository::Repository;
use stowage::commands::plumbing::cat_file::CatFileMode;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STOWAGE_LOG";

#[derive(Parser)]
#[command(
    name = "stowage",
    version = "0.1.0",
    about = "A content-addressed object store in the git on-disk format",
    long_about = "This tool stores blobs, trees and commits the way git lays them out on disk: \
    loose zlib objects, a binary staging index, and pack files with their indexes. \
    Branches and refs are out of its reach; parents are always passed explicitly.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as a blob and optionally write it to the object database",
        long_about = "This command hashes a file as a blob object and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "cat-file",
        about = "Print the content, type or size of an object",
        long_about = "This command prints information about an object in the repository. \
        It requires the SHA of the object and exactly one of -p, -t or -s.",
        group(ArgGroup::new("mode").required(true).args(["pretty", "kind", "size"]))
    )]
    CatFile {
        #[arg(short = 'p', help = "Pretty-print the object's content")]
        pretty: bool,
        #[arg(short = 't', help = "Print the object's type")]
        kind: bool,
        #[arg(short = 's', help = "Print the object's payload size")]
        size: bool,
        #[arg(index = 1, help = "The object SHA")]
        sha: String,
    },
    #[command(
        name = "add",
        about = "Add file contents to the index",
        long_about = "This command stages files in the index. Directories are added recursively."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "rm",
        about = "Remove paths from the index",
        long_about = "This command unstages paths from the index. The working files are left untouched."
    )]
    Rm {
        #[arg(index = 1, required = true, help = "The paths to unstage")]
        paths: Vec<String>,
    },
    #[command(
        name = "ls-files",
        about = "List the paths in the index",
        long_about = "This command lists the staged paths, optionally with their mode and object SHA."
    )]
    LsFiles {
        #[arg(short, long, help = "Show mode and object SHA of each entry")]
        stage: bool,
    },
    #[command(
        name = "write-tree",
        about = "Create a tree object from the index",
        long_about = "This command stores the staged paths as tree objects and prints the root tree SHA. \
        With a parent commit, unstaged paths of its tree are kept."
    )]
    WriteTree {
        #[arg(short, long, help = "The parent commit whose tree the index is merged over")]
        parent: Option<String>,
    },
    #[command(
        name = "commit-tree",
        about = "Create a commit object from an existing tree",
        long_about = "This command creates a commit of the given tree and prints its SHA. \
        The author is read from GIT_AUTHOR_NAME, GIT_AUTHOR_EMAIL and GIT_AUTHOR_DATE."
    )]
    CommitTree {
        #[arg(index = 1, help = "The tree SHA")]
        tree: String,
        #[arg(short, long, help = "The parent commit SHA")]
        parent: Option<String>,
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit from the index with the specified message",
        long_about = "This command creates a new commit from the staged paths. \
        The parent commit is never implied and must be given explicitly."
    )]
    Commit {
        #[arg(short, long, help = "The parent commit SHA")]
        parent: Option<String>,
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "pack-objects",
        about = "Pack objects into a new pack file",
        long_about = "This command writes the given objects into .git/objects/pack and prints the pack checksum."
    )]
    PackObjects {
        #[arg(index = 1, required = true, help = "The object SHAs to pack")]
        objects: Vec<String>,
    },
    #[command(
        name = "verify-pack",
        about = "Check every object of a pack file",
        long_about = "This command reads every object of a pack back, checking its CRC and SHA."
    )]
    VerifyPack {
        #[arg(index = 1, help = "The path to the .pack file")]
        pack: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_repository(path: &Path) -> Result<Repository> {
    Ok(Repository::new(path, Box::new(std::io::stdout()))?)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;

    match &cli.command {
        Commands::Init { path } => {
            let mut repository = open_repository(path.as_deref().unwrap_or(&pwd))?;
            repository.init()?
        }
        Commands::HashObject { write, file } => {
            open_repository(&pwd)?.hash_object(file, *write)?
        }
        Commands::CatFile {
            pretty,
            kind,
            size,
            sha,
        } => {
            let mode = match (pretty, kind, size) {
                (true, _, _) => CatFileMode::Pretty,
                (_, true, _) => CatFileMode::Type,
                _ => CatFileMode::Size,
            };
            open_repository(&pwd)?.cat_file(sha, mode)?
        }
        Commands::Add { paths } => open_repository(&pwd)?.add(paths)?,
        Commands::Rm { paths } => open_repository(&pwd)?.rm(paths)?,
        Commands::LsFiles { stage } => open_repository(&pwd)?.ls_files(*stage)?,
        Commands::WriteTree { parent } => {
            open_repository(&pwd)?.write_tree(parent.as_deref())?
        }
        Commands::CommitTree {
            tree,
            parent,
            message,
        } => open_repository(&pwd)?.commit_tree(tree, parent.as_deref(), message)?,
        Commands::Commit { parent, message } => {
            open_repository(&pwd)?.commit(parent.as_deref(), message)?
        }
        Commands::PackObjects { objects } => open_repository(&pwd)?.pack_objects(objects)?,
        Commands::VerifyPack { pack } => open_repository(&pwd)?.verify_pack(pack)?,
    }

    Ok(())
}
