//! refmount: mount a git reference as a read-only filesystem.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use refmount_fs::{InodeTable, RefFilesystem};
use refmount_git::{CliGit, GitReference, GitStore, RefKind};

mod fuse;

use fuse::{RefMountFuse, mount_options};

#[derive(Parser)]
#[command(name = "refmount", version, about = "Expose a git reference as a read-only filesystem")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mount a reference at a directory.
    Mount {
        /// Path to the repository (work tree or bare).
        repository: PathBuf,
        /// Directory to mount at.
        mountpoint: PathBuf,
        #[command(flatten)]
        reference: RefArgs,
        /// Allow other users to read the mount.
        #[arg(long)]
        allow_other: bool,
    },
    /// List branches or tags.
    Refs {
        /// Path to the repository (work tree or bare).
        repository: PathBuf,
        /// List tags instead of branches.
        #[arg(long)]
        tags: bool,
    },
    /// List commit ids reachable from a reference, newest first.
    Log {
        /// Path to the repository (work tree or bare).
        repository: PathBuf,
        #[command(flatten)]
        reference: RefArgs,
    },
}

/// Which point in history to expose. At most one may be given; the
/// default is the `master` branch.
#[derive(Args)]
struct RefArgs {
    /// Branch name.
    #[arg(long, conflicts_with_all = ["tag", "commit"])]
    branch: Option<String>,
    /// Tag name.
    #[arg(long, conflicts_with = "commit")]
    tag: Option<String>,
    /// Commit id (full or abbreviated).
    #[arg(long)]
    commit: Option<String>,
}

impl RefArgs {
    fn reference(&self) -> GitReference {
        if let Some(branch) = &self.branch {
            GitReference::Branch(branch.clone())
        } else if let Some(tag) = &self.tag {
            GitReference::Tag(tag.clone())
        } else if let Some(commit) = &self.commit {
            GitReference::Commit(commit.clone())
        } else {
            GitReference::Branch("master".to_string())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;

    match cli.command {
        Command::Mount {
            repository,
            mountpoint,
            reference,
            allow_other,
        } => {
            let git = Arc::new(CliGit::open(&repository)?);
            let reference = reference.reference();
            let view = RefFilesystem::new(git, reference.clone());
            let table = runtime
                .block_on(InodeTable::build(Arc::new(view)))
                .context("failed to walk the tree")?;
            info!(
                %reference,
                inodes = table.len(),
                mountpoint = %mountpoint.display(),
                "mounting"
            );
            let handler = RefMountFuse::new(Arc::new(table), runtime.handle().clone());
            fuser::mount2(handler, &mountpoint, &mount_options(allow_other))
                .context("mount failed")?;
        }
        Command::Refs { repository, tags } => {
            let git = CliGit::open(&repository)?;
            let kind = if tags { RefKind::Tag } else { RefKind::Branch };
            for name in runtime.block_on(git.list_refs(kind))? {
                println!("{name}");
            }
        }
        Command::Log {
            repository,
            reference,
        } => {
            let git = CliGit::open(&repository)?;
            for id in runtime.block_on(git.list_commits(&reference.reference()))? {
                println!("{id}");
            }
        }
    }

    Ok(())
}
