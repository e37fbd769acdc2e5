use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jacobgit::add;
use jacobgit::branch;
use jacobgit::checkout;
use jacobgit::commit::{self, DEFAULT_IDENTITY};
use jacobgit::diff;
use jacobgit::index::Index;
use jacobgit::log;
use jacobgit::repository::Repository;
use jacobgit::status;
use jacobgit::tag;

#[derive(Parser)]
#[command(name = "jacobgit")]
#[command(about = "A minimal, local, content-addressed version control system")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the .jacobgit/ skeleton
    Init,
    /// Stage one or more files
    Add { paths: Vec<PathBuf> },
    /// Build a tree from the index and print its SHA
    WriteTree,
    /// Snapshot the index into a commit
    Commit {
        #[arg(short = 'm', long)]
        message: String,

        #[arg(long, default_value = DEFAULT_IDENTITY)]
        author: String,
    },
    /// Print the commit chain from HEAD
    Log,
    /// Print the working tree status
    Status,
    /// Show a unified diff
    Diff {
        #[arg(long)]
        staged: bool,
    },
    /// Materialize a branch or commit onto the working tree
    Checkout { target: String },
    /// List, create, or delete branches
    Branch {
        name: Option<String>,

        #[arg(short = 'd', long)]
        delete: Option<String>,
    },
    /// List or create lightweight tags
    Tag {
        name: Option<String>,

        #[arg(short = 'l', long)]
        list: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("JACOBGIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jacobgit: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init => {
            Repository::init(&cwd)?;
        }

        Commands::Add { paths } => {
            let repo = Repository::open(&cwd)?;
            let mut index = Index::load(&repo.root)?;
            let abs_paths: Vec<PathBuf> = paths.into_iter().map(|p| cwd.join(p)).collect();
            let refs: Vec<&std::path::Path> = abs_paths.iter().map(PathBuf::as_path).collect();
            let count = add::add(&repo, &mut index, &refs)?;
            index.save(&repo.root)?;
            println!("added {count} file(s) to index");
        }

        Commands::WriteTree => {
            let repo = Repository::open(&cwd)?;
            let index = Index::load(&repo.root)?;
            let hash = jacobgit::tree::write_tree(&repo.store, index.entries())?;
            println!("{}", jacobgit::hash::hash_to_hex(&hash));
        }

        Commands::Commit { message, author } => {
            let repo = Repository::open(&cwd)?;
            let index = Index::load(&repo.root)?;
            let result = commit::commit(&repo, &index, &author, &message)?;
            println!("{}", commit::format_commit_summary(&result, &message));
        }

        Commands::Log => {
            let repo = Repository::open(&cwd)?;
            let mut out = String::new();
            log::log(&repo, &mut out)?;
            print!("{out}");
        }

        Commands::Status => {
            let repo = Repository::open(&cwd)?;
            let index = Index::load(&repo.root)?;
            let report = status::status(&repo, &index)?;
            print!("{}", status::format_status(&report));
        }

        Commands::Diff { staged } => {
            let repo = Repository::open(&cwd)?;
            let index = Index::load(&repo.root)?;
            let mut out = String::new();
            if staged {
                diff::diff_staged(&repo, &index, &mut out)?;
            } else {
                diff::diff_unstaged(&repo, &index, &mut out)?;
            }
            print!("{out}");
        }

        Commands::Checkout { target } => {
            let repo = Repository::open(&cwd)?;
            let index = Index::load(&repo.root)?;
            checkout::checkout(&repo, &target, &index)?;
        }

        Commands::Branch { name, delete } => {
            let repo = Repository::open(&cwd)?;
            if let Some(name) = delete {
                branch::delete(&repo, &name)?;
            } else if let Some(name) = name {
                branch::create(&repo, &name)?;
            } else {
                print!("{}", branch::format_list(&repo));
            }
        }

        Commands::Tag { name, list: _ } => {
            let repo = Repository::open(&cwd)?;
            if let Some(name) = name {
                tag::create(&repo, &name)?;
                println!("Created tag {name}");
            } else {
                print!("{}", tag::format_list(&repo)?);
            }
        }
    }

    Ok(())
}
