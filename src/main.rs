use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use twig::Repository;

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small local version-control system",
    long_about = "twig snapshots a working directory into an immutable commit history, \
    with a staging area, branches and checkouts. Everything lives in a local .twig directory; \
    there is no networking and no merging.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
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
        long_about = "This command creates a .twig directory with an initial commit and a master branch, \
        in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command stages the current content of the given files. \
        Directories are expanded to every file they contain."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "rm",
        about = "Unstage a file or stage it for removal",
        long_about = "This command unstages a staged file. If the file is tracked by the current commit \
        it is staged for removal and deleted from the working directory."
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        path: PathBuf,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the staged changes as a new commit on top of the current one."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show the history of the current commit")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(
        name = "find",
        about = "Print the ids of all commits with the given message"
    )]
    Find {
        #[arg(index = 1, help = "The exact commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(
        name = "branch",
        about = "Create or delete a branch",
        long_about = "This command creates a branch pointing at the current commit, \
        or deletes a branch with -d. HEAD does not move."
    )]
    Branch {
        #[arg(short = 'd', long = "delete", help = "Delete the branch")]
        delete: bool,
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(
        name = "checkout",
        about = "Switch branches or restore files",
        long_about = "checkout <branch> switches to a branch. \
        checkout --detach <commit> checks out a commit with a detached HEAD. \
        checkout [<commit>] -- <file> restores a file from a commit (the current one by default)."
    )]
    Checkout {
        #[arg(long, help = "Check out a commit and detach HEAD")]
        detach: bool,
        #[arg(index = 1, help = "The branch, or the commit when used with --detach or --")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<PathBuf>,
    },
    #[command(
        name = "reset",
        about = "Move the current branch to a commit",
        long_about = "This command checks out the given commit and moves the current branch to it, \
        clearing the staging area."
    )]
    Reset {
        #[arg(index = 1, help = "The commit to reset to")]
        revision: String,
    },
}

fn main() {
    twig::telemetry::init();

    if let Err(error) = run(Cli::parse()) {
        eprintln!("{} {:#}", "error:".red().bold(), error);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let pwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { path } => {
            let path = path.unwrap_or(pwd);
            Repository::new(&path, Box::new(std::io::stdout()))?.init()?;
        }
        Commands::Add { paths } => {
            open(&pwd)?.add(&paths)?;
        }
        Commands::Rm { path } => {
            open(&pwd)?.rm(&path)?;
        }
        Commands::Commit { message } => {
            open(&pwd)?.commit(&message)?;
        }
        Commands::Log => {
            open(&pwd)?.log()?;
        }
        Commands::GlobalLog => {
            open(&pwd)?.global_log()?;
        }
        Commands::Find { message } => {
            open(&pwd)?.find(&message)?;
        }
        Commands::Status => {
            open(&pwd)?.status()?;
        }
        Commands::Branch { delete, name } => {
            let repository = open(&pwd)?;
            if delete {
                repository.delete_branch(&name)?;
            } else {
                repository.branch(&name)?;
            }
        }
        Commands::Checkout {
            detach,
            target,
            file,
        } => {
            let repository = open(&pwd)?;
            match (target, file) {
                (target, Some(file)) => repository.checkout_file(target.as_deref(), &file)?,
                (Some(target), None) if detach => {
                    repository.checkout_commit(&target)?;
                }
                (Some(target), None) => {
                    repository.checkout_branch(&target)?;
                }
                (None, None) => {
                    anyhow::bail!("nothing to check out; name a branch, a commit or -- <file>")
                }
            }
        }
        Commands::Reset { revision } => {
            open(&pwd)?.reset(&revision)?;
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<Repository> {
    Repository::open(path, Box::new(std::io::stdout()))
}
