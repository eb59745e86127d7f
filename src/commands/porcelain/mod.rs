//! User-facing commands
//!
//! Each command is an `impl Repository` block. Commands validate before they
//! mutate, write human-readable output to the repository writer and return
//! the values they produced so library callers need not parse output.
//!
//! ## Commands
//!
//! - `init`: Create a repository with its root commit
//! - `add`: Stage files for commit
//! - `rm`: Unstage a file or stage it for removal
//! - `commit`: Record the staged changes
//! - `log`: Current history, all commits, or commits by message
//! - `status`: Branches, staged changes and working tree changes
//! - `branch`: Create or delete branches
//! - `checkout`: Switch branches, detach HEAD, or restore files
//! - `reset`: Move the current branch to another commit

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod reset;
pub mod rm;
pub mod status;
