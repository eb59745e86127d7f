//! Domain errors
//!
//! Every failure a caller may want to react to is a [`TwigError`] variant.
//! Core functions return `anyhow::Result`, so these travel inside an
//! `anyhow::Error` and are recovered with `err.downcast_ref::<TwigError>()`.
//! I/O and parse failures stay plain `anyhow` errors with context attached.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TwigError {
    #[error("not a twig repository (missing {0})")]
    NotARepository(PathBuf),

    #[error("a twig version-control system already exists in {0}")]
    AlreadyInitialized(PathBuf),

    /// A referenced object, commit or branch does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error("no commit with id {0} exists")]
    NoSuchCommit(String),

    #[error("commit id {prefix} is ambiguous: {candidates:?}")]
    AmbiguousCommit {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("a branch named {0} does not exist")]
    NoSuchBranch(String),

    #[error("please enter a commit message")]
    EmptyMessage,

    #[error("no changes added to the commit")]
    NothingToCommit,

    #[error("no reason to remove the file {0}")]
    NothingToRemove(PathBuf),

    #[error(
        "there is an untracked file in the way; delete it, or add and commit it first:\n{}",
        format_paths(.0)
    )]
    UntrackedFileConflict(Vec<PathBuf>),

    #[error("a branch named {0} already exists")]
    BranchExists(String),

    #[error("cannot remove the current branch {0}")]
    CurrentBranch(String),

    #[error("no need to checkout the current branch {0}")]
    AlreadyOnBranch(String),

    #[error("file {0} does not exist in that commit")]
    FileNotInCommit(PathBuf),

    #[error("file {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("path {0} is outside the working tree")]
    OutsideWorkspace(PathBuf),

    #[error("path {0} is inside the repository metadata directory")]
    MetadataPath(PathBuf),

    /// A hash referenced by stored state has no backing object.
    #[error("corrupt repository: object {0} is missing or unreadable")]
    CorruptObject(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("\t{}", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the domain error carried by an `anyhow::Error`, if any.
pub fn domain_error(error: &anyhow::Error) -> Option<&TwigError> {
    error.downcast_ref::<TwigError>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn conflict_message_lists_every_path() {
        let error = TwigError::UntrackedFileConflict(vec!["a.txt".into(), "dir/b.txt".into()]);

        assert_eq!(
            error.to_string(),
            "there is an untracked file in the way; delete it, or add and commit it first:\n\ta.txt\n\tdir/b.txt"
        );
    }

    #[test]
    fn domain_error_survives_anyhow_context() {
        use anyhow::Context;

        let result: anyhow::Result<()> =
            Err(anyhow::Error::from(TwigError::EmptyMessage)).context("while committing");
        let error = result.unwrap_err();

        assert_eq!(domain_error(&error), Some(&TwigError::EmptyMessage));
    }
}
