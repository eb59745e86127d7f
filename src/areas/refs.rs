//! Branch registry and HEAD
//!
//! Branches are named, mutable pointers to commits. HEAD records where the
//! working directory currently is: either through a branch or, when
//! detached, directly at a commit id.
//!
//! ## File Format
//!
//! - `refs/heads/<name>`: the 40-character id the branch points at
//! - `HEAD`: `ref: refs/heads/<name>` or a raw commit id
//!
//! Every ref write holds an exclusive lock on the ref file.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.twig`)
    path: Box<Path>,
}

impl Refs {
    pub fn read_head(&self) -> anyhow::Result<Head> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        Head::parse(&content).with_context(|| format!("corrupt HEAD at {:?}", head_path))
    }

    /// Point HEAD at a branch or a raw commit id
    ///
    /// Does not look at the working directory; callers reconcile it first.
    pub fn move_head(&self, target: &Head) -> anyhow::Result<()> {
        tracing::debug!(head = %target, "moving HEAD");
        self.update_ref_file(self.head_path(), target.to_raw())
    }

    /// The branch HEAD resolves through, or None when detached
    pub fn current_branch(&self) -> anyhow::Result<Option<BranchName>> {
        Ok(self.read_head()?.branch().cloned())
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        Ok(self.current_branch()?.as_ref() == Some(branch_name))
    }

    /// Resolve HEAD to the id of the current commit
    pub fn current_oid(&self) -> anyhow::Result<ObjectId> {
        match self.read_head()? {
            Head::Branch(name) => self
                .read_branch(&name)?
                .ok_or_else(|| TwigError::NoSuchBranch(name.to_string()).into()),
            Head::Detached(oid) => Ok(oid),
        }
    }

    /// Move whatever HEAD resolves through to `oid`
    ///
    /// On a branch the branch is advanced; when detached HEAD itself moves.
    pub fn update_head(&self, oid: ObjectId) -> anyhow::Result<()> {
        match self.read_head()? {
            Head::Branch(name) => self.advance(&name, oid),
            Head::Detached(_) => self.move_head(&Head::Detached(oid)),
        }
    }

    pub fn read_branch(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(branch_name);

        if !branch_path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read ref file at {:?}", branch_path))?;

        Ok(Some(ObjectId::try_parse(content.trim().to_string()).with_context(
            || format!("corrupt ref file at {:?}", branch_path),
        )?))
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).is_file()
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(TwigError::BranchExists(name.to_string()).into());
        }

        tracing::debug!(branch = %name, oid = %source_oid, "creating branch");
        self.update_ref_file(self.branch_path(name), source_oid.to_string())
    }

    /// Repoint an existing branch
    pub fn advance(&self, name: &BranchName, oid: ObjectId) -> anyhow::Result<()> {
        if !self.branch_exists(name) {
            return Err(TwigError::NoSuchBranch(name.to_string()).into());
        }

        tracing::debug!(branch = %name, oid = %oid, "advancing branch");
        self.update_ref_file(self.branch_path(name), oid.to_string())
    }

    /// Remove a branch pointer; the commits it pointed at stay in the store
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let oid = self
            .read_branch(name)?
            .ok_or_else(|| TwigError::NoSuchBranch(name.to_string()))?;

        if self.is_current_branch(name)? {
            return Err(TwigError::CurrentBranch(name.to_string()).into());
        }

        let branch_path = self.branch_path(name);
        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        tracing::debug!(branch = %name, "deleted branch");
        Ok(oid)
    }

    /// All branch names, sorted
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().replace('\\', "/")).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.heads_path().join(name.as_ref()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::domain_error;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn oid(c: char) -> ObjectId {
        ObjectId::try_parse(c.to_string().repeat(40)).unwrap()
    }

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name.to_string()).unwrap()
    }

    /// Registry with `master` at `aaaa…` and HEAD on master
    #[fixture]
    fn refs() -> (TempDir, Refs) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());
        refs.create_branch(&branch("master"), oid('a')).unwrap();
        refs.move_head(&Head::Branch(branch("master"))).unwrap();
        (dir, refs)
    }

    #[rstest]
    fn head_resolves_through_its_branch(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        assert_eq!(refs.current_oid().unwrap(), oid('a'));

        refs.advance(&branch("master"), oid('b')).unwrap();
        assert_eq!(refs.current_oid().unwrap(), oid('b'));
    }

    #[rstest]
    fn duplicate_branch_is_rejected(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        let error = refs.create_branch(&branch("master"), oid('b')).unwrap_err();

        assert_eq!(
            domain_error(&error),
            Some(&TwigError::BranchExists("master".to_string()))
        );
        assert_eq!(refs.read_branch(&branch("master")).unwrap(), Some(oid('a')));
    }

    #[rstest]
    fn current_branch_cannot_be_deleted(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        let error = refs.delete_branch(&branch("master")).unwrap_err();

        assert_eq!(
            domain_error(&error),
            Some(&TwigError::CurrentBranch("master".to_string()))
        );
    }

    #[rstest]
    fn deleting_unknown_branch_fails(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;

        let error = refs.delete_branch(&branch("nope")).unwrap_err();

        assert_eq!(
            domain_error(&error),
            Some(&TwigError::NoSuchBranch("nope".to_string()))
        );
    }

    #[rstest]
    fn deleting_nested_branch_prunes_its_directory(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        refs.create_branch(&branch("feature/x"), oid('b')).unwrap();

        assert_eq!(refs.delete_branch(&branch("feature/x")).unwrap(), oid('b'));

        assert!(!refs.heads_path().join("feature").exists());
        assert_eq!(refs.list_branches().unwrap(), vec![branch("master")]);
    }

    #[rstest]
    fn update_head_moves_detached_head_itself(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        refs.move_head(&Head::Detached(oid('c'))).unwrap();

        refs.update_head(oid('d')).unwrap();

        assert_eq!(refs.read_head().unwrap(), Head::Detached(oid('d')));
        assert_eq!(refs.read_branch(&branch("master")).unwrap(), Some(oid('a')));
        assert_eq!(refs.current_branch().unwrap(), None);
    }

    #[rstest]
    fn branches_are_listed_sorted(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        refs.create_branch(&branch("zeta"), oid('b')).unwrap();
        refs.create_branch(&branch("alpha"), oid('c')).unwrap();

        assert_eq!(
            refs.list_branches().unwrap(),
            vec![branch("alpha"), branch("master"), branch("zeta")]
        );
    }
}
