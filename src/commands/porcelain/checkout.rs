use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Switch to a branch, rewriting the working directory to its commit
    pub fn checkout_branch(&self, branch_name: &str) -> anyhow::Result<ObjectId> {
        let branch_name = BranchName::try_parse(branch_name.to_string())
            .map_err(|_| TwigError::NoSuchBranch(branch_name.to_string()))?;
        let target_oid = self
            .refs()
            .read_branch(&branch_name)?
            .ok_or_else(|| TwigError::NoSuchBranch(branch_name.to_string()))?;

        if self.refs().is_current_branch(&branch_name)? {
            return Err(TwigError::AlreadyOnBranch(branch_name.to_string()).into());
        }

        self.reconcile(&target_oid)?;
        self.refs().move_head(&Head::Branch(branch_name.clone()))?;
        self.index().clear()?;

        writeln!(self.writer(), "Switched to branch '{}'", branch_name)?;

        Ok(target_oid)
    }

    /// Check out a commit directly, leaving HEAD detached
    pub fn checkout_commit(&self, revision: &str) -> anyhow::Result<ObjectId> {
        let target_oid = Revision::new(revision.to_string()).resolve(self.refs(), self.commits())?;

        let target = self.reconcile(&target_oid)?;
        self.refs().move_head(&Head::Detached(target_oid.clone()))?;
        self.index().clear()?;

        writeln!(
            self.writer(),
            "HEAD is now at {} {}",
            target_oid.to_short_oid(),
            target.short_message()
        )?;

        Ok(target_oid)
    }

    /// Restore one file from a commit (the current one when `revision` is None)
    ///
    /// The file is overwritten unconditionally; HEAD and the staging index
    /// are left alone.
    pub fn checkout_file(&self, revision: Option<&str>, path: &Path) -> anyhow::Result<()> {
        let commit_oid = match revision {
            Some(revision) => {
                Revision::new(revision.to_string()).resolve(self.refs(), self.commits())?
            }
            None => self.refs().current_oid()?,
        };
        let commit = self.load_commit(&commit_oid)?;

        let path = self.workspace_relative(path)?;
        let blob_oid = commit
            .blob_id(&path)
            .ok_or_else(|| TwigError::FileNotInCommit(path.clone()))?;
        let data = self.tracked_blob(blob_oid)?;

        self.workspace().write_file(&path, &data)?;
        tracing::debug!(path = %path.display(), commit = %commit_oid, "restored file");

        Ok(())
    }

    /// Bring the working directory from the current commit to `target_oid`
    ///
    /// Nothing on disk changes if the reconciliation reports a conflict.
    pub(crate) fn reconcile(&self, target_oid: &ObjectId) -> anyhow::Result<Commit> {
        let (current_oid, current) = self.head_commit()?;
        let target = self.load_commit(target_oid)?;

        tracing::debug!(from = %current_oid, to = %target_oid, "reconciling working directory");
        Migration::new(self.workspace(), self.database(), &current, &target).apply_changes()?;

        Ok(target)
    }
}
