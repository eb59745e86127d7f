use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::objects::commit::{Commit, commit_timestamp};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use std::io::Write;

impl Repository {
    /// Commit the staged changes on top of the current commit
    pub fn commit(&self, message: &str) -> anyhow::Result<ObjectId> {
        let parent = self.refs().current_oid()?;
        let commit_id = self.create_commit(message, Some(parent))?;

        let position = match self.refs().read_head()? {
            Head::Branch(name) => name.to_string(),
            Head::Detached(_) => "detached HEAD".to_string(),
        };
        let commit = self.load_commit(&commit_id)?;

        writeln!(
            self.writer(),
            "[{} {}] {}",
            position,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_id)
    }

    /// Build and persist a commit
    ///
    /// Without a parent this creates the root commit (empty snapshot at the
    /// epoch), the `master` branch and points HEAD at it. With a parent
    /// (which must be the current commit) the snapshot is the parent's
    /// with the staged changes applied; the staging index is then cleared
    /// and whatever HEAD resolves through moves to the new commit.
    pub fn create_commit(
        &self,
        message: &str,
        parent: Option<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        if message.trim().is_empty() {
            return Err(TwigError::EmptyMessage.into());
        }

        let Some(parent_oid) = parent else {
            let root = Commit::root(message.to_string());
            let root_oid = self.commits().store(&root)?;
            let master = BranchName::default_branch();

            self.refs().create_branch(&master, root_oid.clone())?;
            self.refs().move_head(&Head::Branch(master))?;

            return Ok(root_oid);
        };

        let mut index = self.index();
        if index.is_empty() {
            return Err(TwigError::NothingToCommit.into());
        }

        let parent_commit = self.load_commit(&parent_oid)?;
        let files =
            parent_commit.child_snapshot(index.staged_additions(), index.staged_removals());

        if let Some(missing) = files.values().find(|oid| !self.database().contains(oid)) {
            return Err(TwigError::CorruptObject(missing.to_string()).into());
        }

        let commit = Commit::new(
            Some(parent_oid),
            commit_timestamp(),
            message.to_string(),
            files,
        );
        let commit_id = self.commits().store(&commit)?;

        self.refs().update_head(commit_id.clone())?;
        index.clear()?;

        tracing::info!(
            oid = %commit_id,
            files = commit.files().len(),
            "created commit"
        );

        Ok(commit_id)
    }
}
