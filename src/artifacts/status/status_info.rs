use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub type ChangeSet = BTreeMap<PathBuf, WorkspaceChangeType>;
pub type FileSet = BTreeSet<PathBuf>;

/// Snapshot of the repository state shown by `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub head: Head,
    pub branches: Vec<BranchName>,
    pub staged_files: FileSet,
    pub removed_files: FileSet,
    pub workspace_changeset: ChangeSet,
    pub untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

// Terminology:
// - tracked: in the HEAD commit snapshot or staged for addition
// - modified: tracked, but the working copy differs from what the next commit would record
// - deleted: tracked and not staged for removal, but gone from the working directory
// - untracked: on disk, neither staged for addition nor tracked by HEAD
impl<'r> Status<'r> {
    pub fn initialize(&self) -> anyhow::Result<StatusInfo> {
        let head = self.repository.refs().read_head()?;
        let branches = self.repository.refs().list_branches()?;
        let (_, head_commit) = self.repository.head_commit()?;

        let on_disk = self
            .repository
            .workspace()
            .list_files(None)?
            .into_iter()
            .collect::<FileSet>();

        let index = self.repository.index();
        let staged_files = index.staged_additions().keys().cloned().collect::<FileSet>();
        let removed_files = index.staged_removals().clone();

        let mut workspace_changeset = ChangeSet::new();
        for (path, staged_oid) in index.staged_additions() {
            if !on_disk.contains(path) {
                workspace_changeset.insert(path.clone(), WorkspaceChangeType::Deleted);
            } else if self.repository.hash_workspace_file(path)? != *staged_oid {
                workspace_changeset.insert(path.clone(), WorkspaceChangeType::Modified);
            }
        }

        for (path, committed_oid) in head_commit.files() {
            if index.is_staged(path) || index.is_removed(path) {
                continue;
            }

            if !on_disk.contains(path) {
                workspace_changeset.insert(path.clone(), WorkspaceChangeType::Deleted);
            } else if self.repository.hash_workspace_file(path)? != *committed_oid {
                workspace_changeset.insert(path.clone(), WorkspaceChangeType::Modified);
            }
        }

        let untracked_files = on_disk
            .into_iter()
            .filter(|path| self.is_untracked(path, &head_commit, &staged_files, &removed_files))
            .collect::<FileSet>();

        Ok(StatusInfo {
            head,
            branches,
            staged_files,
            removed_files,
            workspace_changeset,
            untracked_files,
        })
    }

    // a file staged for removal but present again on disk counts as untracked
    fn is_untracked(
        &self,
        path: &Path,
        head_commit: &Commit,
        staged_files: &FileSet,
        removed_files: &FileSet,
    ) -> bool {
        !staged_files.contains(path) && (!head_commit.tracks(path) || removed_files.contains(path))
    }
}
