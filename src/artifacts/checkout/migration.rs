//! Working-directory reconciliation
//!
//! A [`Migration`] moves the working directory from the `current` commit's
//! snapshot to the `target` commit's snapshot. Each file on disk is
//! classified:
//!
//! | in target | in current | action                                             |
//! |-----------|------------|----------------------------------------------------|
//! | no        | no         | untracked, left alone                              |
//! | no        | yes        | deleted                                            |
//! | yes       | yes        | overwritten with the target content                |
//! | yes       | no         | overwritten if identical, otherwise a conflict     |
//!
//! Target entries missing from disk are added. A target file that needs an
//! untracked file or directory out of its way is a conflict as well.
//!
//! ## Safety
//!
//! All target blobs are loaded and all conflicts collected before the
//! workspace is modified. A plan with conflicts fails with
//! [`TwigError::UntrackedFileConflict`] and leaves every file untouched.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{TwigError, domain_error};
use bytes::Bytes;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Type of file system action required for checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Create a file that is not on disk
    Add,
    /// Delete a file tracked by the current commit only
    Delete,
    /// Overwrite a file already on disk
    Modify,
}

/// Planned file, with the content to write (None for deletions)
pub type PlannedFile = (PathBuf, Option<Bytes>);

/// Set of planned actions grouped by type
pub type ActionsSet = HashMap<ActionType, Vec<PlannedFile>>;

pub struct Migration<'r> {
    workspace: &'r Workspace,
    database: &'r Database,
    current: &'r Commit,
    target: &'r Commit,
    actions: ActionsSet,
    /// Untracked paths the target would clobber
    conflicts: BTreeSet<PathBuf>,
}

impl<'r> Migration<'r> {
    pub fn new(
        workspace: &'r Workspace,
        database: &'r Database,
        current: &'r Commit,
        target: &'r Commit,
    ) -> Self {
        let actions = HashMap::from([
            (ActionType::Add, Vec::new()),
            (ActionType::Delete, Vec::new()),
            (ActionType::Modify, Vec::new()),
        ]);

        Self {
            workspace,
            database,
            current,
            target,
            actions,
            conflicts: BTreeSet::new(),
        }
    }

    pub fn actions(&self) -> &ActionsSet {
        &self.actions
    }

    pub fn actions_of(&self, action: ActionType) -> &[PlannedFile] {
        self.actions
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn conflicts(&self) -> &BTreeSet<PathBuf> {
        &self.conflicts
    }

    /// Plan, then update the workspace if the plan has no conflicts
    pub fn apply_changes(&mut self) -> anyhow::Result<()> {
        self.plan_changes()?;
        self.workspace.apply_migration(self)?;

        tracing::debug!(
            added = self.actions_of(ActionType::Add).len(),
            modified = self.actions_of(ActionType::Modify).len(),
            deleted = self.actions_of(ActionType::Delete).len(),
            "working directory reconciled"
        );

        Ok(())
    }

    /// Scan the working directory and build the action plan
    ///
    /// Never touches the workspace.
    pub fn plan_changes(&mut self) -> anyhow::Result<()> {
        let on_disk = self
            .workspace
            .list_files(None)?
            .into_iter()
            .collect::<BTreeSet<_>>();

        for path in &on_disk {
            self.plan_existing_file(path)?;
        }

        let missing = self
            .target
            .files()
            .iter()
            .filter(|(path, _)| !on_disk.contains(*path))
            .map(|(path, oid)| (path.clone(), oid.clone()))
            .collect::<Vec<_>>();

        for (path, oid) in missing {
            self.check_for_obstruction(&path)?;
            let data = self.load_blob_data(&oid)?;
            self.record(ActionType::Add, path, Some(data));
        }

        if !self.conflicts.is_empty() {
            tracing::warn!(conflicts = self.conflicts.len(), "checkout aborted");
            return Err(
                TwigError::UntrackedFileConflict(self.conflicts.iter().cloned().collect()).into(),
            );
        }

        Ok(())
    }

    fn plan_existing_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let in_current = self.current.tracks(path);

        match self.target.blob_id(path).cloned() {
            None if in_current => self.record(ActionType::Delete, path.to_path_buf(), None),
            None => {}
            Some(oid) => {
                let data = self.load_blob_data(&oid)?;

                if !in_current && self.workspace.read_file(path)? != data {
                    self.conflicts.insert(path.to_path_buf());
                } else {
                    self.record(ActionType::Modify, path.to_path_buf(), Some(data));
                }
            }
        }

        Ok(())
    }

    /// A target path that is not on disk may still be blocked: by a file
    /// where one of its parent directories should be, or by a directory
    /// holding untracked files.
    fn check_for_obstruction(&mut self, path: &Path) -> anyhow::Result<()> {
        for ancestor in path
            .ancestors()
            .skip(1)
            .filter(|ancestor| !ancestor.as_os_str().is_empty())
        {
            if self.workspace.exists(ancestor) && !self.will_be_deleted(ancestor) {
                self.conflicts.insert(ancestor.to_path_buf());
            }
        }

        if self.workspace.path().join(path).is_dir() {
            let blocking = self
                .workspace
                .list_files(Some(path))?
                .into_iter()
                .filter(|file| !self.will_be_deleted(file))
                .collect::<Vec<_>>();
            self.conflicts.extend(blocking);
        }

        Ok(())
    }

    fn will_be_deleted(&self, path: &Path) -> bool {
        self.current.tracks(path) && !self.target.tracks(path)
    }

    fn record(&mut self, action: ActionType, path: PathBuf, data: Option<Bytes>) {
        self.actions.entry(action).or_default().push((path, data));
    }

    /// Content of a blob referenced by the target snapshot
    ///
    /// A snapshot pointing at a missing blob means the store is corrupt.
    pub fn load_blob_data(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        load_tracked_blob(self.database, object_id)
    }
}

/// Load a blob some commit refers to, reporting absence as corruption
pub fn load_tracked_blob(database: &Database, object_id: &ObjectId) -> anyhow::Result<Bytes> {
    match database.parse_object_as_blob(object_id) {
        Ok(blob) => Ok(blob.into_content()),
        Err(error) if matches!(domain_error(&error), Some(TwigError::NotFound(_))) => {
            Err(TwigError::CorruptObject(object_id.to_string()).into())
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::commit::Snapshot;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    struct Fixture {
        dir: TempDir,
        workspace: Workspace,
        database: Database,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().expect("Failed to create temp dir");
            let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());
            let database = Database::new(dir.path().join(".twig/objects").into_boxed_path());
            Self {
                dir,
                workspace,
                database,
            }
        }

        fn write(&self, path: &str, content: &str) {
            self.workspace
                .write_file(Path::new(path), content.as_bytes())
                .unwrap();
        }

        fn read(&self, path: &str) -> String {
            std::fs::read_to_string(self.dir.path().join(path)).unwrap()
        }

        fn exists(&self, path: &str) -> bool {
            self.dir.path().join(path).exists()
        }

        fn commit(&self, files: &[(&str, &str)]) -> Commit {
            let snapshot = files
                .iter()
                .map(|(path, content)| {
                    let oid = self
                        .database
                        .store(&Blob::new(Bytes::from(content.to_string())))
                        .unwrap();
                    (PathBuf::from(path), oid)
                })
                .collect::<Snapshot>();
            Commit::new(None, chrono::Local::now().fixed_offset(), "m".into(), snapshot)
        }
    }

    fn conflict_paths(error: &anyhow::Error) -> Vec<PathBuf> {
        match domain_error(error) {
            Some(TwigError::UntrackedFileConflict(paths)) => paths.clone(),
            other => panic!("expected an untracked file conflict, got {other:?}"),
        }
    }

    #[test]
    fn switch_rewrites_tracked_files_and_deletes_dropped_ones() {
        let fixture = Fixture::new();
        let current = fixture.commit(&[("a.txt", "bye"), ("only-current.txt", "x")]);
        let target = fixture.commit(&[("a.txt", "hi"), ("dir/new.txt", "new")]);
        fixture.write("a.txt", "bye");
        fixture.write("only-current.txt", "x");

        Migration::new(&fixture.workspace, &fixture.database, &current, &target)
            .apply_changes()
            .unwrap();

        assert_eq!(fixture.read("a.txt"), "hi");
        assert_eq!(fixture.read("dir/new.txt"), "new");
        assert!(!fixture.exists("only-current.txt"));
    }

    #[test]
    fn files_untracked_by_both_commits_are_left_alone() {
        let fixture = Fixture::new();
        let current = fixture.commit(&[("a.txt", "a")]);
        let target = fixture.commit(&[("b.txt", "b")]);
        fixture.write("a.txt", "a");
        fixture.write("scratch.txt", "mine");

        Migration::new(&fixture.workspace, &fixture.database, &current, &target)
            .apply_changes()
            .unwrap();

        assert_eq!(fixture.read("scratch.txt"), "mine");
        assert!(!fixture.exists("a.txt"));
        assert_eq!(fixture.read("b.txt"), "b");
    }

    #[test]
    fn untracked_file_with_different_content_aborts_without_changes() {
        let fixture = Fixture::new();
        let current = fixture.commit(&[("a.txt", "a")]);
        let target = fixture.commit(&[("u.txt", "committed"), ("b.txt", "b")]);
        fixture.write("a.txt", "a");
        fixture.write("u.txt", "untracked");

        let mut migration =
            Migration::new(&fixture.workspace, &fixture.database, &current, &target);
        let error = migration.apply_changes().unwrap_err();

        assert_eq!(conflict_paths(&error), vec![PathBuf::from("u.txt")]);
        assert_eq!(fixture.read("u.txt"), "untracked");
        assert_eq!(fixture.read("a.txt"), "a");
        assert!(!fixture.exists("b.txt"));
    }

    #[test]
    fn untracked_file_with_identical_content_is_not_a_conflict() {
        let fixture = Fixture::new();
        let current = fixture.commit(&[]);
        let target = fixture.commit(&[("u.txt", "same")]);
        fixture.write("u.txt", "same");

        Migration::new(&fixture.workspace, &fixture.database, &current, &target)
            .apply_changes()
            .unwrap();

        assert_eq!(fixture.read("u.txt"), "same");
    }

    #[test]
    fn locally_modified_tracked_file_is_overwritten() {
        let fixture = Fixture::new();
        let current = fixture.commit(&[("a.txt", "a")]);
        let target = fixture.commit(&[("a.txt", "target")]);
        fixture.write("a.txt", "edited");

        Migration::new(&fixture.workspace, &fixture.database, &current, &target)
            .apply_changes()
            .unwrap();

        assert_eq!(fixture.read("a.txt"), "target");
    }

    #[test]
    fn untracked_file_blocking_a_target_directory_is_a_conflict() {
        let fixture = Fixture::new();
        let current = fixture.commit(&[]);
        let target = fixture.commit(&[("docs/readme.txt", "r")]);
        fixture.write("docs", "i am a file");

        let error = Migration::new(&fixture.workspace, &fixture.database, &current, &target)
            .apply_changes()
            .unwrap_err();

        assert_eq!(conflict_paths(&error), vec![PathBuf::from("docs")]);
        assert_eq!(fixture.read("docs"), "i am a file");
    }

    #[test]
    fn untracked_files_inside_a_directory_the_target_replaces_are_conflicts() {
        let fixture = Fixture::new();
        let current = fixture.commit(&[]);
        let target = fixture.commit(&[("notes", "file now")]);
        fixture.write("notes/todo.txt", "keep me");

        let error = Migration::new(&fixture.workspace, &fixture.database, &current, &target)
            .apply_changes()
            .unwrap_err();

        assert_eq!(conflict_paths(&error), vec![PathBuf::from("notes/todo.txt")]);
        assert_eq!(fixture.read("notes/todo.txt"), "keep me");
    }

    #[test]
    fn missing_blob_is_reported_as_corruption_before_any_change() {
        let fixture = Fixture::new();
        let current = fixture.commit(&[("a.txt", "a")]);
        let dangling = ObjectId::try_parse("e".repeat(40)).unwrap();
        let target = Commit::new(
            None,
            chrono::Local::now().fixed_offset(),
            "m".into(),
            Snapshot::from([(PathBuf::from("b.txt"), dangling.clone())]),
        );
        fixture.write("a.txt", "a");

        let error = Migration::new(&fixture.workspace, &fixture.database, &current, &target)
            .apply_changes()
            .unwrap_err();

        assert_eq!(
            domain_error(&error),
            Some(&TwigError::CorruptObject(dangling.to_string()))
        );
        assert_eq!(fixture.read("a.txt"), "a");
    }
}
