use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::areas::workspace::METADATA_DIR;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::errors::TwigError;
use std::path::{Component, Path, PathBuf};

impl Repository {
    /// Stage files (directories are expanded) for the next commit
    pub fn add(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let (_, head_commit) = self.head_commit()?;

        // expand every argument before staging anything so a bad path stages nothing
        let files = paths
            .iter()
            .map(|path| {
                let scope = self.workspace_relative(path)?;
                let scope = (!scope.as_os_str().is_empty()).then_some(scope);
                self.workspace().list_files(scope.as_deref())
            })
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .flatten();

        let mut index = self.index();
        for path in files {
            self.stage_file(&mut index, &head_commit, path)?;
        }

        index.write_updates()
    }

    fn stage_file(
        &self,
        index: &mut Index,
        head_commit: &Commit,
        path: PathBuf,
    ) -> anyhow::Result<()> {
        let blob = Blob::new(self.workspace().read_file(&path)?);
        let blob_id = blob.object_id()?;

        // identical to the committed version: nothing to stage, and any
        // pending addition or removal of the path is stale
        if head_commit.blob_id(&path) == Some(&blob_id) {
            index.unstage(&path);
            index.cancel_removal(&path);
            tracing::debug!(path = %path.display(), "unchanged since last commit");
            return Ok(());
        }

        self.database().store(&blob)?;
        tracing::debug!(path = %path.display(), oid = %blob_id, "staged");
        index.add(path, blob_id);

        Ok(())
    }

    /// Express a user-supplied path relative to the workspace root
    ///
    /// `.` and `..` are resolved lexically. The result never leaves the
    /// working tree and never points into the metadata directory.
    pub fn workspace_relative(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let outside = || TwigError::OutsideWorkspace(path.to_path_buf());
        let relative = match path.strip_prefix(self.path()) {
            Ok(relative) => relative,
            Err(_) if path.is_absolute() => return Err(outside().into()),
            Err(_) => path,
        };

        let mut normalized = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(outside().into());
                    }
                }
                Component::Normal(name) => normalized.push(name),
                Component::RootDir | Component::Prefix(_) => return Err(outside().into()),
            }
        }

        if normalized.starts_with(METADATA_DIR) {
            return Err(TwigError::MetadataPath(normalized).into());
        }

        Ok(normalized)
    }
}
