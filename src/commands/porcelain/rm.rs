use crate::areas::repository::Repository;
use crate::errors::TwigError;
use std::path::Path;

impl Repository {
    /// Unstage a staged file, or stage a tracked file for removal
    ///
    /// A file that is only staged is unstaged and left on disk. A file
    /// tracked by the current commit is staged for removal and deleted from
    /// the working directory.
    pub fn rm(&self, path: &Path) -> anyhow::Result<()> {
        let path = self.workspace_relative(path)?;
        let (_, head_commit) = self.head_commit()?;
        let mut index = self.index();

        if index.unstage(&path) {
            tracing::debug!(path = %path.display(), "unstaged");
            return index.write_updates();
        }

        if !head_commit.tracks(&path) {
            return Err(TwigError::NothingToRemove(path).into());
        }

        index.remove(path.clone());
        index.write_updates()?;
        self.workspace().remove_file(&path)?;
        tracing::debug!(path = %path.display(), "staged for removal");

        Ok(())
    }
}
