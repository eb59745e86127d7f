use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::ROOT_COMMIT_MESSAGE;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    /// Create `.twig`, the root commit and the `master` branch
    pub fn init(&self) -> anyhow::Result<ObjectId> {
        if self.is_initialized() {
            return Err(TwigError::AlreadyInitialized(self.path().to_path_buf()).into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .twig/objects directory")?;

        fs::create_dir_all(self.commits().objects_path())
            .context("Failed to create .twig/commits directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .twig/refs/heads directory")?;

        // an empty index file marks a fresh staging area
        self.index()
            .clear()
            .context("Failed to create .twig/index file")?;

        let root_oid = self.create_commit(ROOT_COMMIT_MESSAGE, None)?;

        tracing::info!(path = %self.path().display(), root = %root_oid, "initialized repository");
        writeln!(
            self.writer(),
            "Initialized empty twig repository in {}",
            self.metadata_path().display()
        )?;

        Ok(root_oid)
    }
}
