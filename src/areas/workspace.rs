use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the metadata directory inside the working tree
pub const METADATA_DIR: &str = ".twig";

const IGNORED_PATHS: [&str; 1] = [METADATA_DIR];

/// File access to the working directory
///
/// All paths handed in and out are relative to the workspace root.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every file under `root_file_path` (or the whole workspace), sorted
    ///
    /// A path naming a single file yields just that file. The metadata
    /// directory is never listed.
    pub fn list_files(&self, root_file_path: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let root_file_path = match root_file_path {
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if !root_file_path.exists() {
            let relative = root_file_path
                .strip_prefix(&self.path)
                .map(PathBuf::from)
                .unwrap_or(root_file_path);
            return Err(TwigError::FileNotFound(relative).into());
        }

        if root_file_path.is_dir() {
            let mut files = WalkDir::new(&root_file_path)
                .into_iter()
                .filter_entry(|entry| !Self::is_ignored(entry.path()))
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| self.relative_path(entry.path()))
                .collect::<Vec<_>>();
            files.sort();

            Ok(files)
        } else {
            Ok(self.relative_path(&root_file_path).into_iter().collect())
        }
    }

    fn is_ignored(path: &Path) -> bool {
        path.file_name()
            .map(|name| IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }

    fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        if relative.as_os_str().is_empty() || relative.starts_with(METADATA_DIR) {
            return None;
        }
        Some(relative.to_path_buf())
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(file_path);

        if !full_path.is_file() {
            return Err(TwigError::FileNotFound(file_path.to_path_buf()).into());
        }

        let content = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(content.into())
    }

    /// Write `data` to `file_path`, creating parent directories and replacing
    /// whatever was there (including a directory of the same name)
    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if path.is_dir() {
            std::fs::remove_dir_all(&path).with_context(|| {
                format!("Failed to remove existing directory: {:?}", file_path)
            })?;
        }

        if let Some(parent) = path.parent() {
            self.make_directory(parent)?;
        }

        std::fs::write(&path, data)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))
    }

    /// Delete a file if present and prune directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        self.prune_empty_parent_dirs(&path)
    }

    // Deletions go first so a directory being replaced by a file (or the
    // other way round) is out of the way before anything is written.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for (file_path, _) in migration.actions_of(ActionType::Delete) {
            self.remove_file(file_path)?;
        }

        for action in [ActionType::Modify, ActionType::Add] {
            for (file_path, data) in migration.actions_of(action) {
                let data = data
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("Missing content for {:?}", file_path))?;
                self.write_file(file_path, data)?;
            }
        }

        Ok(())
    }

    fn make_directory(&self, dir_path: &Path) -> anyhow::Result<()> {
        // a file sitting where a directory is needed gets replaced
        for ancestor in dir_path
            .ancestors()
            .filter(|ancestor| ancestor.starts_with(&self.path) && *ancestor != self.path.as_ref())
        {
            if ancestor.is_file() {
                std::fs::remove_file(ancestor)
                    .with_context(|| format!("Failed to remove file: {:?}", ancestor))?;
            }
        }

        std::fs::create_dir_all(dir_path)
            .with_context(|| format!("Failed to create directory: {:?}", dir_path))
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.starts_with(&self.path)
            && parent.is_dir()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("Failed to remove empty directory: {:?}", parent))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
