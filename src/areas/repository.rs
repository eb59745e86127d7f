use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{METADATA_DIR, Workspace};
use crate::artifacts::checkout::migration::load_tracked_blob;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{TwigError, domain_error};
use anyhow::Context;
use bytes::Bytes;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Owner of every repository component
///
/// Blobs and commits live in two separate stores (`.twig/objects` and
/// `.twig/commits`) so commit-id abbreviations never collide with blobs.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    commits: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Build a repository rooted at `path`, creating the directory if needed
    ///
    /// Does not require `.twig` to exist; use [`Repository::open`] for that.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory {:?}", path))?;
        }

        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve path {:?}", path))?;
        let metadata_path = path.join(METADATA_DIR);

        let index = Index::new(metadata_path.join("index").into_boxed_path());
        let database = Database::new(metadata_path.join("objects").into_boxed_path());
        let commits = Database::new(metadata_path.join("commits").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(metadata_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            commits,
            workspace,
            refs,
        })
    }

    /// Open an initialized repository and load its staging index
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repository = Repository::new(path, writer)?;

        if !repository.is_initialized() {
            return Err(TwigError::NotARepository(repository.metadata_path()).into());
        }

        repository.index().rehydrate()?;
        Ok(repository)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_DIR)
    }

    pub fn is_initialized(&self) -> bool {
        self.metadata_path().is_dir()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    /// Blob store
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Commit store
    pub fn commits(&self) -> &Database {
        &self.commits
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        match self.commits.parse_object_as_commit(oid) {
            Err(error) if matches!(domain_error(&error), Some(TwigError::NotFound(_))) => {
                Err(TwigError::NoSuchCommit(oid.to_string()).into())
            }
            result => result,
        }
    }

    /// The commit HEAD resolves to, with its id
    pub fn head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        let oid = self.refs.current_oid()?;
        let commit = match self.load_commit(&oid) {
            Err(error) if matches!(domain_error(&error), Some(TwigError::NoSuchCommit(_))) => {
                return Err(TwigError::CorruptObject(oid.to_string()).into());
            }
            result => result?,
        };

        Ok((oid, commit))
    }

    /// Content of a blob referenced by a commit
    pub fn tracked_blob(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        load_tracked_blob(&self.database, oid)
    }

    /// Hash a working-directory file without storing it
    pub fn hash_workspace_file(&self, path: &Path) -> anyhow::Result<ObjectId> {
        Blob::new(self.workspace.read_file(path)?).object_id()
    }
}
