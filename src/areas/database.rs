//! Content-addressed object store
//!
//! Objects live in `<root>/<first 2 hex chars>/<remaining 38 hex chars>`.
//! The repository keeps two stores with the same layout: one for blobs and
//! one for commits, so an abbreviated commit id can only ever match commits.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Cursor, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Read the raw serialized bytes of an object
    ///
    /// Fails with [`TwigError::NotFound`] if no object has this id.
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        if !object_path.is_file() {
            return Err(TwigError::NotFound(format!("object {object_id} not found")).into());
        }

        self.read_object(object_path)
    }

    /// Persist an object and return its id
    ///
    /// Storing content that already exists is a no-op; existing objects are
    /// never overwritten.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::trace!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(object_path, object.serialize()?)?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let mut object_reader = self.parse_object_as_bytes(object_id, ObjectType::Blob)?;

        Blob::deserialize(&mut object_reader)
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let mut object_reader = self.parse_object_as_bytes(object_id, ObjectType::Commit)?;

        Commit::deserialize(&mut object_reader)
            .with_context(|| format!("Unable to parse commit {object_id}"))
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
        expected_type: ObjectType,
    ) -> anyhow::Result<impl BufRead> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;
        if object_type != expected_type {
            anyhow::bail!("object {object_id} is a {object_type}, expected a {expected_type}");
        }

        Ok(object_reader)
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Ok(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose id starts with the given prefix.
    ///
    /// For prefixes of 2+ characters only the matching bucket is searched;
    /// shorter prefixes scan every bucket.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();

        if prefix.len() < 2 {
            return Ok(self
                .list_objects()?
                .into_iter()
                .filter(|oid| oid.as_ref().starts_with(&prefix))
                .collect());
        }

        let (dir_name, file_prefix) = prefix.split_at(2);
        let mut matches = self
            .list_bucket(dir_name)?
            .into_iter()
            .filter(|oid| oid.as_ref()[2..].starts_with(file_prefix))
            .collect::<Vec<_>>();
        matches.sort();

        Ok(matches)
    }

    /// Every object id in the store, sorted
    pub fn list_objects(&self) -> anyhow::Result<Vec<ObjectId>> {
        if !self.path.is_dir() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            if entry.path().is_dir() {
                objects.extend(self.list_bucket(&entry.file_name().to_string_lossy())?);
            }
        }
        objects.sort();

        Ok(objects)
    }

    fn list_bucket(&self, dir_name: &str) -> anyhow::Result<Vec<ObjectId>> {
        let dir_path = self.path.join(dir_name);
        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        for entry in std::fs::read_dir(&dir_path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let full_oid = format!("{}{}", dir_name, file_name.to_string_lossy());

            // leftover temp files and foreign entries are not objects
            if let Ok(oid) = ObjectId::try_parse(full_oid) {
                objects.push(oid);
            }
        }

        Ok(objects)
    }
}
