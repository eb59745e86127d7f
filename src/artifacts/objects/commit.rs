//! Commit object
//!
//! Commits are immutable snapshots of the tracked files. Unlike git there is
//! no tree object: a commit lists every tracked path with the blob it points
//! at, so the mapping is the full snapshot rather than a diff against the
//! parent.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-sha>
//! timestamp <unix-seconds> <timezone>
//! file <blob-sha> <path>\0
//! file <blob-sha> <path>\0
//!
//! <commit message>
//! ```
//!
//! Paths are written as raw bytes and end with a NUL, so newlines and
//! non-UTF-8 names survive. The root commit has no `parent` line and
//! usually no `file` lines.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Environment variable overriding the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "TWIG_COMMIT_DATE";

/// Message of the commit created by `init`
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// Snapshot of tracked paths mapped to blob ids
pub type Snapshot = BTreeMap<PathBuf, ObjectId>;

/// Immutable snapshot node in the commit graph
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit ID (None for the root commit)
    parent: Option<ObjectId>,
    /// Creation time
    timestamp: DateTime<FixedOffset>,
    /// Log message
    message: String,
    /// Every tracked path and the blob holding its content
    files: Snapshot,
}

impl Commit {
    pub fn new(
        parent: Option<ObjectId>,
        timestamp: DateTime<FixedOffset>,
        message: String,
        files: Snapshot,
    ) -> Self {
        Commit {
            parent,
            timestamp,
            message,
            files,
        }
    }

    /// The parentless commit every history starts from: empty snapshot at the epoch
    pub fn root(message: String) -> Self {
        Commit::new(None, epoch(), message, Snapshot::new())
    }

    /// Compose the snapshot of a child commit
    ///
    /// Starts from this commit's files, overlays `additions` (replacing
    /// entries for the same path) and drops every path in `removals`.
    pub fn child_snapshot(
        &self,
        additions: &BTreeMap<PathBuf, ObjectId>,
        removals: &BTreeSet<PathBuf>,
    ) -> Snapshot {
        let mut files = self.files.clone();
        files.extend(
            additions
                .iter()
                .map(|(path, oid)| (path.clone(), oid.clone())),
        );
        files.retain(|path, _| !removals.contains(path));

        files
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// String like "Thu Jan 1 00:00:00 1970 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn files(&self) -> &Snapshot {
        &self.files
    }

    pub fn tracks(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn blob_id(&self, path: &Path) -> Option<&ObjectId> {
        self.files.get(path)
    }
}

/// Timestamp for a new commit: `TWIG_COMMIT_DATE` when set and parseable, now otherwise
pub fn commit_timestamp() -> DateTime<FixedOffset> {
    std::env::var(COMMIT_DATE_ENV)
        .ok()
        .and_then(|date_str| {
            DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        })
        .unwrap_or_else(|| chrono::Local::now().fixed_offset())
}

fn epoch() -> DateTime<FixedOffset> {
    DateTime::UNIX_EPOCH.fixed_offset()
}

fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    format!("{} {}", timestamp.timestamp(), timestamp.format("%z"))
}

fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, "%s %z")
        .with_context(|| format!("Invalid commit object: invalid timestamp {value:?}"))
}

fn path_to_bytes(path: &Path) -> &[u8] {
    path.as_os_str().as_encoded_bytes()
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> anyhow::Result<PathBuf> {
    use std::os::unix::ffi::OsStringExt;

    Ok(PathBuf::from(std::ffi::OsString::from_vec(bytes)))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> anyhow::Result<PathBuf> {
    Ok(PathBuf::from(
        String::from_utf8(bytes).context("Invalid commit object: path is not UTF-8")?,
    ))
}

/// Read up to and including `delimiter`, returning what came before it
fn read_field(reader: &mut impl BufRead, delimiter: u8) -> anyhow::Result<Vec<u8>> {
    let mut field = Vec::new();
    reader.read_until(delimiter, &mut field)?;

    if field.pop() != Some(delimiter) {
        anyhow::bail!("Invalid commit object: truncated header");
    }

    Ok(field)
}

fn read_text_field(reader: &mut impl BufRead, delimiter: u8) -> anyhow::Result<String> {
    String::from_utf8(read_field(reader, delimiter)?)
        .context("Invalid commit object: header is not UTF-8")
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = Vec::new();

        if let Some(parent) = &self.parent {
            object_content.extend_from_slice(format!("parent {}\n", parent.as_ref()).as_bytes());
        }
        object_content.extend_from_slice(
            format!("timestamp {}\n", format_timestamp(&self.timestamp)).as_bytes(),
        );
        for (path, oid) in &self.files {
            object_content.extend_from_slice(format!("file {} ", oid.as_ref()).as_bytes());
            object_content.extend_from_slice(path_to_bytes(path));
            object_content.extend_from_slice(b"\0\n");
        }
        object_content.push(b'\n');
        object_content.extend_from_slice(self.message.as_bytes());

        with_header(self.object_type(), &object_content)
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut parent = None;
        let mut timestamp = None;
        let mut files = Snapshot::new();

        loop {
            let next = reader.fill_buf()?.first().copied();
            match next {
                None => anyhow::bail!("Invalid commit object: missing message separator"),
                Some(b'\n') => {
                    reader.consume(1);
                    break;
                }
                Some(_) => {}
            }

            let key = read_text_field(&mut reader, b' ')?;
            match key.as_str() {
                "parent" => {
                    parent = Some(ObjectId::try_parse(read_text_field(&mut reader, b'\n')?)?)
                }
                "timestamp" => {
                    timestamp = Some(parse_timestamp(&read_text_field(&mut reader, b'\n')?)?)
                }
                "file" => {
                    let oid = ObjectId::try_parse(read_text_field(&mut reader, b' ')?)?;
                    let path = path_from_bytes(read_field(&mut reader, b'\0')?)?;
                    if !read_field(&mut reader, b'\n')?.is_empty() {
                        anyhow::bail!("Invalid commit object: invalid file line");
                    }
                    files.insert(path, oid);
                }
                _ => anyhow::bail!("Invalid commit object: unknown header {key}"),
            }
        }

        let mut message = String::new();
        reader.read_to_string(&mut message)?;
        let timestamp = timestamp.context("Invalid commit object: missing timestamp line")?;

        Ok(Self::new(parent, timestamp, message, files))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
