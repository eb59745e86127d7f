//! What HEAD points at
//!
//! HEAD stores either a branch name (`ref: refs/heads/<name>`) or, in the
//! detached state, a raw commit id. Because the branch *name* is stored,
//! advancing the branch moves the effective current commit with it.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;

const SYMREF_PREFIX: &str = "ref: refs/heads/";

/// Regex pattern for parsing symbolic references
pub const SYMREF_REGEX: &str = r"^ref: refs/heads/(.+)$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Branch(BranchName),
    Detached(ObjectId),
}

impl Head {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let content = content.trim();

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref_match {
            Some(symref_match) => Ok(Head::Branch(BranchName::try_parse(
                symref_match[1].to_string(),
            )?)),
            None => Ok(Head::Detached(ObjectId::try_parse(content.to_string())?)),
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached(_))
    }

    pub fn branch(&self) -> Option<&BranchName> {
        match self {
            Head::Branch(name) => Some(name),
            Head::Detached(_) => None,
        }
    }

    /// File content of HEAD for this target
    pub fn to_raw(&self) -> String {
        match self {
            Head::Branch(name) => format!("{SYMREF_PREFIX}{name}"),
            Head::Detached(oid) => oid.to_string(),
        }
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Head::Branch(name) => write!(f, "{name}"),
            Head::Detached(oid) => write!(f, "(HEAD detached at {})", oid.to_short_oid()),
        }
    }
}
