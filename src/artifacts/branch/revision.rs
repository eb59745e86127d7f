use crate::areas::database::Database;
use crate::areas::refs::{HEAD_REF_NAME, Refs};
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use derive_new::new;

/// Alias accepted for HEAD
const HEAD_ALIAS: &str = "@";

/// A user-supplied commit reference.
///
/// Supported formats:
/// - `HEAD` or `@`: the current commit
/// - Branch names: `master`, `feature/x`
/// - Full or abbreviated commit ids (resolved as fallback if no branch has that name)
///
/// Branches win over ids when a string could be both, matching git.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Revision {
    raw: String,
}

impl Revision {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn resolve(&self, refs: &Refs, commits: &Database) -> anyhow::Result<ObjectId> {
        let raw = self.raw.trim();

        if raw == HEAD_REF_NAME || raw == HEAD_ALIAS {
            return refs.current_oid();
        }

        if let Ok(branch_name) = BranchName::try_parse(raw.to_string())
            && let Some(oid) = refs.read_branch(&branch_name)?
        {
            return Ok(oid);
        }

        if ObjectId::is_valid_prefix(raw) {
            return Self::resolve_oid(raw, commits);
        }

        Err(TwigError::NoSuchCommit(raw.to_string()).into())
    }

    /// Resolve a full or abbreviated id against the commit store
    pub fn resolve_oid(prefix: &str, commits: &Database) -> anyhow::Result<ObjectId> {
        let mut candidates = commits.find_objects_by_prefix(prefix)?;

        match candidates.len() {
            0 => Err(TwigError::NoSuchCommit(prefix.to_string()).into()),
            1 => Ok(candidates.remove(0)),
            _ => Err(TwigError::AmbiguousCommit {
                prefix: prefix.to_string(),
                candidates: candidates
                    .iter()
                    .map(|oid| oid.to_short_oid())
                    .collect(),
            }
            .into()),
        }
    }
}
