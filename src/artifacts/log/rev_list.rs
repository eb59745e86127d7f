use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{TwigError, domain_error};
use derive_new::new;

/// First-parent history starting at a commit
///
/// Cheap to clone; every clone restarts from the same commit.
#[derive(Debug, Clone, new)]
pub struct RevList<'r> {
    commits: &'r Database,
    start: ObjectId,
}

impl<'r> IntoIterator for RevList<'r> {
    type Item = anyhow::Result<(ObjectId, Commit)>;
    type IntoIter = RevListIntoIter<'r>;

    fn into_iter(self) -> Self::IntoIter {
        RevListIntoIter {
            commits: self.commits,
            current_commit_oid: Some(self.start),
        }
    }
}

/// Walks parent links until the root; yields an error once and stops if a
/// commit in the chain cannot be read
#[derive(Debug, Clone)]
pub struct RevListIntoIter<'r> {
    commits: &'r Database,
    current_commit_oid: Option<ObjectId>,
}

impl Iterator for RevListIntoIter<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.current_commit_oid.take()?;

        match self.commits.parse_object_as_commit(&commit_oid) {
            Ok(commit) => {
                self.current_commit_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            Err(error) if matches!(domain_error(&error), Some(TwigError::NotFound(_))) => {
                Some(Err(TwigError::CorruptObject(commit_oid.to_string()).into()))
            }
            Err(error) => Some(Err(error)),
        }
    }
}
